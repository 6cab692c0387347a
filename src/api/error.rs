//! Upstream API error types.

use thiserror::Error;

/// Errors that can occur when talking to the vocabulary or admin API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server could not be reached or the connection dropped.
    #[error("network error: {0}")]
    Network(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The API answered with a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    /// The body was not the JSON we expected.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status returned by the upstream, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
