use thiserror::Error;

use crate::api::ApiError;
use crate::db::DbLockError;

/// Failures surfaced by the review scheduler
#[derive(Debug, Error)]
pub enum SchedulerError {
  #[error("upstream API error: {0}")]
  Api(#[from] ApiError),

  #[error("storage error: {0}")]
  Storage(#[from] rusqlite::Error),

  #[error("database unavailable")]
  Unavailable,
}

impl From<DbLockError> for SchedulerError {
  fn from(_: DbLockError) -> Self {
    Self::Unavailable
  }
}
