use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::DbLockError;
use crate::domain::SettingsError;
use crate::scheduler::SchedulerError;

/// Errors returned from JSON handlers
#[derive(Debug, Error)]
pub enum AppError {
  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Validation(String),

  #[error(transparent)]
  Scheduler(#[from] SchedulerError),

  #[error("storage error: {0}")]
  Storage(#[from] rusqlite::Error),
}

impl From<DbLockError> for AppError {
  fn from(_: DbLockError) -> Self {
    Self::Scheduler(SchedulerError::Unavailable)
  }
}

impl From<SettingsError> for AppError {
  fn from(e: SettingsError) -> Self {
    Self::Validation(e.to_string())
  }
}

impl AppError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      Self::Scheduler(SchedulerError::Api(e)) if e.is_not_found() => StatusCode::NOT_FOUND,
      Self::Scheduler(SchedulerError::Api(_)) => StatusCode::BAD_GATEWAY,
      Self::Scheduler(_) | Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!("request failed: {}", self);
    }

    let body = Json(json!({
      "error": self.to_string(),
    }));

    (status, body).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::ApiError;

  #[test]
  fn test_status_mapping() {
    assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
    assert_eq!(
      AppError::from(SettingsError::InvalidLeadTime(0)).status(),
      StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(AppError::from(DbLockError).status(), StatusCode::INTERNAL_SERVER_ERROR);

    let upstream = SchedulerError::Api(ApiError::Timeout(30));
    assert_eq!(AppError::from(upstream).status(), StatusCode::BAD_GATEWAY);

    let missing = SchedulerError::Api(ApiError::Status {
      status: 404,
      message: "no such user".into(),
    });
    assert_eq!(AppError::from(missing).status(), StatusCode::NOT_FOUND);
  }
}
