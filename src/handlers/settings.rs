use axum::{extract::State, Json};

use super::AppError;
use crate::domain::NotificationSettings;
use crate::state::AppState;

pub async fn get_settings(State(state): State<AppState>) -> Result<Json<NotificationSettings>, AppError> {
  Ok(Json(state.scheduler.settings()?))
}

/// Replace the stored settings. Invalid values are rejected, nothing is written.
pub async fn update_settings(
  State(state): State<AppState>,
  Json(settings): Json<NotificationSettings>,
) -> Result<Json<NotificationSettings>, AppError> {
  settings.validate()?;
  state.scheduler.update_settings(&settings)?;
  tracing::info!(
    enabled = settings.enabled,
    daily = settings.daily_reminder_enabled,
    "notification settings updated"
  );
  Ok(Json(settings))
}
