//! Reminder scheduling endpoints.
//!
//! Each POST answers with the queued reminder, or `null` when the matching
//! setting is off or there is nothing to remind about.

use axum::{
  extract::{Path, State},
  Json,
};

use super::AppError;
use crate::domain::{ReviewReminder, ScheduledReview};
use crate::state::AppState;

pub async fn list_reminders(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
) -> Result<Json<Vec<ReviewReminder>>, AppError> {
  Ok(Json(state.scheduler.stored_reminders(&user_id)?))
}

pub async fn schedule_daily(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
) -> Result<Json<Option<ReviewReminder>>, AppError> {
  Ok(Json(state.scheduler.schedule_daily_reminder(&user_id).await?))
}

pub async fn schedule_weekly(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
) -> Result<Json<Option<ReviewReminder>>, AppError> {
  Ok(Json(state.scheduler.schedule_weekly_progress(&user_id).await?))
}

pub async fn check_overdue(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
) -> Result<Json<Option<ReviewReminder>>, AppError> {
  Ok(Json(state.scheduler.check_overdue_reviews(&user_id).await?))
}

pub async fn schedule_upcoming(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
  Json(review): Json<ScheduledReview>,
) -> Result<Json<Option<ReviewReminder>>, AppError> {
  Ok(Json(
    state
      .scheduler
      .schedule_upcoming_review_alert(&user_id, &review)?,
  ))
}
