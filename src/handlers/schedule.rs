use axum::{
  extract::{Path, Query, State},
  Json,
};
use serde::Deserialize;

use super::AppError;
use crate::domain::ReviewSchedule;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
  #[serde(default)]
  pub force_refresh: bool,
}

pub async fn get_schedule(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
  Query(query): Query<ScheduleQuery>,
) -> Result<Json<ReviewSchedule>, AppError> {
  let schedule = state
    .scheduler
    .get_review_schedule(&user_id, query.force_refresh)
    .await?;
  Ok(Json(schedule))
}
