//! Local card content and card state endpoints.

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  Json,
};
use serde::Deserialize;

use super::AppError;
use crate::config::SCHEDULE_FETCH_LIMIT;
use crate::db::{self, try_lock};
use crate::domain::{CardState, CefrLevel, VocabularyCard};
use crate::state::AppState;

const DEFAULT_CARD_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct CardListQuery {
  pub level: Option<String>,
  pub limit: Option<usize>,
}

pub async fn list_cards(
  State(state): State<AppState>,
  Query(query): Query<CardListQuery>,
) -> Result<Json<Vec<VocabularyCard>>, AppError> {
  let level = match query.level.as_deref() {
    Some(raw) => Some(
      CefrLevel::from_str(raw).ok_or_else(|| AppError::Validation(format!("unknown level {raw:?}")))?,
    ),
    None => None,
  };
  let limit = query.limit.unwrap_or(DEFAULT_CARD_LIMIT).min(SCHEDULE_FETCH_LIMIT);

  let conn = try_lock(&state.pool)?;
  Ok(Json(db::list_cards(&conn, level, limit)?))
}

pub async fn create_card(
  State(state): State<AppState>,
  Json(mut card): Json<VocabularyCard>,
) -> Result<(StatusCode, Json<VocabularyCard>), AppError> {
  if let Some(reason) = card.validation_error() {
    return Err(AppError::Validation(reason.to_string()));
  }

  let conn = try_lock(&state.pool)?;
  card.id = db::insert_card(&conn, &card)?;
  tracing::info!("created card {} ({})", card.id, card.hungarian);
  Ok((StatusCode::CREATED, Json(card)))
}

#[derive(Debug, Deserialize)]
pub struct StateListQuery {
  pub limit: Option<usize>,
}

pub async fn list_card_states(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
  Query(query): Query<StateListQuery>,
) -> Result<Json<Vec<CardState>>, AppError> {
  let limit = query.limit.unwrap_or(SCHEDULE_FETCH_LIMIT).min(SCHEDULE_FETCH_LIMIT);
  let conn = try_lock(&state.pool)?;
  Ok(Json(db::get_card_states_for_user(&conn, &user_id, limit)?))
}

/// Insert or replace the learner's state for one card. Clears cached schedules.
pub async fn upsert_card_state(
  State(state): State<AppState>,
  Path(user_id): Path<String>,
  Json(mut card_state): Json<CardState>,
) -> Result<Json<CardState>, AppError> {
  card_state.user_id = user_id;

  {
    let conn = try_lock(&state.pool)?;
    if db::get_card_by_id(&conn, card_state.card_id)?.is_none() {
      return Err(AppError::NotFound(format!("card {} not found", card_state.card_id)));
    }
    card_state.id = db::upsert_card_state(&conn, &card_state)?;
  }

  state.scheduler.invalidate_cache();
  Ok(Json(card_state))
}
