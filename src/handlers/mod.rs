pub mod error;
pub mod reminders;
pub mod schedule;
pub mod settings;
pub mod vocabulary;

pub use error::AppError;
pub use reminders::*;
pub use schedule::*;
pub use settings::*;
pub use vocabulary::*;

use axum::{
  extract::State,
  routing::{get, post},
  Json, Router,
};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
  Json(json!({
    "status": "ok",
    "source": state.scheduler.source_name(),
  }))
}

/// All routes, with state applied
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/api/vocabulary/cards", get(list_cards).post(create_card))
    .route(
      "/api/vocabulary/users/{user_id}/cards/states",
      get(list_card_states).put(upsert_card_state),
    )
    .route("/api/users/{user_id}/schedule", get(get_schedule))
    .route("/api/users/{user_id}/reminders", get(list_reminders))
    .route("/api/users/{user_id}/reminders/daily", post(schedule_daily))
    .route("/api/users/{user_id}/reminders/weekly", post(schedule_weekly))
    .route("/api/users/{user_id}/reminders/overdue", post(check_overdue))
    .route("/api/users/{user_id}/reminders/upcoming", post(schedule_upcoming))
    .route("/api/notification-settings", get(get_settings).put(update_settings))
    .with_state(state)
}
