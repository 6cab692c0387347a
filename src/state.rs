//! Application state shared by every handler.

use std::sync::Arc;

use crate::db::DbPool;
use crate::scheduler::ReviewScheduler;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
  /// Local database (cards, card states, key-value storage)
  pub pool: DbPool,

  pub scheduler: Arc<ReviewScheduler>,
}

impl AppState {
  pub fn new(pool: DbPool, scheduler: Arc<ReviewScheduler>) -> Self {
    Self { pool, scheduler }
  }
}
