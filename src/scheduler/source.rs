//! Where card states come from: the local database or the upstream API.

use async_trait::async_trait;

use super::SchedulerError;
use crate::api::VocabularyApiClient;
use crate::db::{self, DbPool};
use crate::domain::CardState;

/// Supplies a user's card states sorted by `next_review` ascending.
#[async_trait]
pub trait CardStateSource: Send + Sync {
  fn name(&self) -> &str;

  async fn card_states(&self, user_id: &str, limit: usize) -> Result<Vec<CardState>, SchedulerError>;
}

/// Card states from the local `card_states` table
pub struct LocalCardStates {
  pool: DbPool,
}

impl LocalCardStates {
  pub fn new(pool: DbPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl CardStateSource for LocalCardStates {
  fn name(&self) -> &str {
    "local"
  }

  async fn card_states(&self, user_id: &str, limit: usize) -> Result<Vec<CardState>, SchedulerError> {
    let conn = db::try_lock(&self.pool)?;
    Ok(db::get_card_states_for_user(&conn, user_id, limit)?)
  }
}

#[async_trait]
impl CardStateSource for VocabularyApiClient {
  fn name(&self) -> &str {
    "remote"
  }

  async fn card_states(&self, user_id: &str, limit: usize) -> Result<Vec<CardState>, SchedulerError> {
    let mut states = self.get_card_states(user_id, limit).await?;
    // Upstream ordering isn't guaranteed when sortBy is ignored
    states.sort_by_key(|s| s.next_review);
    states.truncate(limit);
    Ok(states)
  }
}
