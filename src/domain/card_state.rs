use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::VocabularyCard;

/// Memory phase reported by the upstream scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MemoryState {
  #[default]
  New,
  Learning,
  Review,
  Relearning,
}

impl MemoryState {
  pub fn from_str(s: &str) -> Self {
    match s {
      "Learning" => Self::Learning,
      "Review" => Self::Review,
      "Relearning" => Self::Relearning,
      _ => Self::New,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::New => "New",
      Self::Learning => "Learning",
      Self::Review => "Review",
      Self::Relearning => "Relearning",
    }
  }
}

/// Per-user, per-card spaced repetition bookkeeping.
///
/// These fields are produced by the upstream review API; this crate only
/// reads them (bucketing and prioritising by `next_review`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardState {
  #[serde(default)]
  pub id: i64,
  pub user_id: String,
  pub card_id: i64,
  #[serde(default)]
  pub stability: f64,
  #[serde(default)]
  pub difficulty: f64,
  #[serde(default)]
  pub retrievability: f64,
  #[serde(default)]
  pub lapses: u32,
  #[serde(default)]
  pub reps: u32,
  #[serde(default)]
  pub state: MemoryState,
  #[serde(default)]
  pub last_review: Option<DateTime<Utc>>,
  pub next_review: DateTime<Utc>,
  /// Card content, when the source joins it in
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub card: Option<VocabularyCard>,
}

impl CardState {
  /// A fresh state for a card the learner hasn't reviewed yet
  pub fn new(user_id: &str, card_id: i64, next_review: DateTime<Utc>) -> Self {
    Self {
      id: 0,
      user_id: user_id.to_string(),
      card_id,
      stability: 0.0,
      difficulty: 0.0,
      retrievability: 1.0,
      lapses: 0,
      reps: 0,
      state: MemoryState::New,
      last_review: None,
      next_review,
      card: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_memory_state_roundtrip_and_fallback() {
    for state in [
      MemoryState::New,
      MemoryState::Learning,
      MemoryState::Review,
      MemoryState::Relearning,
    ] {
      assert_eq!(MemoryState::from_str(state.as_str()), state);
    }
    assert_eq!(MemoryState::from_str("garbage"), MemoryState::New);
  }

  #[test]
  fn test_card_state_from_upstream_json() {
    // Upstream omits bookkeeping it hasn't computed yet
    let json = r#"{
      "userId": "u1",
      "cardId": 3,
      "retrievability": 0.42,
      "lapses": 3,
      "nextReview": "2026-10-18T01:00:00Z"
    }"#;
    let state: CardState = serde_json::from_str(json).unwrap();
    assert_eq!(state.user_id, "u1");
    assert_eq!(state.card_id, 3);
    assert_eq!(state.lapses, 3);
    assert_eq!(state.state, MemoryState::New);
    assert!(state.card.is_none());
    assert!(state.last_review.is_none());
  }
}
