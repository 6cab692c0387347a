use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::CardState;

/// Review urgency tier. Declaration order gives `High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReviewPriority {
  Low,
  Medium,
  High,
}

impl ReviewPriority {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Low => "LOW",
      Self::Medium => "MEDIUM",
      Self::High => "HIGH",
    }
  }
}

/// Derived view of a card state. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledReview {
  pub card_id: i64,
  pub card_state_id: i64,
  pub hungarian: Option<String>,
  pub korean: Option<String>,
  pub next_review: DateTime<Utc>,
  pub priority: ReviewPriority,
  pub retrievability: f64,
  pub lapses: u32,
}

impl ScheduledReview {
  pub fn from_state(state: &CardState, priority: ReviewPriority) -> Self {
    Self {
      card_id: state.card_id,
      card_state_id: state.id,
      hungarian: state.card.as_ref().map(|c| c.hungarian.clone()),
      korean: state.card.as_ref().map(|c| c.korean.clone()),
      next_review: state.next_review,
      priority,
      retrievability: state.retrievability,
      lapses: state.lapses,
    }
  }
}

/// One day of the weekly load histogram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLoad {
  pub date: NaiveDate,
  pub weekday: Weekday,
  pub count: usize,
}

/// A user's reviews bucketed against local day boundaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSchedule {
  pub user_id: String,
  pub generated_at: DateTime<Utc>,
  pub overdue: Vec<ScheduledReview>,
  pub today: Vec<ScheduledReview>,
  pub upcoming: Vec<ScheduledReview>,
  pub weekly_load: Vec<DailyLoad>,
  /// overdue + today
  pub total_due: usize,
}

impl ReviewSchedule {
  /// Sum of the weekly histogram
  pub fn weekly_total(&self) -> usize {
    self.weekly_load.iter().map(|d| d.count).sum()
  }

  /// Number of due reviews that are high priority
  pub fn high_priority_due(&self) -> usize {
    self
      .overdue
      .iter()
      .chain(self.today.iter())
      .filter(|r| r.priority == ReviewPriority::High)
      .count()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_priority_ordering() {
    assert!(ReviewPriority::High > ReviewPriority::Medium);
    assert!(ReviewPriority::Medium > ReviewPriority::Low);
  }

  #[test]
  fn test_priority_serializes_uppercase() {
    assert_eq!(serde_json::to_string(&ReviewPriority::High).unwrap(), "\"HIGH\"");
    let p: ReviewPriority = serde_json::from_str("\"MEDIUM\"").unwrap();
    assert_eq!(p, ReviewPriority::Medium);
    assert_eq!(ReviewPriority::Low.as_str(), "LOW");
  }

  #[test]
  fn test_from_state_copies_card_text() {
    let mut state = CardState::new("u1", 5, Utc::now());
    state.card = Some(crate::domain::VocabularyCard::new(
      "kenyér",
      "빵",
      crate::domain::CefrLevel::A1,
    ));
    let review = ScheduledReview::from_state(&state, ReviewPriority::Low);
    assert_eq!(review.card_id, 5);
    assert_eq!(review.hungarian.as_deref(), Some("kenyér"));
    assert_eq!(review.korean.as_deref(), Some("빵"));
  }
}
