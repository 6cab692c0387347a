//! Wire types for the upstream REST APIs (camelCase JSON)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{CefrLevel, VocabularyCard};

/// Filters for `GET /vocabulary/cards`
#[derive(Debug, Clone, Default)]
pub struct CardQuery {
  pub level: Option<CefrLevel>,
  pub tag: Option<String>,
  pub limit: Option<usize>,
  pub offset: Option<usize>,
}

impl CardQuery {
  pub fn to_query(&self) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(level) = self.level {
      query.push(("level", level.as_str().to_string()));
    }
    if let Some(tag) = &self.tag {
      query.push(("tag", tag.clone()));
    }
    if let Some(limit) = self.limit {
      query.push(("limit", limit.to_string()));
    }
    if let Some(offset) = self.offset {
      query.push(("offset", offset.to_string()));
    }
    query
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardsPage {
  pub cards: Vec<VocabularyCard>,
  #[serde(default)]
  pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
  pub user_id: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub card_ids: Vec<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_cards: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSession {
  pub id: String,
  pub user_id: String,
  #[serde(default)]
  pub card_ids: Vec<i64>,
  pub started_at: DateTime<Utc>,
}

/// Learner's self-assessment for one card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewRating {
  Again,
  Hard,
  Good,
  Easy,
}

impl ReviewRating {
  pub fn is_correct(&self) -> bool {
    !matches!(self, Self::Again)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
  pub card_id: i64,
  pub rating: ReviewRating,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub response_time_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
  pub session_id: String,
  #[serde(default)]
  pub reviewed: usize,
  #[serde(default)]
  pub correct: usize,
  #[serde(default)]
  pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStatistics {
  pub total_cards: usize,
  pub cards_learned: usize,
  pub due_today: usize,
  pub reviews_today: usize,
  pub streak_days: u32,
  pub retention_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminStats {
  pub total_cards: usize,
  pub total_users: usize,
  pub total_lessons: usize,
  pub cards_by_level: HashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
  pub id: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub title: String,
  #[serde(default)]
  pub level: Option<CefrLevel>,
  #[serde(default)]
  pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_card_query_pairs() {
    let query = CardQuery {
      level: Some(CefrLevel::A2),
      tag: Some("food".into()),
      limit: Some(20),
      offset: None,
    };
    assert_eq!(
      query.to_query(),
      vec![
        ("level", "A2".to_string()),
        ("tag", "food".to_string()),
        ("limit", "20".to_string()),
      ]
    );
    assert!(CardQuery::default().to_query().is_empty());
  }

  #[test]
  fn test_review_response_wire_format() {
    let response = ReviewResponse {
      card_id: 9,
      rating: ReviewRating::Good,
      response_time_ms: None,
    };
    assert_eq!(
      serde_json::to_value(&response).unwrap(),
      serde_json::json!({"cardId": 9, "rating": "good"})
    );
    assert!(!ReviewRating::Again.is_correct());
  }

  #[test]
  fn test_content_summary_type_field() {
    let json = r#"{"id": "g1", "type": "grammar", "title": "Tárgyeset"}"#;
    let summary: ContentSummary = serde_json::from_str(json).unwrap();
    assert_eq!(summary.kind, "grammar");
    assert!(summary.level.is_none());
  }
}
