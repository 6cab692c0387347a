use serde::{Deserialize, Serialize};

/// CEFR proficiency level used to label content
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CefrLevel {
  A1,
  A2,
  B1,
  B2,
  C1,
  C2,
}

impl CefrLevel {
  pub const ALL: [CefrLevel; 6] = [Self::A1, Self::A2, Self::B1, Self::B2, Self::C1, Self::C2];

  pub fn from_str(s: &str) -> Option<Self> {
    match s.trim().to_ascii_uppercase().as_str() {
      "A1" => Some(Self::A1),
      "A2" => Some(Self::A2),
      "B1" => Some(Self::B1),
      "B2" => Some(Self::B2),
      "C1" => Some(Self::C1),
      "C2" => Some(Self::C2),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::A1 => "A1",
      Self::A2 => "A2",
      Self::B1 => "B1",
      Self::B2 => "B2",
      Self::C1 => "C1",
      Self::C2 => "C2",
    }
  }
}

/// Example sentence pair shown on the back of a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardExample {
  pub hungarian: String,
  pub korean: String,
}

/// Static vocabulary content. Learners never mutate it; only the CMS path writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyCard {
  #[serde(default)]
  pub id: i64,
  /// Hungarian headword, e.g. "köszönöm"
  pub hungarian: String,
  /// Korean gloss, e.g. "감사합니다"
  pub korean: String,
  #[serde(default)]
  pub part_of_speech: Option<String>,
  pub level: CefrLevel,
  #[serde(default)]
  pub examples: Vec<CardExample>,
  #[serde(default)]
  pub tags: Vec<String>,
}

impl VocabularyCard {
  pub fn new(hungarian: &str, korean: &str, level: CefrLevel) -> Self {
    Self {
      id: 0,
      hungarian: hungarian.to_string(),
      korean: korean.to_string(),
      part_of_speech: None,
      level,
      examples: Vec::new(),
      tags: Vec::new(),
    }
  }

  /// Returns the reason the card can't be stored, if any
  pub fn validation_error(&self) -> Option<&'static str> {
    if self.hungarian.trim().is_empty() {
      Some("hungarian must not be empty")
    } else if self.korean.trim().is_empty() {
      Some("korean must not be empty")
    } else {
      None
    }
  }
}
