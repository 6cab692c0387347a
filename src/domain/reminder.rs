use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a reminder is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
  DailyReminder,
  UpcomingReview,
  OverdueReview,
  WeeklyProgress,
}

impl ReminderKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::DailyReminder => "daily_reminder",
      Self::UpcomingReview => "upcoming_review",
      Self::OverdueReview => "overdue_review",
      Self::WeeklyProgress => "weekly_progress",
    }
  }

  /// Notification tag; same-kind notifications replace each other
  pub fn tag(&self) -> &'static str {
    match self {
      Self::DailyReminder => "vocab-daily",
      Self::UpcomingReview => "vocab-upcoming",
      Self::OverdueReview => "vocab-overdue",
      Self::WeeklyProgress => "vocab-weekly",
    }
  }

  /// Overdue alerts stay on screen until dismissed
  pub fn requires_interaction(&self) -> bool {
    matches!(self, Self::OverdueReview)
  }
}

/// Button shown on a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderAction {
  pub action: String,
  pub title: String,
}

impl ReminderAction {
  pub fn new(action: &str, title: &str) -> Self {
    Self {
      action: action.to_string(),
      title: title.to_string(),
    }
  }
}

/// Queued notification descriptor.
///
/// Persisted only as part of the bounded per-user reminder array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReminder {
  pub id: String,
  pub user_id: String,
  pub kind: ReminderKind,
  pub title: String,
  pub body: String,
  pub scheduled_at: DateTime<Utc>,
  pub created_at: DateTime<Utc>,
  #[serde(default)]
  pub sent: bool,
  #[serde(default)]
  pub card_count: usize,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub card_id: Option<i64>,
}

impl ReviewReminder {
  pub fn new(
    user_id: &str,
    kind: ReminderKind,
    title: String,
    body: String,
    scheduled_at: DateTime<Utc>,
    card_count: usize,
  ) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      user_id: user_id.to_string(),
      kind,
      title,
      body,
      scheduled_at,
      created_at: Utc::now(),
      sent: false,
      card_count,
      card_id: None,
    }
  }

  pub fn with_card(mut self, card_id: i64) -> Self {
    self.card_id = Some(card_id);
    self
  }

  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    !self.sent && self.scheduled_at <= now
  }

  /// Actions offered on the notification (never more than two)
  pub fn actions(&self) -> Vec<ReminderAction> {
    match self.kind {
      ReminderKind::DailyReminder | ReminderKind::OverdueReview => vec![
        ReminderAction::new("start-review", "복습 시작"),
        ReminderAction::new("snooze", "나중에"),
      ],
      ReminderKind::UpcomingReview => vec![ReminderAction::new("start-review", "복습 시작")],
      ReminderKind::WeeklyProgress => vec![ReminderAction::new("view-progress", "진도 보기")],
    }
  }
}
