//! Notification delivery seam.

use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;

use crate::config::MAX_NOTIFICATION_ACTIONS;
use crate::domain::{NotificationSettings, ReminderAction, ReviewReminder};

/// What gets shown to the learner
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
  pub title: String,
  pub body: String,
  /// Notifications sharing a tag replace each other
  pub tag: String,
  pub require_interaction: bool,
  pub silent: bool,
  pub actions: Vec<ReminderAction>,
  pub reminder_id: String,
  pub user_id: String,
}

impl Notification {
  pub fn from_reminder(reminder: &ReviewReminder, settings: &NotificationSettings) -> Self {
    let mut actions = reminder.actions();
    actions.truncate(MAX_NOTIFICATION_ACTIONS);

    Self {
      title: reminder.title.clone(),
      body: reminder.body.clone(),
      tag: reminder.kind.tag().to_string(),
      require_interaction: reminder.kind.requires_interaction(),
      silent: !settings.sound_enabled,
      actions,
      reminder_id: reminder.id.clone(),
      user_id: reminder.user_id.clone(),
    }
  }
}

#[derive(Debug, Error)]
pub enum NotifyError {
  #[error("notifications not supported: {0}")]
  Unsupported(String),

  #[error("delivery failed: {0}")]
  Delivery(String),
}

/// Delivers notifications. Implementations must not block for long; they
/// are called from the queue tick.
pub trait Notifier: Send + Sync {
  fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
  fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
    tracing::info!(
      target: "notifications",
      user = %notification.user_id,
      tag = %notification.tag,
      require_interaction = notification.require_interaction,
      "{}: {}",
      notification.title,
      notification.body
    );
    Ok(())
  }
}

/// Keeps every delivered notification in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
  delivered: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn delivered(&self) -> Vec<Notification> {
    self.delivered.lock().map(|d| d.clone()).unwrap_or_default()
  }

  pub fn count(&self) -> usize {
    self.delivered.lock().map(|d| d.len()).unwrap_or(0)
  }
}

impl Notifier for RecordingNotifier {
  fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
    self
      .delivered
      .lock()
      .map_err(|_| NotifyError::Delivery("recorder poisoned".into()))?
      .push(notification.clone());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ReminderKind;
  use chrono::Utc;

  #[test]
  fn test_from_reminder() {
    let reminder = ReviewReminder::new(
      "u1",
      ReminderKind::OverdueReview,
      "밀린 복습이 있어요".into(),
      "3장".into(),
      Utc::now(),
      3,
    );
    let settings = NotificationSettings {
      sound_enabled: false,
      ..Default::default()
    };

    let n = Notification::from_reminder(&reminder, &settings);
    assert_eq!(n.tag, "vocab-overdue");
    assert!(n.require_interaction);
    assert!(n.silent);
    assert_eq!(n.actions.len(), 2);
    assert_eq!(n.reminder_id, reminder.id);
  }

  #[test]
  fn test_recording_notifier() {
    let recorder = RecordingNotifier::new();
    let reminder = ReviewReminder::new("u1", ReminderKind::WeeklyProgress, "t".into(), "b".into(), Utc::now(), 0);
    let n = Notification::from_reminder(&reminder, &NotificationSettings::default());
    recorder.notify(&n).unwrap();
    TracingNotifier.notify(&n).unwrap();
    assert_eq!(recorder.count(), 1);
    assert_eq!(recorder.delivered()[0].tag, "vocab-weekly");
  }
}
