use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a settings update is rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
  #[error("daily reminder time must be HH:MM, got {0:?}")]
  InvalidTime(String),

  #[error("upcoming alert lead time must be between 1 and 1440 minutes, got {0}")]
  InvalidLeadTime(u32),
}

/// Learner's notification preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
  /// Master switch; nothing is delivered when false
  pub enabled: bool,
  pub daily_reminder_enabled: bool,
  /// Local wall-clock time, "HH:MM"
  pub daily_reminder_time: String,
  pub upcoming_alert_enabled: bool,
  /// Minutes before a card is due
  pub upcoming_alert_minutes: u32,
  pub overdue_alert_enabled: bool,
  pub weekly_progress_enabled: bool,
  pub weekly_progress_day: Weekday,
  pub sound_enabled: bool,
}

impl Default for NotificationSettings {
  fn default() -> Self {
    Self {
      enabled: true,
      daily_reminder_enabled: true,
      daily_reminder_time: "09:00".to_string(),
      upcoming_alert_enabled: false,
      upcoming_alert_minutes: 15,
      overdue_alert_enabled: true,
      weekly_progress_enabled: true,
      weekly_progress_day: Weekday::Sun,
      sound_enabled: true,
    }
  }
}

impl NotificationSettings {
  /// Parsed daily reminder time, if well-formed
  pub fn daily_time(&self) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(self.daily_reminder_time.trim(), "%H:%M").ok()
  }

  /// Only zero-padded "HH:MM" is accepted, so the stored value is canonical
  pub fn validate(&self) -> Result<(), SettingsError> {
    let canonical = self.daily_time().map(|t| t.format("%H:%M").to_string());
    if canonical.as_deref() != Some(self.daily_reminder_time.as_str()) {
      return Err(SettingsError::InvalidTime(self.daily_reminder_time.clone()));
    }
    if !(1..=1440).contains(&self.upcoming_alert_minutes) {
      return Err(SettingsError::InvalidLeadTime(self.upcoming_alert_minutes));
    }
    Ok(())
  }
}
