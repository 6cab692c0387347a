//! Persisted notification settings and per-user reminder arrays.

use rusqlite::{Connection, Result};

use crate::config::MAX_STORED_REMINDERS;
use crate::db;
use crate::domain::{NotificationSettings, ReviewReminder};
use crate::paths::{reminders_key, NOTIFICATION_SETTINGS_KEY};

/// Stored settings, or defaults when missing or unreadable
pub fn load_notification_settings(conn: &Connection) -> NotificationSettings {
  let raw = match db::get_item(conn, NOTIFICATION_SETTINGS_KEY) {
    Ok(Some(raw)) => raw,
    Ok(None) => return NotificationSettings::default(),
    Err(e) => {
      tracing::error!("Failed to read notification settings: {}", e);
      return NotificationSettings::default();
    }
  };

  serde_json::from_str(&raw).unwrap_or_else(|e| {
    tracing::warn!("Corrupt notification settings, using defaults: {}", e);
    NotificationSettings::default()
  })
}

pub fn save_notification_settings(conn: &Connection, settings: &NotificationSettings) -> Result<()> {
  let json = to_json(settings)?;
  db::set_item(conn, NOTIFICATION_SETTINGS_KEY, &json)
}

/// A user's stored reminders, oldest first. Corrupt data reads as empty.
pub fn load_reminders(conn: &Connection, user_id: &str) -> Result<Vec<ReviewReminder>> {
  let Some(raw) = db::get_item(conn, &reminders_key(user_id))? else {
    return Ok(Vec::new());
  };

  Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
    tracing::warn!("Corrupt reminder array for {}, starting over: {}", user_id, e);
    Vec::new()
  }))
}

/// Append a reminder to its user's array, evicting the oldest past the cap.
/// Returns the stored length.
pub fn save_reminder_to_storage(conn: &Connection, reminder: &ReviewReminder) -> Result<usize> {
  let mut reminders = load_reminders(conn, &reminder.user_id)?;
  reminders.push(reminder.clone());

  if reminders.len() > MAX_STORED_REMINDERS {
    let excess = reminders.len() - MAX_STORED_REMINDERS;
    reminders.drain(..excess);
  }

  db::set_item(conn, &reminders_key(&reminder.user_id), &to_json(&reminders)?)?;
  Ok(reminders.len())
}

/// Flag a stored reminder as delivered. Returns false if it isn't stored
/// (evicted by the cap, or never persisted).
pub fn mark_reminder_sent(conn: &Connection, user_id: &str, reminder_id: &str) -> Result<bool> {
  let mut reminders = load_reminders(conn, user_id)?;
  let Some(reminder) = reminders.iter_mut().find(|r| r.id == reminder_id) else {
    return Ok(false);
  };
  if reminder.sent {
    return Ok(true);
  }
  reminder.sent = true;

  db::set_item(conn, &reminders_key(user_id), &to_json(&reminders)?)?;
  Ok(true)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
  serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ReminderKind;
  use crate::testing::TestEnv;
  use chrono::{Utc, Weekday};

  fn reminder(user: &str, n: usize) -> ReviewReminder {
    ReviewReminder::new(
      user,
      ReminderKind::DailyReminder,
      format!("title {n}"),
      "body".into(),
      Utc::now(),
      n,
    )
  }

  #[test]
  fn test_missing_settings_load_defaults() {
    let env = TestEnv::new().unwrap();
    assert_eq!(load_notification_settings(&env.conn), NotificationSettings::default());
  }

  #[test]
  fn test_corrupt_settings_load_defaults() {
    let env = TestEnv::new().unwrap();
    db::set_item(&env.conn, NOTIFICATION_SETTINGS_KEY, "{not json").unwrap();
    assert_eq!(load_notification_settings(&env.conn), NotificationSettings::default());
  }

  #[test]
  fn test_settings_save_load_is_idempotent() {
    let env = TestEnv::new().unwrap();
    let settings = NotificationSettings {
      daily_reminder_time: "21:30".into(),
      weekly_progress_day: Weekday::Fri,
      sound_enabled: false,
      ..Default::default()
    };
    save_notification_settings(&env.conn, &settings).unwrap();
    let first = db::get_item(&env.conn, NOTIFICATION_SETTINGS_KEY).unwrap();

    let loaded = load_notification_settings(&env.conn);
    assert_eq!(loaded, settings);
    save_notification_settings(&env.conn, &loaded).unwrap();
    assert_eq!(db::get_item(&env.conn, NOTIFICATION_SETTINGS_KEY).unwrap(), first);
  }

  #[test]
  fn test_reminder_array_is_capped_oldest_first() {
    let env = TestEnv::new().unwrap();
    for n in 0..(MAX_STORED_REMINDERS + 17) {
      let len = save_reminder_to_storage(&env.conn, &reminder("u1", n)).unwrap();
      assert!(len <= MAX_STORED_REMINDERS);
    }

    let stored = load_reminders(&env.conn, "u1").unwrap();
    assert_eq!(stored.len(), MAX_STORED_REMINDERS);
    assert_eq!(stored.first().unwrap().card_count, 17);
    assert_eq!(stored.last().unwrap().card_count, MAX_STORED_REMINDERS + 16);
  }

  #[test]
  fn test_reminder_arrays_are_per_user() {
    let env = TestEnv::new().unwrap();
    save_reminder_to_storage(&env.conn, &reminder("a", 1)).unwrap();
    save_reminder_to_storage(&env.conn, &reminder("b", 2)).unwrap();
    save_reminder_to_storage(&env.conn, &reminder("b", 3)).unwrap();
    assert_eq!(load_reminders(&env.conn, "a").unwrap().len(), 1);
    assert_eq!(load_reminders(&env.conn, "b").unwrap().len(), 2);
    assert!(load_reminders(&env.conn, "c").unwrap().is_empty());
  }

  #[test]
  fn test_mark_reminder_sent() {
    let env = TestEnv::new().unwrap();
    let first = reminder("u1", 1);
    let second = reminder("u1", 2);
    save_reminder_to_storage(&env.conn, &first).unwrap();
    save_reminder_to_storage(&env.conn, &second).unwrap();

    assert!(mark_reminder_sent(&env.conn, "u1", &second.id).unwrap());
    assert!(mark_reminder_sent(&env.conn, "u1", &second.id).unwrap());
    assert!(!mark_reminder_sent(&env.conn, "u1", "missing").unwrap());
    assert!(!mark_reminder_sent(&env.conn, "u2", &first.id).unwrap());

    let stored = load_reminders(&env.conn, "u1").unwrap();
    assert_eq!(stored.iter().map(|r| r.sent).collect::<Vec<_>>(), vec![false, true]);
  }

  #[test]
  fn test_corrupt_reminder_array_recovers() {
    let env = TestEnv::new().unwrap();
    db::set_item(&env.conn, &reminders_key("u1"), "[{]").unwrap();
    assert!(load_reminders(&env.conn, "u1").unwrap().is_empty());
    assert_eq!(save_reminder_to_storage(&env.conn, &reminder("u1", 0)).unwrap(), 1);
  }
}
