//! Project path functions - single source of truth for all file paths.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//! - `PORT`: Override the server port (see config.rs)
//!
//! This allows running isolated instances side by side:
//! ```bash
//! DATA_DIR=data/test/a PORT=3911 cargo run
//! DATA_DIR=data/test/b PORT=3912 cargo run
//! ```

use std::env;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
  DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// SQLite database path (cards, card states and the local key-value store)
pub fn db_path() -> String {
  format!("{}/review.db", data_dir())
}

/// Config file looked up in the working directory
pub const CONFIG_FILE: &str = "config.toml";

// ==================== Storage Keys ====================

/// Storage key for the notification settings blob
pub const NOTIFICATION_SETTINGS_KEY: &str = "vocabularyNotificationSettings";

/// Storage key for a user's reminder array
pub fn reminders_key(user_id: &str) -> String {
  format!("reminders_{user_id}")
}

#[cfg(test)]
mod tests {
  use super::*;

  // OnceLock initializes once, so only the default shape is checked here.

  #[test]
  fn test_data_dir_default() {
    let dir = data_dir();
    assert!(!dir.is_empty());
  }

  #[test]
  fn test_db_path_format() {
    assert!(db_path().ends_with("/review.db"));
  }

  #[test]
  fn test_reminders_key() {
    assert_eq!(reminders_key("42"), "reminders_42");
    assert_eq!(reminders_key("kim"), "reminders_kim");
  }
}
