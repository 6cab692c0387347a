//! Application configuration.
//!
//! Constants for the scheduler and notification pipeline live here, plus the
//! runtime `Config` resolved with priority: config.toml > .env/environment > default.

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

use crate::paths;

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Default server port (override with PORT)
pub const SERVER_PORT: u16 = 3910;

// ==================== Scheduler Configuration ====================

/// Maximum card states fetched per schedule build
pub const SCHEDULE_FETCH_LIMIT: usize = 1000;

/// Whole-cache invalidation period for review schedules
pub const CACHE_INVALIDATION_INTERVAL_SECS: u64 = 5 * 60;

/// Notification queue tick
pub const QUEUE_TICK_SECS: u64 = 60;

/// Days covered by the weekly load histogram
pub const WEEKLY_LOAD_DAYS: i64 = 7;

/// Reminders older than this (by scheduled time) are dropped from the queue
pub const REMINDER_MAX_AGE_HOURS: i64 = 24;

/// Cap on the stored reminder array per user (oldest evicted first)
pub const MAX_STORED_REMINDERS: usize = 50;

/// Browser-style notifications carry at most two actions
pub const MAX_NOTIFICATION_ACTIONS: usize = 2;

/// Local hour at which the weekly progress summary is sent
pub const WEEKLY_PROGRESS_HOUR: u32 = 19;

/// Learners are in Korea by default (KST, UTC+9)
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

// ==================== Upstream API Configuration ====================

/// Vocabulary API base URL
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3901/api";

/// Admin API base URL
pub const DEFAULT_ADMIN_BASE_URL: &str = "http://localhost:3001/api";

/// TTL for the client-side GET cache
pub const DEFAULT_API_CACHE_TTL_SECS: u64 = 60;

/// Per-request timeout for upstream calls
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Where the scheduler reads card states from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardSource {
  /// Local SQLite card_states table
  #[default]
  Local,
  /// Upstream vocabulary API
  Remote,
}

impl CardSource {
  pub fn from_str(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "local" => Some(Self::Local),
      "remote" => Some(Self::Remote),
      _ => None,
    }
  }
}

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
  server: Option<ServerSection>,
  database: Option<DatabaseSection>,
  scheduler: Option<SchedulerSection>,
  api: Option<ApiSection>,
  admin: Option<AdminSection>,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
  port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
  path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SchedulerSection {
  source: Option<CardSource>,
  utc_offset_hours: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ApiSection {
  base_url: Option<String>,
  token: Option<String>,
  cache_ttl_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct AdminSection {
  base_url: Option<String>,
  key: Option<String>,
}

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
  pub port: u16,
  pub database_path: PathBuf,
  pub card_source: CardSource,
  pub utc_offset_hours: i32,
  pub api_base_url: String,
  pub api_token: Option<String>,
  pub api_cache_ttl_secs: u64,
  pub admin_base_url: String,
  pub admin_key: Option<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      port: SERVER_PORT,
      database_path: PathBuf::from(paths::db_path()),
      card_source: CardSource::Local,
      utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
      api_base_url: DEFAULT_API_BASE_URL.to_string(),
      api_token: None,
      api_cache_ttl_secs: DEFAULT_API_CACHE_TTL_SECS,
      admin_base_url: DEFAULT_ADMIN_BASE_URL.to_string(),
      admin_key: None,
    }
  }
}

impl Config {
  /// Load config.toml (if present) and the process environment
  pub fn load() -> Self {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let file_contents = std::fs::read_to_string(paths::CONFIG_FILE).ok();
    if file_contents.is_some() {
      tracing::info!("Using configuration from {}", paths::CONFIG_FILE);
    }

    Self::resolve(file_contents.as_deref(), |key| std::env::var(key).ok())
  }

  /// Resolve from optional TOML contents and an environment lookup.
  ///
  /// A file that fails to parse is logged and ignored.
  pub fn resolve(file_contents: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Self {
    let file = match file_contents.map(toml::from_str::<FileConfig>) {
      Some(Ok(file)) => file,
      Some(Err(e)) => {
        tracing::warn!("Ignoring malformed {}: {}", paths::CONFIG_FILE, e);
        FileConfig::default()
      }
      None => FileConfig::default(),
    };

    let defaults = Self::default();

    let port = file
      .server
      .and_then(|s| s.port)
      .or_else(|| parsed_env(&env, "PORT"))
      .unwrap_or(defaults.port);

    let database_path = file
      .database
      .and_then(|d| d.path)
      .or_else(|| env("DATABASE_PATH"))
      .map(PathBuf::from)
      .unwrap_or(defaults.database_path);

    let (file_source, file_offset) = file
      .scheduler
      .map(|s| (s.source, s.utc_offset_hours))
      .unwrap_or((None, None));

    let card_source = file_source
      .or_else(|| env("CARD_SOURCE").and_then(|v| CardSource::from_str(&v)))
      .unwrap_or(defaults.card_source);

    let utc_offset_hours = file_offset
      .or_else(|| parsed_env(&env, "UTC_OFFSET_HOURS"))
      .filter(|h: &i32| (-12..=14).contains(h))
      .unwrap_or(defaults.utc_offset_hours);

    let (file_api_url, file_token, file_ttl) = file
      .api
      .map(|a| (a.base_url, a.token, a.cache_ttl_secs))
      .unwrap_or((None, None, None));

    let (file_admin_url, file_admin_key) = file
      .admin
      .map(|a| (a.base_url, a.key))
      .unwrap_or((None, None));

    Self {
      port,
      database_path,
      card_source,
      utc_offset_hours,
      api_base_url: file_api_url
        .or_else(|| env("VOCABULARY_API_URL"))
        .unwrap_or(defaults.api_base_url),
      api_token: file_token.or_else(|| env("VOCABULARY_API_TOKEN")),
      api_cache_ttl_secs: file_ttl
        .or_else(|| parsed_env(&env, "VOCABULARY_API_CACHE_TTL_SECS"))
        .unwrap_or(defaults.api_cache_ttl_secs),
      admin_base_url: file_admin_url
        .or_else(|| env("ADMIN_API_URL"))
        .unwrap_or(defaults.admin_base_url),
      admin_key: file_admin_key.or_else(|| env("ADMIN_API_KEY")),
    }
  }

  /// Full server bind address
  pub fn bind_addr(&self) -> String {
    format!("{}:{}", SERVER_ADDR, self.port)
  }

  /// Learner's UTC offset used for day boundaries
  pub fn utc_offset(&self) -> FixedOffset {
    utc_offset(self.utc_offset_hours)
  }
}

fn parsed_env<T: FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
  env(key).and_then(|v| v.trim().parse().ok())
}

/// Offset for a whole-hour shift, falling back to UTC when out of range
pub fn utc_offset(hours: i32) -> FixedOffset {
  FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix())
}
