pub mod cards;
pub mod schema;
pub mod storage;

use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::{CardExample, CefrLevel, VocabularyCard};

// Re-export all public items from submodules
pub use cards::*;
pub use schema::run_migrations;
pub use storage::*;

pub type DbPool = Arc<Mutex<Connection>>;

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
  /// Log the error at warn level and return None
  fn log_warn(self, context: &str) -> Option<T>;
  /// Log the error at error level and return None
  fn log_error(self, context: &str) -> Option<T>;
  /// Log the error at warn level and return the default
  fn log_warn_default(self, context: &str) -> T
  where
    T: Default;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
  fn log_warn(self, context: &str) -> Option<T> {
    match self {
      Ok(v) => Some(v),
      Err(e) => {
        tracing::warn!("{}: {}", context, e);
        None
      }
    }
  }

  fn log_error(self, context: &str) -> Option<T> {
    match self {
      Ok(v) => Some(v),
      Err(e) => {
        tracing::error!("{}: {}", context, e);
        None
      }
    }
  }

  fn log_warn_default(self, context: &str) -> T
  where
    T: Default,
  {
    match self {
      Ok(v) => v,
      Err(e) => {
        tracing::warn!("{}: {}", context, e);
        T::default()
      }
    }
  }
}

/// Error returned when database lock cannot be acquired
#[derive(Debug)]
pub struct DbLockError;

impl std::fmt::Display for DbLockError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Database unavailable")
  }
}

impl std::error::Error for DbLockError {}

/// Try to acquire the database lock, returning an error if poisoned
pub fn try_lock(pool: &DbPool) -> std::result::Result<MutexGuard<'_, Connection>, DbLockError> {
  pool.lock().map_err(|_: PoisonError<_>| {
    tracing::error!("Database mutex poisoned - a thread panicked while holding the lock");
    DbLockError
  })
}

pub fn init_db(path: &Path) -> Result<DbPool> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).ok();
  }

  // Create backup before migrations if database exists
  if path.exists() {
    let backup_path = path.with_extension("db.backup");
    if let Err(e) = std::fs::copy(path, &backup_path) {
      tracing::warn!("Could not create database backup: {}", e);
    }
  }

  let conn = Connection::open(path)?;
  run_migrations(&conn)?;
  Ok(Arc::new(Mutex::new(conn)))
}

/// Open an in-memory database with the full schema
pub fn init_memory_db() -> Result<DbPool> {
  let conn = Connection::open_in_memory()?;
  run_migrations(&conn)?;
  Ok(Arc::new(Mutex::new(conn)))
}

/// Seed a starter A1 deck into an empty database. Returns the number inserted.
pub fn seed_vocabulary_cards(conn: &Connection) -> Result<usize> {
  if count_cards(conn)? > 0 {
    return Ok(0);
  }

  let cards = get_starter_deck();
  for card in &cards {
    insert_card(conn, card)?;
  }
  Ok(cards.len())
}

// Helper to create a card with an optional example pair
fn card(hu: &str, ko: &str, pos: &str, example: Option<(&str, &str)>, tags: &[&str]) -> VocabularyCard {
  let mut card = VocabularyCard::new(hu, ko, CefrLevel::A1);
  card.part_of_speech = Some(pos.to_string());
  card.examples = example
    .map(|(hungarian, korean)| {
      vec![CardExample {
        hungarian: hungarian.to_string(),
        korean: korean.to_string(),
      }]
    })
    .unwrap_or_default();
  card.tags = tags.iter().map(|t| t.to_string()).collect();
  card
}

fn get_starter_deck() -> Vec<VocabularyCard> {
  vec![
    card("szia", "안녕", "interjection", Some(("Szia, Péter!", "안녕, 페테르!")), &["greeting"]),
    card("köszönöm", "감사합니다", "interjection", Some(("Köszönöm szépen.", "정말 감사합니다.")), &["greeting"]),
    card("igen", "네", "adverb", None, &["basic"]),
    card("nem", "아니요", "adverb", None, &["basic"]),
    card("víz", "물", "noun", Some(("Kérek egy pohár vizet.", "물 한 잔 주세요.")), &["food"]),
    card("kenyér", "빵", "noun", None, &["food"]),
    card("alma", "사과", "noun", Some(("Ez egy piros alma.", "이것은 빨간 사과입니다.")), &["food"]),
    card("ház", "집", "noun", Some(("A ház nagy.", "집이 큽니다.")), &["place"]),
    card("iskola", "학교", "noun", None, &["place"]),
    card("barát", "친구", "noun", Some(("Ő a barátom.", "그는 내 친구입니다.")), &["people"]),
    card("enni", "먹다", "verb", Some(("Szeretek enni.", "나는 먹는 것을 좋아합니다.")), &["verb"]),
    card("inni", "마시다", "verb", None, &["verb"]),
    card("menni", "가다", "verb", Some(("Haza megyek.", "집에 갑니다.")), &["verb"]),
    card("nagy", "큰", "adjective", None, &["adjective"]),
    card("kicsi", "작은", "adjective", None, &["adjective"]),
    card("ma", "오늘", "adverb", Some(("Ma hideg van.", "오늘은 춥습니다.")), &["time"]),
    card("holnap", "내일", "adverb", None, &["time"]),
    card("tegnap", "어제", "adverb", None, &["time"]),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_seed_only_into_empty_db() {
    let pool = init_memory_db().unwrap();
    let conn = try_lock(&pool).unwrap();
    let inserted = seed_vocabulary_cards(&conn).unwrap();
    assert!(inserted > 0);
    assert_eq!(seed_vocabulary_cards(&conn).unwrap(), 0);
    assert_eq!(count_cards(&conn).unwrap(), inserted as i64);
  }

  #[test]
  fn test_log_warn_default() {
    let err: std::result::Result<u32, String> = Err("boom".into());
    assert_eq!(err.log_warn_default("ctx"), 0);
    let ok: std::result::Result<u32, String> = Ok(3);
    assert_eq!(ok.log_warn("ctx"), Some(3));
  }

  #[test]
  fn test_init_db_creates_parent_dirs() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("nested").join("review.db");
    let pool = init_db(&path).unwrap();
    drop(pool);
    assert!(path.exists());

    // Second open takes a backup copy first
    let _pool = init_db(&path).unwrap();
    assert!(path.with_extension("db.backup").exists());
  }
}
