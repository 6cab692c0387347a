//! Small TTL memory cache for GET responses

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Entries expire `ttl` after insertion; expired entries are dropped on read.
pub struct TtlCache<V> {
  ttl: Duration,
  entries: Mutex<HashMap<String, (Instant, V)>>,
}

impl<V: Clone> TtlCache<V> {
  pub fn new(ttl: Duration) -> Self {
    Self {
      ttl,
      entries: Mutex::new(HashMap::new()),
    }
  }

  pub fn get(&self, key: &str) -> Option<V> {
    let mut entries = self.entries.lock().ok()?;
    match entries.get(key) {
      Some((inserted, value)) if inserted.elapsed() < self.ttl => Some(value.clone()),
      Some(_) => {
        entries.remove(key);
        None
      }
      None => None,
    }
  }

  pub fn insert(&self, key: String, value: V) {
    // A zero TTL disables caching
    if self.ttl.is_zero() {
      return;
    }
    if let Ok(mut entries) = self.entries.lock() {
      entries.insert(key, (Instant::now(), value));
    }
  }

  pub fn clear(&self) {
    if let Ok(mut entries) = self.entries.lock() {
      entries.clear();
    }
  }

  pub fn len(&self) -> usize {
    self.entries.lock().map(|e| e.len()).unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
