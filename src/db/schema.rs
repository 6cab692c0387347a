use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  // Complete schema for new databases; migrations below handle upgrades
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS vocabulary_cards (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      hungarian TEXT NOT NULL,
      korean TEXT NOT NULL,
      part_of_speech TEXT,
      level TEXT NOT NULL,
      examples TEXT NOT NULL DEFAULT '[]',
      tags TEXT NOT NULL DEFAULT '[]'
    );

    CREATE TABLE IF NOT EXISTS card_states (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id TEXT NOT NULL,
      card_id INTEGER NOT NULL,
      stability REAL NOT NULL DEFAULT 0,
      difficulty REAL NOT NULL DEFAULT 0,
      retrievability REAL NOT NULL DEFAULT 1,
      lapses INTEGER NOT NULL DEFAULT 0,
      reps INTEGER NOT NULL DEFAULT 0,
      state TEXT NOT NULL DEFAULT 'New',
      last_review TEXT,
      next_review TEXT NOT NULL,
      UNIQUE (user_id, card_id),
      FOREIGN KEY (card_id) REFERENCES vocabulary_cards(id)
    );

    -- Key-value blobs (settings, reminder arrays); last write wins
    CREATE TABLE IF NOT EXISTS local_storage (
      key TEXT PRIMARY KEY,
      value TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_cards_level ON vocabulary_cards(level);
    CREATE INDEX IF NOT EXISTS idx_card_states_user_next ON card_states(user_id, next_review);
    "#,
  )?;

  // ============================================================
  // MIGRATIONS FOR EXISTING DATABASES
  // ============================================================

  add_column_if_missing(conn, "card_states", "reps", "INTEGER NOT NULL DEFAULT 0")?;

  Ok(())
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
  conn
    .prepare(&format!("SELECT {} FROM {} LIMIT 1", column, table))
    .is_ok()
}

/// Add a column if it doesn't already exist
fn add_column_if_missing(conn: &Connection, table: &str, column: &str, column_def: &str) -> Result<()> {
  if !column_exists(conn, table, column) {
    conn.execute(
      &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def),
      [],
    )?;
  }
  Ok(())
}
