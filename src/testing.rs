//! Test utilities for database setup.
//!
//! Reuses the authoritative schema initialization so tests never carry
//! their own copy of the schema.

use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::db::DbPool;

/// Test environment with a migrated review.db in a temporary directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// review.db connection with the full schema
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let conn = Connection::open(temp.path().join("review.db"))?;
        crate::db::schema::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }

    /// Hand the connection over as a pool (the TempDir must outlive it).
    pub fn into_pool(self) -> (TempDir, DbPool) {
        (self.temp, Arc::new(Mutex::new(self.conn)))
    }
}
