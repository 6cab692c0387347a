//! Key-value blob store (settings, reminder arrays).
//!
//! No locking beyond SQLite's own; concurrent writers race and the last write wins.

use rusqlite::{params, Connection, OptionalExtension, Result};

pub fn get_item(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM local_storage WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_item(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        r#"
    INSERT INTO local_storage (key, value) VALUES (?1, ?2)
    ON CONFLICT (key) DO UPDATE SET value = excluded.value
    "#,
        params![key, value],
    )?;
    Ok(())
}

pub fn remove_item(conn: &Connection, key: &str) -> Result<bool> {
    let removed = conn.execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
    Ok(removed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    #[test]
    fn test_set_get_overwrite_remove() {
        let env = TestEnv::new().unwrap();
        assert_eq!(get_item(&env.conn, "k").unwrap(), None);

        set_item(&env.conn, "k", "one").unwrap();
        set_item(&env.conn, "k", "two").unwrap();
        assert_eq!(get_item(&env.conn, "k").unwrap().as_deref(), Some("two"));

        assert!(remove_item(&env.conn, "k").unwrap());
        assert!(!remove_item(&env.conn, "k").unwrap());
        assert_eq!(get_item(&env.conn, "k").unwrap(), None);
    }
}
