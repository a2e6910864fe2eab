use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::CoreError;

const SCHEMA_V1: &str = include_str!("../../../migrations/001_initial.sql");

/// Durable string key-value store.
///
/// Writes complete before the call returns; there is no write buffering.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;
    fn delete(&self, key: &str) -> Result<(), CoreError>;
}

/// SQLite-backed key-value storage.
pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.conn.lock().map_err(|_| CoreError::Poisoned)
    }
}

impl KeyValueStore for Storage {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        self.conn()?
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.conn()?.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                            updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CoreError> {
        self.conn()?
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

fn run_migrations(conn: &Connection) -> Result<(), CoreError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key() {
        let db = Storage::open_memory().unwrap();
        assert_eq!(db.get("wishlist").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let db = Storage::open_memory().unwrap();
        db.set("savedSearch", "dogs").unwrap();
        db.set("savedSearch", "cats").unwrap();
        assert_eq!(db.get("savedSearch").unwrap().as_deref(), Some("cats"));
    }

    #[test]
    fn test_delete() {
        let db = Storage::open_memory().unwrap();
        db.set("savedGenre", "Fiction").unwrap();
        db.delete("savedGenre").unwrap();
        db.delete("savedGenre").unwrap();
        assert_eq!(db.get("savedGenre").unwrap(), None);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gutenshelf.db");

        {
            let db = Storage::open(&path).unwrap();
            db.set("wishlist", "[84,1342]").unwrap();
        }

        let db = Storage::open(&path).unwrap();
        assert_eq!(db.get("wishlist").unwrap().as_deref(), Some("[84,1342]"));
    }
}
