//! `SQLite` key/value store.
//!
//! The database is stored at `~/.sakani/sakani.db` and holds the `kv_store`
//! table the offline queue writes its snapshot into.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::SakaniError;

use super::{migrations, KeyValueStore};

/// Database connection wrapper.
///
/// The connection sits behind a mutex so the store can be shared with the
/// async queue across tasks.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at a specific path.
    ///
    /// Creates the database file and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_at(path: &std::path::Path) -> Result<Self, SakaniError> {
        let conn = Connection::open(path).map_err(|e| {
            SakaniError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;

        Self::from_connection(conn)
    }

    /// Open an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_in_memory() -> Result<Self, SakaniError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            SakaniError::Database(format!("Failed to open in-memory database: {e}"))
        })?;

        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, SakaniError> {
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, SakaniError> {
        migrations::get_version(&*self.lock()?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SakaniError> {
        self.conn
            .lock()
            .map_err(|_| SakaniError::Database("Database connection lock poisoned".to_string()))
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, SakaniError> {
        self.lock()?
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| SakaniError::Database(format!("Failed to read key {key}: {e}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SakaniError> {
        self.lock()?
            .execute(
                r"INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                  ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map_err(|e| SakaniError::Database(format!("Failed to write key {key}: {e}")))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SakaniError> {
        self.lock()?
            .execute("DELETE FROM kv_store WHERE key = ?1", [key])
            .map_err(|e| SakaniError::Database(format!("Failed to remove key {key}: {e}")))?;

        Ok(())
    }
}
