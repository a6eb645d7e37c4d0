//! Schema setup for the key/value database.
//!
//! The schema version lives in `PRAGMA user_version`. Opening a database
//! older than [`CURRENT_VERSION`] creates the `kv_store` table and stamps
//! the version in one transaction.

use rusqlite::Connection;

use crate::error::SakaniError;

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;

const SCHEMA_V1: &str = r"
    CREATE TABLE IF NOT EXISTS kv_store (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    PRAGMA user_version = 1;
";

/// Schema version of `conn`; 0 for a fresh database.
pub fn get_version(conn: &Connection) -> Result<i32, SakaniError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| SakaniError::Database(format!("Failed to get schema version: {e}")))
}

/// Bring `conn` up to [`CURRENT_VERSION`].
///
/// A database from a newer build is left untouched and rejected.
pub fn run(conn: &Connection) -> Result<(), SakaniError> {
    match get_version(conn)? {
        CURRENT_VERSION => Ok(()),
        0 => conn
            .execute_batch(&format!("BEGIN;{SCHEMA_V1}COMMIT;"))
            .map_err(|e| SakaniError::Database(format!("Failed to create schema: {e}"))),
        newer => Err(SakaniError::Database(format!(
            "Database schema version {newer} is newer than supported version {CURRENT_VERSION}"
        ))),
    }
}
