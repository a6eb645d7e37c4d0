//! Storage layer for sakani.
//!
//! The offline queue persists a single JSON snapshot under one key, so the
//! storage contract is a plain string key/value store:
//! - [`Database`]: `SQLite`-backed, durable across restarts
//! - [`MemoryStore`]: in-process map

mod database;
mod memory;
mod migrations;

pub use database::Database;
pub use memory::MemoryStore;

use crate::error::SakaniError;

/// Local key/value storage for queue snapshots.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, SakaniError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), SakaniError>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), SakaniError>;
}
