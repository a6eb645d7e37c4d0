//! sakani-sync - offline action queue for the Sakani real-estate client
//!
//! Mutations made while the backend is unreachable are queued, persisted as
//! a JSON snapshot in a local `SQLite` key/value store, and replayed in order
//! when connectivity returns. See [`features::sync`] for the queue itself.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod features;
pub mod output;
pub mod storage;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::SakaniError;
pub use features::sync::{ActionIntent, OfflineSync, ReplayOutcome, SyncService};
