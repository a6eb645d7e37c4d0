//! Output formatting for sakani.
//!
//! This module renders queue contents and statistics as pretty text or JSON.

mod json;
mod pretty;

use crate::cli::args::OutputFormat;
use crate::error::SakaniError;
use crate::features::sync::{OfflineAction, QueueStats};

pub use json::*;
pub use pretty::*;

/// Format queued actions based on output format
///
/// `total` is the queue length before any limit was applied.
///
/// # Errors
///
/// Returns `SakaniError::Json` if JSON serialization fails.
pub fn format_actions(
    actions: &[OfflineAction],
    total: usize,
    format: OutputFormat,
) -> Result<String, SakaniError> {
    match format {
        OutputFormat::Pretty => Ok(format_actions_pretty(actions, total)),
        OutputFormat::Json => format_actions_json(actions, total),
    }
}

/// Format queue statistics based on output format
///
/// # Errors
///
/// Returns `SakaniError::Json` if JSON serialization fails.
pub fn format_stats(stats: &QueueStats, format: OutputFormat) -> Result<String, SakaniError> {
    match format {
        OutputFormat::Pretty => Ok(format_stats_pretty(stats)),
        OutputFormat::Json => format_stats_json(stats),
    }
}
