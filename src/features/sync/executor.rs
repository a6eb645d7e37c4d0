//! Replay executor.
//!
//! Delivers a snapshot of queued actions one at a time, in order, and
//! reports what happened to each.

use std::collections::HashMap;
use std::sync::Arc;

use colored::Colorize;
use serde::Serialize;
use tracing::{debug, info};

use super::action::{ActionId, OfflineAction};
use super::queue::{Delivery, Settlement};
use super::transport::{is_success, DeliveryRequest, Transport};

/// Sequential deliverer of queued actions.
#[derive(Clone)]
pub struct SyncExecutor {
    transport: Arc<dyn Transport>,
}

impl SyncExecutor {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Deliver each action in order, awaiting each before the next.
    pub async fn deliver_all(&self, actions: &[OfflineAction]) -> HashMap<ActionId, Delivery> {
        let mut results = HashMap::with_capacity(actions.len());

        for action in actions {
            let delivery = self.deliver_one(action).await;
            results.insert(action.id.clone(), delivery);
        }

        results
    }

    /// Deliver a single action. Never fails; failures become `Delivery::Failed`.
    pub async fn deliver_one(&self, action: &OfflineAction) -> Delivery {
        let request = DeliveryRequest::for_action(action);
        let method = request.method;

        match self.transport.deliver(request).await {
            Ok(status) if is_success(status) => {
                debug!(id = %action.id, %method, endpoint = %action.endpoint, status, "action delivered");
                Delivery::Delivered
            },
            Ok(status) => {
                debug!(id = %action.id, %method, endpoint = %action.endpoint, status, "action rejected");
                Delivery::Failed(format!("HTTP {status}"))
            },
            Err(e) => {
                debug!(id = %action.id, %method, endpoint = %action.endpoint, error = %e, "action delivery failed");
                Delivery::Failed(e.to_string())
            },
        }
    }
}

/// Counts from one completed replay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Actions delivered and removed.
    pub delivered: usize,
    /// Failed actions still queued for a later pass.
    pub pending: usize,
    /// Failed actions dropped after their last retry.
    pub exhausted: usize,
}

impl ReplaySummary {
    /// Get total actions attempted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.delivered + self.pending + self.exhausted
    }
}

impl From<Settlement> for ReplaySummary {
    fn from(settlement: Settlement) -> Self {
        Self {
            delivered: settlement.delivered,
            pending: settlement.retained,
            exhausted: settlement.exhausted,
        }
    }
}

/// What a call to `replay_all` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReplayOutcome {
    /// Not attempted: connectivity is absent.
    Offline,
    /// Not attempted: nothing queued.
    Empty,
    /// Not attempted: another pass is in flight.
    AlreadyRunning,
    /// A pass ran.
    Completed(ReplaySummary),
}

impl ReplayOutcome {
    /// The summary, if a pass ran.
    #[must_use]
    pub const fn summary(&self) -> Option<ReplaySummary> {
        match self {
            Self::Completed(summary) => Some(*summary),
            _ => None,
        }
    }
}

pub(crate) fn log_summary(summary: &ReplaySummary) {
    info!(
        delivered = summary.delivered,
        pending = summary.pending,
        exhausted = summary.exhausted,
        "replay pass finished"
    );
}

/// Format a replay outcome for display.
#[must_use]
pub fn format_replay_outcome(outcome: &ReplayOutcome) -> String {
    let summary = match outcome {
        ReplayOutcome::Offline => return "Offline; nothing replayed.".yellow().to_string(),
        ReplayOutcome::Empty => return "No pending actions to sync.".to_string(),
        ReplayOutcome::AlreadyRunning => {
            return "A replay is already in progress.".dimmed().to_string()
        },
        ReplayOutcome::Completed(summary) => summary,
    };

    let mut lines = Vec::new();

    lines.push(format!("Replay completed: {} actions", summary.total()));
    lines.push("─".repeat(40));

    if summary.delivered > 0 {
        lines.push(format!(
            "  {} {}",
            "✓".green(),
            format!("{} delivered", summary.delivered).green()
        ));
    }

    if summary.pending > 0 {
        lines.push(format!(
            "  {} {}",
            "↻".yellow(),
            format!("{} pending retry", summary.pending).yellow()
        ));
    }

    if summary.exhausted > 0 {
        lines.push(format!(
            "  {} {}",
            "✗".red(),
            format!("{} dropped after retries", summary.exhausted).red()
        ));
    }

    lines.join("\n")
}
