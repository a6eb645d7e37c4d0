//! The offline sync facade.
//!
//! [`OfflineSync`] owns the queue and everything it needs to replay it:
//! the transport, the notifier and a view of connectivity. It is built once
//! at startup and shared by `Arc`; nothing here is process-global.
//!
//! None of the public operations fail. Persistence and delivery problems
//! are logged and folded into queue state.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::action::{ActionId, ActionIntent, OfflineAction};
use super::connectivity::ConnectivityWatch;
use super::executor::{log_summary, ReplayOutcome, ReplaySummary, SyncExecutor};
use super::notify::{Notification, Notifier};
use super::queue::{ActionQueue, QueueStats};
use super::transport::Transport;
use crate::config::SyncConfig;

/// Offline action queue with replay.
pub struct OfflineSync {
    queue: Mutex<ActionQueue>,
    executor: SyncExecutor,
    notifier: Arc<dyn Notifier>,
    connectivity: ConnectivityWatch,
    max_retries: u32,
    replay_gate: Mutex<()>,
}

impl OfflineSync {
    #[must_use]
    pub fn new(
        queue: ActionQueue,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        connectivity: ConnectivityWatch,
        config: &SyncConfig,
    ) -> Self {
        Self {
            queue: Mutex::new(queue),
            executor: SyncExecutor::new(transport),
            notifier,
            connectivity,
            max_retries: config.max_retries,
            replay_gate: Mutex::new(()),
        }
    }

    /// Queue a mutation for later delivery and acknowledge it to the user.
    pub async fn enqueue(&self, intent: ActionIntent) -> ActionId {
        let action = OfflineAction::from_intent(intent);
        let id = action.id.clone();
        debug!(%id, action_type = %action.action_type(), endpoint = %action.endpoint, "enqueue");

        if let Err(e) = self.queue.lock().await.push(action) {
            warn!(%id, error = %e, "failed to persist offline queue after enqueue");
        }

        self.notifier.notify(Notification::Saved);
        id
    }

    /// Deliver every queued action, in order.
    ///
    /// Does nothing while offline, when the queue is empty, or when another
    /// pass is already running.
    pub async fn replay_all(&self) -> ReplayOutcome {
        if !self.connectivity.is_online() {
            return ReplayOutcome::Offline;
        }

        let Ok(_gate) = self.replay_gate.try_lock() else {
            debug!("replay already in flight; skipping");
            return ReplayOutcome::AlreadyRunning;
        };

        // The queue lock is not held across deliveries, so enqueue and
        // clear stay responsive during a slow pass.
        let snapshot = self.queue.lock().await.snapshot();
        if snapshot.is_empty() {
            return ReplayOutcome::Empty;
        }

        let results = self.executor.deliver_all(&snapshot).await;

        let (settlement, persisted) = self.queue.lock().await.settle(&results, self.max_retries);
        if let Err(e) = persisted {
            warn!(error = %e, "failed to persist offline queue after replay");
        }

        let summary = ReplaySummary::from(settlement);
        log_summary(&summary);

        if summary.delivered > 0 {
            self.notifier.notify(Notification::Synced(summary.delivered));
        }
        if summary.pending > 0 {
            self.notifier.notify(Notification::Pending(summary.pending));
        }

        ReplayOutcome::Completed(summary)
    }

    /// Discard every queued action.
    pub async fn clear_all(&self) {
        let mut queue = self.queue.lock().await;
        let count = queue.len();
        if let Err(e) = queue.clear() {
            warn!(error = %e, "failed to remove offline queue snapshot");
        }
        debug!(count, "offline queue cleared");
    }

    /// Queued actions in replay order.
    pub async fn actions(&self) -> Vec<OfflineAction> {
        self.queue.lock().await.snapshot()
    }

    /// Pending, awaiting-retry and oldest-action figures.
    pub async fn stats(&self) -> QueueStats {
        self.queue.lock().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.queue.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.queue.lock().await.is_empty()
    }

    /// The connectivity view replay decisions are based on.
    #[must_use]
    pub const fn connectivity(&self) -> &ConnectivityWatch {
        &self.connectivity
    }

    pub(crate) fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }
}
