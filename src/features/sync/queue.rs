//! Ordered action queue with snapshot persistence.
//!
//! The whole queue is written as one JSON array under a single storage key
//! after every mutation. An empty queue removes the key.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use super::action::{ActionId, OfflineAction};
use crate::error::SakaniError;
use crate::storage::KeyValueStore;

/// Result of one delivery attempt, keyed back to its action by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The backend answered with a 2xx status.
    Delivered,
    /// Non-2xx status or transport failure.
    Failed(String),
}

/// Counts produced by settling a replay pass into the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settlement {
    /// Actions removed after a successful delivery.
    pub delivered: usize,
    /// Failed actions kept with an incremented retry count.
    pub retained: usize,
    /// Failed actions dropped because they had no retries left.
    pub exhausted: usize,
}

/// Queue statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    /// Actions waiting for delivery.
    pub pending: usize,
    /// Pending actions that have failed at least once.
    pub awaiting_retry: usize,
    /// Creation time of the oldest pending action.
    pub oldest: Option<DateTime<Utc>>,
}

/// In-memory queue mirrored to a key/value store.
pub struct ActionQueue {
    store: Arc<dyn KeyValueStore>,
    key: String,
    actions: Vec<OfflineAction>,
}

impl ActionQueue {
    /// Load the queue stored under `key`.
    ///
    /// A missing key is an empty queue. Unreadable or corrupt content is
    /// also treated as empty, and a corrupt snapshot is removed.
    pub fn load(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let actions = match store.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<OfflineAction>>(&raw) {
                Ok(actions) => actions,
                Err(e) => {
                    warn!(%key, error = %e, "discarding corrupt offline queue snapshot");
                    if let Err(e) = store.remove(&key) {
                        warn!(%key, error = %e, "failed to remove corrupt snapshot");
                    }
                    Vec::new()
                },
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(%key, error = %e, "failed to read offline queue; starting empty");
                Vec::new()
            },
        };

        debug!(%key, count = actions.len(), "offline queue loaded");
        Self {
            store,
            key,
            actions,
        }
    }

    /// Append an action and persist.
    ///
    /// The action stays queued in memory even if persisting fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub fn push(&mut self, action: OfflineAction) -> Result<(), SakaniError> {
        self.actions.push(action);
        self.persist()
    }

    /// Queued actions in replay order.
    #[must_use]
    pub fn actions(&self) -> &[OfflineAction] {
        &self.actions
    }

    /// Owned copy of the queue for a replay pass.
    #[must_use]
    pub fn snapshot(&self) -> Vec<OfflineAction> {
        self.actions.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Get queue statistics.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            pending: self.actions.len(),
            awaiting_retry: self.actions.iter().filter(|a| a.retry_count > 0).count(),
            oldest: self.actions.iter().map(|a| a.timestamp).min(),
        }
    }

    /// Apply the results of a replay pass and persist.
    ///
    /// Delivered actions are removed. Failed actions below `max_retries` are
    /// kept with one more recorded retry; the rest are dropped. Actions with
    /// no result (queued while the pass ran, or already cleared) are left
    /// alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written. The in-memory
    /// queue is settled either way.
    pub fn settle(
        &mut self,
        results: &HashMap<ActionId, Delivery>,
        max_retries: u32,
    ) -> (Settlement, Result<(), SakaniError>) {
        let mut settlement = Settlement::default();

        self.actions.retain_mut(|action| match results.get(&action.id) {
            None => true,
            Some(Delivery::Delivered) => {
                settlement.delivered += 1;
                false
            },
            Some(Delivery::Failed(_)) if action.can_retry(max_retries) => {
                action.retry_count += 1;
                settlement.retained += 1;
                true
            },
            Some(Delivery::Failed(reason)) => {
                warn!(
                    id = %action.id,
                    endpoint = %action.endpoint,
                    retries = action.retry_count,
                    %reason,
                    "dropping offline action after exhausting retries"
                );
                settlement.exhausted += 1;
                false
            },
        });

        (settlement, self.persist())
    }

    /// Drop every action and remove the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be removed.
    pub fn clear(&mut self) -> Result<(), SakaniError> {
        self.actions.clear();
        self.persist()
    }

    fn persist(&self) -> Result<(), SakaniError> {
        if self.actions.is_empty() {
            return self.store.remove(&self.key);
        }
        let json = serde_json::to_string(&self.actions)?;
        self.store.set(&self.key, &json)
    }
}
