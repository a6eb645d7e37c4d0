//! Offline action queue.
//!
//! Mutations made while the backend is unreachable are queued locally,
//! persisted as a JSON snapshot, and replayed in order once connectivity
//! returns.
//!
//! Features:
//! - Typed create/update/delete actions with explicit payloads
//! - Bounded retry across replay passes (3 by default), then silent drop
//! - At most one replay pass in flight
//! - Connectivity-driven and periodic replay via [`SyncService`]

pub mod action;
pub mod connectivity;
pub mod executor;
pub mod notify;
pub mod offline;
pub mod queue;
pub mod service;
pub mod transport;

pub use action::{ActionId, ActionIntent, ActionKind, ActionType, Endpoint, OfflineAction, Payload};
pub use connectivity::{
    channel, Connectivity, ConnectivityMonitor, ConnectivityProbe, ConnectivitySignal,
    ConnectivityWatch, Transition,
};
pub use executor::{format_replay_outcome, ReplayOutcome, ReplaySummary, SyncExecutor};
pub use notify::{ConsoleNotifier, Notification, Notifier};
pub use offline::OfflineSync;
pub use queue::{ActionQueue, QueueStats};
pub use service::SyncService;
pub use transport::{DeliveryRequest, HttpTransport, Transport};
