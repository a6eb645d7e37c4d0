//! Background sync service.
//!
//! Drives [`OfflineSync`] from connectivity changes and a periodic timer:
//! coming online notifies and replays, going offline notifies, and while
//! online a replay runs every `replay_interval`. The service is spawned
//! explicitly and stopped with [`SyncService::shutdown`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::connectivity::{ConnectivityMonitor, ConnectivityWatch, Transition};
use super::notify::Notification;
use super::offline::OfflineSync;

/// Handle to the running sync loop.
pub struct SyncService {
    handle: JoinHandle<()>,
    shutdown: oneshot::Sender<()>,
}

impl SyncService {
    /// Start the loop. The initial connectivity state is read from `sync`
    /// at the time of the call. `replay_interval` must be non-zero;
    /// `Config::validate` guarantees that for configured values.
    #[must_use]
    pub fn spawn(sync: Arc<OfflineSync>, replay_interval: Duration) -> Self {
        let connectivity = sync.connectivity().clone();
        let monitor = ConnectivityMonitor::new(connectivity.current());
        let (shutdown, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run(
            sync,
            connectivity,
            monitor,
            replay_interval,
            shutdown_rx,
        ));
        Self { handle, shutdown }
    }

    /// Stop the loop and wait for it to exit.
    ///
    /// An in-flight replay pass finishes first.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.handle.await {
            warn!(error = %e, "sync service task ended abnormally");
        }
    }
}

async fn run(
    sync: Arc<OfflineSync>,
    mut connectivity: ConnectivityWatch,
    mut monitor: ConnectivityMonitor,
    replay_interval: Duration,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = interval_at(Instant::now() + replay_interval, replay_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        state = %monitor.state(),
        interval_secs = replay_interval.as_secs(),
        "sync service started"
    );

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            next = connectivity.changed() => {
                let Some(next) = next else {
                    debug!("connectivity signal dropped");
                    break;
                };
                match monitor.observe(next) {
                    Some(Transition::CameOnline) => {
                        info!("connectivity restored");
                        sync.notify(Notification::Online);
                        sync.replay_all().await;
                    },
                    Some(Transition::WentOffline) => {
                        info!("connectivity lost");
                        sync.notify(Notification::Offline);
                    },
                    None => {},
                }
            },
            _ = ticker.tick() => {
                if monitor.state().is_online() {
                    let outcome = sync.replay_all().await;
                    debug!(?outcome, "periodic replay");
                }
            },
        }
    }

    info!("sync service stopped");
}
