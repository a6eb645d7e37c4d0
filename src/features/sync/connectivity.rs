//! Connectivity state.
//!
//! The current state travels over a `tokio::sync::watch` channel: whoever
//! knows about the network holds the [`ConnectivitySignal`], the queue and
//! the sync service hold [`ConnectivityWatch`] clones. The
//! [`ConnectivityMonitor`] turns successive observations into transitions,
//! and [`ConnectivityProbe`] is the signal source the CLI uses.

use std::time::Duration;

use reqwest::Url;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::transport::parse_base_url;
use crate::config::BackendConfig;
use crate::error::SakaniError;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Whether the backend is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Online,
    Offline,
}

impl Connectivity {
    #[must_use]
    pub const fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

impl std::fmt::Display for Connectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Online => "online",
            Self::Offline => "offline",
        })
    }
}

/// A change between the two connectivity states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CameOnline,
    WentOffline,
}

/// Two-state machine fed with connectivity observations.
#[derive(Debug, Clone, Copy)]
pub struct ConnectivityMonitor {
    state: Connectivity,
}

impl ConnectivityMonitor {
    #[must_use]
    pub const fn new(initial: Connectivity) -> Self {
        Self { state: initial }
    }

    #[must_use]
    pub const fn state(&self) -> Connectivity {
        self.state
    }

    /// Record an observation. Returns the transition, if the state changed.
    pub fn observe(&mut self, next: Connectivity) -> Option<Transition> {
        let transition = match (self.state, next) {
            (Connectivity::Offline, Connectivity::Online) => Some(Transition::CameOnline),
            (Connectivity::Online, Connectivity::Offline) => Some(Transition::WentOffline),
            _ => None,
        };
        self.state = next;
        transition
    }
}

/// Create a connectivity channel starting at `initial`.
#[must_use]
pub fn channel(initial: Connectivity) -> (ConnectivitySignal, ConnectivityWatch) {
    let (tx, rx) = watch::channel(initial);
    (ConnectivitySignal { tx }, ConnectivityWatch { rx })
}

/// Publishing side of the connectivity channel.
#[derive(Debug)]
pub struct ConnectivitySignal {
    tx: watch::Sender<Connectivity>,
}

impl ConnectivitySignal {
    /// Publish the current state. Watchers only wake if it changed.
    pub fn set(&self, state: Connectivity) {
        self.tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }

    /// Another watcher on this channel.
    #[must_use]
    pub fn subscribe(&self) -> ConnectivityWatch {
        ConnectivityWatch {
            rx: self.tx.subscribe(),
        }
    }
}

/// Receiving side of the connectivity channel.
#[derive(Debug, Clone)]
pub struct ConnectivityWatch {
    rx: watch::Receiver<Connectivity>,
}

impl ConnectivityWatch {
    /// The latest published state.
    #[must_use]
    pub fn current(&self) -> Connectivity {
        *self.rx.borrow()
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.current().is_online()
    }

    /// Wait for the next published change and return it.
    ///
    /// Returns `None` once the signal has been dropped.
    pub async fn changed(&mut self) -> Option<Connectivity> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

/// Health check against the backend.
///
/// Any HTTP response means the backend is reachable; only a failure to get
/// a response counts as offline.
#[derive(Debug, Clone)]
pub struct ConnectivityProbe {
    client: reqwest::Client,
    url: Url,
}

impl ConnectivityProbe {
    /// Build a probe for `base_url + health_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, SakaniError> {
        let base = parse_base_url(&config.base_url)?;
        let url = base.join(&config.health_path).map_err(|e| {
            SakaniError::Config(format!("Invalid health_path {}: {e}", config.health_path))
        })?;
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .map_err(|e| SakaniError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, url })
    }

    /// Probe once.
    pub async fn check(&self) -> Connectivity {
        match self.client.get(self.url.clone()).send().await {
            Ok(response) => {
                debug!(url = %self.url, status = response.status().as_u16(), "probe reached backend");
                Connectivity::Online
            },
            Err(e) => {
                debug!(url = %self.url, error = %e, "probe failed");
                Connectivity::Offline
            },
        }
    }

    /// Probe every `interval`, publishing each result to `signal`.
    ///
    /// The task runs until aborted.
    pub fn spawn(self, signal: ConnectivitySignal, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                signal.set(self.check().await);
                tokio::time::sleep(interval).await;
            }
        })
    }
}
