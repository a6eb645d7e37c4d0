//! Command implementations for sakani.
//!
//! Every handler returns the text to print; `main` prints it.

mod completions;
mod config;
mod sync;

pub use completions::completions;
pub use config::config;
pub use sync::{clear, enqueue, list, replay, status, watch};

use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::args::OutputFormat;
use crate::config::{Config, Paths};
use crate::error::SakaniError;
use crate::features::sync::{
    channel, ActionQueue, ConnectivitySignal, ConsoleNotifier, Connectivity, HttpTransport,
    OfflineSync,
};
use crate::storage::Database;

/// Resolved paths, configuration and output format for one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    pub paths: Paths,
    pub config: Config,
    pub format: OutputFormat,
}

impl Context {
    /// Resolve the data root and load its configuration.
    ///
    /// An explicit `output` wins over `general.default_output`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be resolved or the config file is
    /// invalid.
    pub fn load(root: Option<PathBuf>, output: Option<OutputFormat>) -> Result<Self, SakaniError> {
        let paths = Paths::resolve(root)?;
        let config = Config::load(&paths)?;
        let format = output.unwrap_or(config.general.default_output);
        Ok(Self {
            paths,
            config,
            format,
        })
    }

    /// Open the on-disk queue and wire up delivery.
    ///
    /// The returned signal feeds the queue's view of connectivity; dropping it
    /// freezes connectivity at its last value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the backend
    /// configuration is invalid.
    pub fn open_sync(
        &self,
        initial: Connectivity,
    ) -> Result<(Arc<OfflineSync>, ConnectivitySignal), SakaniError> {
        self.paths.ensure_dirs()?;
        let store = Arc::new(Database::open_at(&self.paths.database)?);
        let queue = ActionQueue::load(store, self.config.sync.storage_key.as_str());
        let transport = Arc::new(HttpTransport::new(&self.config.backend)?);
        let (signal, watch) = channel(initial);

        let sync = OfflineSync::new(
            queue,
            transport,
            Arc::new(ConsoleNotifier),
            watch,
            &self.config.sync,
        );
        Ok((Arc::new(sync), signal))
    }
}
