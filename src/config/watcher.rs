//! Configuration file watcher for hot reload.
//!
//! Each accepted change yields a fully validated `DispatcherConfig`; the
//! receiver rebuilds a fresh route table from it and swaps it in. The table
//! in use is never mutated.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::DispatcherConfig;

/// Watches one configuration file and publishes reloaded configs.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<DispatcherConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of the update channel.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<DispatcherConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. Dropping the returned handle stops the watch.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;
        let reload_path = path.clone();

        let handler = move |res: notify::Result<Event>| match res {
            Ok(event) if is_reload_trigger(&event.kind) => match load_config(&reload_path) {
                Ok(config) => {
                    tracing::info!(
                        path = ?reload_path,
                        routes = config.routes.len(),
                        "Configuration change accepted"
                    );
                    let _ = update_tx.send(config);
                }
                Err(e) => {
                    tracing::error!(
                        path = ?reload_path,
                        error = %e,
                        "Rejected configuration change, keeping current routes"
                    );
                }
            },
            Ok(_) => {}
            Err(e) => tracing::error!(error = ?e, "Configuration watch error"),
        };

        let mut watcher =
            RecommendedWatcher::new(handler, Config::default().with_poll_interval(Duration::from_secs(2)))?;
        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Configuration watcher started");
        Ok(watcher)
    }
}

fn is_reload_trigger(kind: &EventKind) -> bool {
    kind.is_modify() || kind.is_create()
}
