//! Background Poller
//!
//! Runs the registry's change scan on a fixed interval from a dedicated thread and
//! forwards each batch of changes over a channel. This is the single logical poller a
//! shared registry expects; checkout traffic runs on other threads.

use crate::error::RegistryError;
use crate::fingerprint::Hashable;
use crate::registry::{Change, Registry};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Poller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Delay between scans in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Name given to the polling thread
    #[serde(default = "default_thread_name")]
    pub thread_name: String,

    /// Only send batches that contain at least one change
    #[serde(default = "default_true")]
    pub skip_empty: bool,
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_thread_name() -> String {
    "change-registry-poller".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            thread_name: default_thread_name(),
            skip_empty: default_true(),
        }
    }
}

impl PollerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.interval_ms == 0 {
            return Err("interval_ms must be greater than zero".to_string());
        }
        if self.thread_name.trim().is_empty() {
            return Err("thread_name cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Spawns the polling thread.
pub struct Poller;

impl Poller {
    /// Start polling `registry`, sending change batches to `sink`
    ///
    /// The thread exits when the returned handle is stopped or dropped, or when the
    /// receiving end of `sink` hangs up.
    pub fn spawn<T>(
        registry: Arc<Registry<T>>,
        config: PollerConfig,
        sink: mpsc::Sender<Vec<Change<T>>>,
    ) -> Result<PollerHandle, RegistryError>
    where
        T: Hashable + ?Sized + 'static,
    {
        config.validate().map_err(RegistryError::Config)?;

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let running = Arc::new(RwLock::new(true));
        let thread_running = Arc::clone(&running);
        let interval = config.interval();
        let skip_empty = config.skip_empty;

        info!(
            thread = %config.thread_name,
            interval_ms = config.interval_ms,
            entries = registry.len(),
            "Starting poller"
        );

        let join = std::thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(mpsc::RecvTimeoutError::Timeout) => {}
                        // Explicit stop, or the handle was dropped.
                        Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    }

                    let changes = registry.scan_changed_names();
                    if changes.is_empty() && skip_empty {
                        continue;
                    }
                    debug!(changed = changes.len(), "Poller sending batch");
                    if sink.send(changes).is_err() {
                        warn!("Change receiver dropped; stopping poller");
                        break;
                    }
                }
                *thread_running.write() = false;
                info!("Poller stopped");
            })?;

        Ok(PollerHandle {
            stop_tx: Some(stop_tx),
            join: Some(join),
            running,
        })
    }
}

/// Owner of a running poller thread
pub struct PollerHandle {
    stop_tx: Option<mpsc::Sender<()>>,
    join: Option<JoinHandle<()>>,
    running: Arc<RwLock<bool>>,
}

impl PollerHandle {
    pub fn is_running(&self) -> bool {
        *self.running.read()
    }

    /// Signal the thread and wait for it to finish its current scan
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            // The thread may already have exited on its own.
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                warn!("Poller thread panicked");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
