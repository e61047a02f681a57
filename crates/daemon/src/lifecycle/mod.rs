// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, recovery.

mod reconcile;
mod startup;
pub use reconcile::{reconcile_orphans, ReconcileSummary, INTERRUPTED_MESSAGE};
pub use startup::startup;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bt_core::SystemClock;
use bt_engine::{AllocatorError, Dispatcher};
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

use crate::config::{ConfigError, Settings};

/// Dispatcher with the production clock
pub type DaemonDispatcher = Dispatcher<SystemClock>;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/bt)
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to version file
    pub version_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Records of jobs not yet finished
    pub jobs_active_path: PathBuf,
    /// Records of finished jobs
    pub jobs_history_path: PathBuf,
    pub settings: Settings,
}

impl Config {
    /// Load configuration for the user-level daemon.
    ///
    /// Paths live under `~/.local/state/bt/` (or `$XDG_STATE_HOME/bt/`);
    /// settings come from `config.toml` in that directory plus environment.
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = crate::env::state_dir()?;
        let settings = Settings::load(&state_dir.join("config.toml"))?;
        Ok(Self::with_settings(state_dir, settings))
    }

    pub fn with_settings(state_dir: PathBuf, settings: Settings) -> Self {
        let jobs = state_dir.join("jobs");
        Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            version_path: state_dir.join("daemon.version"),
            log_path: state_dir.join("daemon.log"),
            jobs_active_path: jobs.join("active"),
            jobs_history_path: jobs.join("history"),
            state_dir,
            settings,
        }
    }
}

/// Daemon state during operation.
///
/// The listener is returned separately from startup to be spawned as a Listener task.
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub dispatcher: Arc<DaemonDispatcher>,
    /// When daemon started
    pub start_time: Instant,
}

/// Result of daemon startup - includes both the daemon state and the listener.
pub struct StartupResult {
    pub daemon: DaemonState,
    /// The Unix socket listener to spawn as a task
    pub listener: UnixListener,
    /// What orphan reconciliation found
    pub reconciled: ReconcileSummary,
}

impl DaemonState {
    /// Stop accepting jobs, cancel running ones, and wait for them to finish.
    ///
    /// Returns false if jobs were still running when the timeout elapsed.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.dispatcher.shutdown();
        let running = self.dispatcher.running_ids().len();
        if running > 0 {
            info!(running, "cancelling running jobs");
        }
        match tokio::time::timeout(timeout, self.dispatcher.wait_idle()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(
                    running = self.dispatcher.running_ids().len(),
                    "jobs still running after drain timeout"
                );
                false
            }
        }
    }

    /// Remove runtime files. The lock is released when `self` drops.
    pub fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        for path in [&self.config.socket_path, &self.config.lock_path, &self.config.version_path] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!(path = %path.display(), error = %e, "failed to remove runtime file");
                }
            }
        }

        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Job store error: {0}")]
    Store(#[from] bt_storage::StoreError),

    #[error("Workspace error: {0}")]
    Allocator(#[from] AllocatorError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
