// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and initialization logic.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use bt_core::SystemClock;
use bt_engine::{
    strategy_for_host, AllocatorConfig, Dispatcher, JobRegistry, Orchestrator, ProjectCatalog,
    WorkspaceAllocator,
};
use fs2::FileExt;
use tokio::net::UnixListener;
use tracing::info;

use super::{reconcile_orphans, Config, DaemonState, LifecycleError, StartupResult};
use crate::env::PROTOCOL_VERSION;

/// Start the daemon
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // Don't clean up if we failed to acquire the lock:
            // those files belong to the already-running daemon.
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    // 1. Create state directory (needed for socket, lock, etc.)
    std::fs::create_dir_all(&config.state_dir)?;

    // 2. Acquire lock file FIRST - prevents races.
    // Open without truncating so a running daemon's PID survives a failed attempt.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    std::fs::write(&config.version_path, PROTOCOL_VERSION)?;

    // 3. Load persisted jobs and workspaces
    let settings = &config.settings;
    let registry = Arc::new(JobRegistry::load(
        &config.jobs_active_path,
        &config.jobs_history_path,
        SystemClock,
    )?);
    let allocator_config = AllocatorConfig {
        git_timeout: settings.git_timeout(),
        ..AllocatorConfig::under(&settings.workspace_root)
    };
    let allocator = Arc::new(WorkspaceAllocator::load(allocator_config, SystemClock)?);

    info!(
        jobs_active = registry.list_active().len(),
        workspaces = allocator.list_all(None).await.len(),
        workspace_root = %settings.workspace_root.display(),
        "recovered state"
    );

    // 4. Resolve leftovers from the previous run before accepting work
    let reconciled =
        reconcile_orphans(&registry, &allocator, settings.orphan_policy, &SystemClock).await;

    // 5. Wire the engine
    let strategy = strategy_for_host(&settings.assistant_command);
    let orchestrator =
        Arc::new(Orchestrator::new(registry, allocator, strategy, SystemClock));
    let catalog = ProjectCatalog::new(settings.workspace_root.clone());
    let dispatcher = Arc::new(Dispatcher::new(orchestrator, catalog));

    // 6. Remove stale socket and bind (LAST - only after all validation passes)
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!(
        socket = %config.socket_path.display(),
        assistant = %settings.assistant_command,
        "Daemon started"
    );

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            dispatcher,
            start_time: Instant::now(),
        },
        listener,
        reconciled,
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    for path in [&config.socket_path, &config.version_path, &config.lock_path] {
        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
