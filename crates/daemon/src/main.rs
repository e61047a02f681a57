// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! btd: the bt worker daemon.

use std::process::ExitCode;
use std::sync::Arc;

use bt_daemon::lifecycle::{self, Config, LifecycleError, StartupResult};
use bt_daemon::listener::{ListenCtx, Listener};
use bt_daemon::{env, logging};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("btd: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), LifecycleError> {
    let config = Config::load()?;
    std::fs::create_dir_all(&config.state_dir)?;
    let _log_guard = logging::init(&config.log_path)?;

    let StartupResult { mut daemon, listener, reconciled } =
        match lifecycle::startup(&config).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "startup failed");
                return Err(e);
            }
        };

    if !reconciled.is_empty() {
        info!(
            jobs = reconciled.jobs.len(),
            workspaces = reconciled.workspaces.len(),
            resolved = reconciled.resolved,
            policy = %config.settings.orphan_policy,
            "reconciled leftovers from previous run"
        );
    }

    let shutdown = Arc::new(Notify::new());
    let ctx = Arc::new(ListenCtx {
        dispatcher: Arc::clone(&daemon.dispatcher),
        history_limit: config.settings.history_limit,
        start_time: daemon.start_time,
        shutdown: Arc::clone(&shutdown),
    });
    let listener_task = tokio::spawn(Listener::new(listener, ctx).run());

    // Signals the spawning CLI that the socket is accepting connections
    println!("READY");

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = shutdown.notified() => info!("shutdown requested"),
        _ = tokio::signal::ctrl_c() => info!("interrupt received"),
        _ = sigterm.recv() => info!("terminate signal received"),
    }

    listener_task.abort();
    if !daemon.drain(env::drain_timeout()).await {
        warn!("exiting with jobs still running");
    }
    daemon.shutdown()
}
