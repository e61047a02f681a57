// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bt daemon` - Daemon management commands

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::client::{ClientError, DaemonClient};
use crate::color;
use crate::output::{format_or_json, OutputFormat};

/// How long `start` waits for the daemon to report READY
const START_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon in the background
    Start,
    /// Stop the daemon, letting running jobs drain
    Stop,
    /// Check daemon status
    Status,
}

pub async fn handle(command: DaemonCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match command {
        DaemonCommand::Start => start(client).await,
        DaemonCommand::Stop => stop(client).await,
        DaemonCommand::Status => status(client, format).await,
    }
}

async fn start(client: &DaemonClient) -> Result<()> {
    if let Ok(version) = client.hello().await {
        println!("Daemon already running (btd {})", version);
        return Ok(());
    }

    let btd = find_btd_binary()?;
    let mut child = Command::new(&btd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .process_group(0)
        .spawn()
        .map_err(|e| anyhow!("failed to spawn {}: {}", btd.display(), e))?;

    let stdout = child.stdout.take().ok_or_else(|| anyhow!("daemon stdout unavailable"))?;
    let mut lines = BufReader::new(stdout).lines();
    let ready = tokio::time::timeout(START_TIMEOUT, async {
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim() == "READY" {
                return true;
            }
        }
        false
    })
    .await
    .unwrap_or(false);

    if !ready {
        return Err(anyhow!("daemon did not start; see daemon.log in the state directory"));
    }
    println!("Daemon started");
    Ok(())
}

async fn stop(client: &DaemonClient) -> Result<()> {
    match client.shutdown().await {
        Ok(()) => {}
        Err(ClientError::DaemonNotRunning(_)) => {
            println!("Daemon not running");
            return Ok(());
        }
        Err(e) => return Err(anyhow!("Failed to stop daemon: {}", e)),
    }

    // The daemon removes its socket once running jobs have drained
    let deadline = tokio::time::Instant::now() + bt_daemon::env::drain_timeout() + START_TIMEOUT;
    while client.socket_path().exists() {
        if tokio::time::Instant::now() >= deadline {
            return Err(anyhow!("daemon did not exit in time"));
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    println!("Daemon stopped");
    Ok(())
}

async fn status(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let status = match client.status().await {
        Ok(status) => status,
        Err(ClientError::DaemonNotRunning(_)) => {
            let obj = serde_json::json!({ "status": "not_running" });
            return format_or_json(format, &obj, || println!("Daemon not running"));
        }
        Err(e) => return Err(e.into()),
    };
    let worker = client.worker_status().await?;

    let obj = serde_json::json!({
        "status": "running",
        "version": status.version,
        "uptime_secs": status.uptime_secs,
        "uptime": format_uptime(status.uptime_secs),
        "jobs_active": status.jobs_active,
        "workspaces_held": status.workspaces_held,
        "projects": worker.projects.len(),
        "running_jobs": worker.running_jobs,
    });
    format_or_json(format, &obj, || {
        println!("{} running", color::header("Status:"));
        println!("{} {}", color::context("Version:"), status.version);
        println!("{} {}", color::context("Uptime:"), format_uptime(status.uptime_secs));
        println!("{} {} active", color::context("Jobs:"), status.jobs_active);
        println!("{} {} held", color::context("Workspaces:"), status.workspaces_held);
        println!("{} {}", color::context("Projects:"), worker.projects.len());
        for job in &worker.running_jobs {
            println!(
                "  {} {}/{} {}",
                color::muted(&job.id),
                job.project,
                job.task_stream,
                color::job_status(job.status)
            );
        }
    })
}

pub(crate) fn format_uptime(secs: u64) -> String {
    bt_core::format_elapsed(chrono::Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)))
}

/// `btd` next to the running `bt`, falling back to `$PATH`.
fn find_btd_binary() -> Result<PathBuf> {
    if let Some(dir) = std::env::current_exe().ok().and_then(|exe| exe.parent().map(PathBuf::from)) {
        let sibling = dir.join("btd");
        if sibling.exists() {
            return Ok(sibling);
        }
    }
    Ok(PathBuf::from("btd"))
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
