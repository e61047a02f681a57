// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Protocol version (from Cargo.toml)
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolve state directory: BT_STATE_DIR > XDG_STATE_HOME/bt > ~/.local/state/bt
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Some(dir) = non_empty("BT_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("bt"));
    }
    let home = dirs::home_dir().ok_or(LifecycleError::NoStateDir)?;
    Ok(home.join(".local/state/bt"))
}

/// Default IPC timeout
pub fn ipc_timeout() -> Duration {
    millis("BT_IPC_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}

/// How long shutdown waits for cancelled jobs to wind down (`BT_DRAIN_TIMEOUT_MS`).
pub fn drain_timeout() -> Duration {
    millis("BT_DRAIN_TIMEOUT_MS").unwrap_or(Duration::from_secs(10))
}

/// Log filter directive: `BT_LOG`, then `RUST_LOG`.
pub fn log_filter() -> Option<String> {
    non_empty("BT_LOG").or_else(|| non_empty("RUST_LOG"))
}

pub fn workspace_root() -> Option<PathBuf> {
    non_empty("BT_WORKSPACE_ROOT").map(PathBuf::from)
}

pub fn assistant_command() -> Option<String> {
    non_empty("BT_ASSISTANT_COMMAND")
}

pub fn orphan_policy() -> Option<String> {
    non_empty("BT_ORPHAN_POLICY")
}

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|s| !s.is_empty())
}

fn millis(var: &str) -> Option<Duration> {
    std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
