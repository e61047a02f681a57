// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded subprocess execution.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Default timeout for git plumbing (worktree add/remove, ref checks).
pub const GIT_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for read-only git queries used for project discovery.
pub const GIT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Run `cmd` to completion, capturing output, giving up after `timeout`.
///
/// The child is killed if the timeout elapses. `description` names the
/// command in error messages.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    cmd.kill_on_drop(true).stdin(std::process::Stdio::null());
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(format!("{} failed to start: {}", description, e)),
        Err(_) => Err(format!("{} timed out after {:?}", description, timeout)),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
