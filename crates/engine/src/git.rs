// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git plumbing for worktree-backed workspaces and project discovery.

use crate::subprocess::{run_with_timeout, GIT_QUERY_TIMEOUT};
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

fn git(repo: &Path) -> Command {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(repo).env_remove("GIT_DIR").env_remove("GIT_WORK_TREE");
    cmd
}

/// Whether `refs/heads/<branch>` exists in `repo`.
pub async fn branch_exists(repo: &Path, branch: &str, timeout: Duration) -> Result<bool, String> {
    let mut cmd = git(repo);
    cmd.args(["rev-parse", "--verify", "--quiet", &format!("refs/heads/{branch}")]);
    let output = run_with_timeout(cmd, timeout, "git rev-parse").await?;

    match output.status.code() {
        Some(0) => Ok(true),
        Some(1) => Ok(false),
        _ => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(format!("git rev-parse failed: {}", stderr.trim()))
        }
    }
}

/// Add a worktree at `path` checked out to `branch`.
///
/// With `create_branch`, the branch is created from the repository's
/// current HEAD; otherwise it must already exist. Parent directories of
/// `path` are created first.
pub async fn add_worktree(
    repo: &Path,
    path: &Path,
    branch: &str,
    create_branch: bool,
    timeout: Duration,
) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("failed to create workspace parent dir: {}", e))?;
    }

    let mut cmd = git(repo);
    cmd.args(["worktree", "add"]);
    if create_branch {
        cmd.arg("-b").arg(branch).arg(path);
    } else {
        cmd.arg(path).arg(branch);
    }
    let output = run_with_timeout(cmd, timeout, "git worktree add").await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("git worktree add failed: {}", stderr.trim()));
    }
    Ok(())
}

/// Unregister and delete the worktree at `path`.
///
/// Best-effort: a failing `git worktree remove` is logged, and whatever is
/// left of the directory is deleted afterwards.
pub async fn remove_worktree(repo: &Path, path: &Path, timeout: Duration) -> std::io::Result<()> {
    let mut cmd = git(repo);
    cmd.args(["worktree", "remove", "--force"]).arg(path);
    match run_with_timeout(cmd, timeout, "git worktree remove").await {
        Ok(output) if output.status.success() => {}
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(path = %path.display(), stderr = %stderr.trim(), "git worktree remove failed");
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "git worktree remove failed");
        }
    }

    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        tokio::fs::remove_dir_all(path).await?;
    }
    Ok(())
}

/// Checked-out branch name, or `None` if git cannot say.
pub async fn current_branch(repo: &Path) -> Option<String> {
    let mut cmd = git(repo);
    cmd.args(["rev-parse", "--abbrev-ref", "HEAD"]);
    query(cmd, "git rev-parse").await
}

/// URL of `remote`, or `None` if it is not configured.
pub async fn remote_url(repo: &Path, remote: &str) -> Option<String> {
    let mut cmd = git(repo);
    cmd.args(["remote", "get-url", remote]);
    query(cmd, "git remote get-url").await
}

async fn query(cmd: Command, description: &str) -> Option<String> {
    let output = run_with_timeout(cmd, GIT_QUERY_TIMEOUT, description).await.ok()?;
    if !output.status.success() {
        return None;
    }
    let out = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!out.is_empty()).then_some(out)
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
