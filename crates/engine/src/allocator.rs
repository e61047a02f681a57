// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace allocator.
//!
//! Maps `(project, task_stream)` to a persistent git worktree and enforces
//! that at most one job holds each worktree. Every operation runs under one
//! allocator-wide lock, held across the git calls it makes, so the
//! in-memory map, the metadata files and the trees on disk move together.

use crate::git;
use bt_core::{validate_task_stream, Clock, NameError, Workspace, WorkspaceKey, WorkspaceStatus};
use bt_storage::{DocumentStore, StoreError};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors from workspace allocation.
#[derive(Debug, Error)]
pub enum AllocatorError {
    #[error(transparent)]
    InvalidKey(#[from] NameError),
    #[error("task stream '{}' of project '{}' is already in use", .0.task_stream, .0.project)]
    Conflict(WorkspaceKey),
    #[error("workspace {0} is held by a running job")]
    InUse(WorkspaceKey),
    #[error("workspace path {} is outside the worktree root", .0.display())]
    OutsideRoot(PathBuf),
    #[error("{0}")]
    Git(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Where worktrees and their metadata live.
#[derive(Debug, Clone)]
pub struct AllocatorConfig {
    /// Worktrees are created at `<worktree_root>/<project>/<task_stream>`
    pub worktree_root: PathBuf,
    pub metadata_dir: PathBuf,
    pub git_timeout: Duration,
}

impl AllocatorConfig {
    /// Standard layout under a workspace root.
    pub fn under(workspace_root: &Path) -> Self {
        let worktree_root = workspace_root.join(".worktrees");
        Self {
            metadata_dir: worktree_root.join(".metadata"),
            worktree_root,
            git_timeout: crate::subprocess::GIT_TIMEOUT,
        }
    }
}

pub struct WorkspaceAllocator<C: Clock> {
    config: AllocatorConfig,
    store: DocumentStore,
    clock: C,
    workspaces: Mutex<HashMap<WorkspaceKey, Workspace>>,
}

impl<C: Clock> WorkspaceAllocator<C> {
    /// Open the metadata store and load every readable record.
    pub fn load(config: AllocatorConfig, clock: C) -> Result<Self, AllocatorError> {
        let store = DocumentStore::open(&config.metadata_dir)?;
        let records: Vec<Workspace> = store.load_all()?;

        let mut workspaces = HashMap::new();
        for ws in records {
            workspaces.insert(ws.key(), ws);
        }
        tracing::info!(count = workspaces.len(), dir = %config.metadata_dir.display(), "loaded workspaces");

        Ok(Self { config, store, clock, workspaces: Mutex::new(workspaces) })
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Worktree path for a key.
    pub fn path_for(&self, project: &str, task_stream: &str) -> PathBuf {
        self.config.worktree_root.join(project).join(task_stream)
    }

    /// `path_for`, refusing anything that would not land strictly below
    /// `<worktree_root>/<project>`.
    fn contained_path(&self, project: &str, task_stream: &str) -> Result<PathBuf, AllocatorError> {
        let path = self.path_for(project, task_stream);
        let relative = Path::new(project).join(task_stream);
        let normal = relative.components().all(|c| matches!(c, Component::Normal(_)));
        if !normal || relative.components().count() < 2 || !self.is_contained(project, &path) {
            return Err(AllocatorError::OutsideRoot(path));
        }
        Ok(path)
    }

    fn is_contained(&self, project: &str, path: &Path) -> bool {
        let base = self.config.worktree_root.join(project);
        path != base && path.starts_with(&base)
    }

    /// Acquire the workspace for `(project, task_stream)` and mark it held.
    ///
    /// Creates the worktree on first use (adopting an existing directory at
    /// the target path as-is), otherwise reuses the recorded one. Fails with
    /// `Conflict` if another job holds it; nothing is touched in that case.
    pub async fn acquire(
        &self,
        project: &str,
        source_path: &Path,
        task_stream: &str,
    ) -> Result<Workspace, AllocatorError> {
        validate_task_stream(task_stream)?;
        let key = WorkspaceKey::new(project, task_stream);

        let mut workspaces = self.workspaces.lock().await;
        let now = self.clock.now();

        if let Some(ws) = workspaces.get_mut(&key) {
            if ws.is_held() {
                return Err(AllocatorError::Conflict(key));
            }
            ws.status = WorkspaceStatus::Held;
            ws.last_used_at = now;
            ws.use_count += 1;
            tracing::info!(%key, use_count = ws.use_count, "reusing workspace");
            self.persist(ws);
            return Ok(ws.clone());
        }

        let path = self.contained_path(project, task_stream)?;
        if tokio::fs::try_exists(&path).await? {
            tracing::info!(%key, path = %path.display(), "adopting existing workspace directory");
        } else {
            let exists = git::branch_exists(source_path, task_stream, self.config.git_timeout)
                .await
                .map_err(AllocatorError::Git)?;
            git::add_worktree(source_path, &path, task_stream, !exists, self.config.git_timeout)
                .await
                .map_err(AllocatorError::Git)?;
            tracing::info!(
                %key,
                path = %path.display(),
                new_branch = !exists,
                "created worktree"
            );
        }

        let ws = Workspace {
            project: project.to_string(),
            task_stream: task_stream.to_string(),
            source_path: source_path.to_path_buf(),
            path,
            created_at: now,
            last_used_at: now,
            use_count: 1,
            status: WorkspaceStatus::Held,
        };
        self.persist(&ws);
        workspaces.insert(key, ws.clone());
        Ok(ws)
    }

    /// Set the status of a recorded workspace. Unknown keys are ignored.
    pub async fn release(&self, project: &str, task_stream: &str, status: WorkspaceStatus) {
        let key = WorkspaceKey::new(project, task_stream);
        let mut workspaces = self.workspaces.lock().await;
        let Some(ws) = workspaces.get_mut(&key) else {
            tracing::debug!(%key, "release of unknown workspace ignored");
            return;
        };
        if ws.status == status {
            return;
        }
        ws.status = status;
        tracing::info!(%key, %status, "workspace status changed");
        self.persist(ws);
    }

    /// Delete a workspace's tree and record. Returns whether a record existed.
    pub async fn remove(&self, project: &str, task_stream: &str) -> Result<bool, AllocatorError> {
        let key = WorkspaceKey::new(project, task_stream);
        let mut workspaces = self.workspaces.lock().await;
        let Some(ws) = workspaces.get(&key) else {
            tracing::warn!(%key, "workspace not found");
            return Ok(false);
        };
        if ws.is_held() {
            return Err(AllocatorError::InUse(key));
        }
        if !self.is_contained(&ws.project, &ws.path) {
            return Err(AllocatorError::OutsideRoot(ws.path.clone()));
        }

        git::remove_worktree(&ws.source_path, &ws.path, self.config.git_timeout).await?;
        workspaces.remove(&key);
        if let Err(e) = self.store.delete(&key.file_stem()) {
            tracing::error!(%key, error = %e, "failed to delete workspace metadata");
        }
        tracing::info!(%key, "removed workspace");
        Ok(true)
    }

    /// Snapshot of all workspaces, optionally for one project, sorted by key.
    pub async fn list_all(&self, project: Option<&str>) -> Vec<Workspace> {
        let workspaces = self.workspaces.lock().await;
        let mut list: Vec<_> = workspaces
            .values()
            .filter(|ws| project.is_none_or(|p| ws.project == p))
            .cloned()
            .collect();
        list.sort_by(|a, b| (&a.project, &a.task_stream).cmp(&(&b.project, &b.task_stream)));
        list
    }

    pub async fn get(&self, project: &str, task_stream: &str) -> Option<Workspace> {
        let workspaces = self.workspaces.lock().await;
        workspaces.get(&WorkspaceKey::new(project, task_stream)).cloned()
    }

    fn persist(&self, ws: &Workspace) {
        if let Err(e) = self.store.write(&ws.key().file_stem(), ws) {
            tracing::error!(key = %ws.key(), error = %e, "failed to persist workspace metadata");
        }
    }
}

#[cfg(test)]
#[path = "allocator_tests.rs"]
mod tests;
