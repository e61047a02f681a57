// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project discovery under the workspace root.

use crate::git;
use bt_core::Project;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Git repositories directly under a workspace root.
///
/// Hidden directories (including `.worktrees`) are skipped.
#[derive(Debug, Clone)]
pub struct ProjectCatalog {
    root: PathBuf,
}

impl ProjectCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All projects, sorted by name.
    pub async fn list(&self) -> Vec<Project> {
        let mut read_dir = match tokio::fs::read_dir(&self.root).await {
            Ok(rd) => rd,
            Err(e) => {
                tracing::warn!(path = %self.root.display(), error = %e, "workspace root unreadable");
                return Vec::new();
            }
        };

        let mut projects = Vec::new();
        while let Ok(Some(entry)) = read_dir.next_entry().await {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            if !path.is_dir() || !path.join(".git").exists() {
                continue;
            }
            projects.push(describe(name, path).await);
        }

        projects.sort_by(|a, b| a.name.cmp(&b.name));
        projects
    }

    /// Look up one project by directory name.
    pub async fn find(&self, name: &str) -> Option<Project> {
        if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
            return None;
        }
        let path = self.root.join(name);
        if !path.is_dir() || !path.join(".git").exists() {
            return None;
        }
        Some(describe(name.to_string(), path).await)
    }
}

async fn describe(name: String, path: PathBuf) -> Project {
    let last_modified = tokio::fs::metadata(&path)
        .await
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from);
    Project {
        branch: git::current_branch(&path).await,
        remote: git::remote_url(&path, "origin").await,
        last_modified,
        name,
        path,
    }
}

#[cfg(test)]
#[path = "projects_tests.rs"]
mod tests;
