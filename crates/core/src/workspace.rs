// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace key, record and exclusivity status.
//!
//! A workspace is the persistent working tree dedicated to one
//! (project, task-stream) pair. Its status is the single authority for
//! whether a job may touch the tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Composite identity of a workspace. Case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkspaceKey {
    pub project: String,
    pub task_stream: String,
}

impl WorkspaceKey {
    pub fn new(project: impl Into<String>, task_stream: impl Into<String>) -> Self {
        Self { project: project.into(), task_stream: task_stream.into() }
    }

    /// File stem for the persisted metadata record.
    ///
    /// Task-stream names never contain `@` or `+`, so `project@stream` with
    /// `/` mapped to `+` is unambiguous.
    pub fn file_stem(&self) -> String {
        format!("{}@{}", self.project, self.task_stream.replace('/', "+"))
    }
}

impl fmt::Display for WorkspaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.project, self.task_stream)
    }
}

/// Exclusivity status of a workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceStatus {
    /// No job holds the tree
    #[default]
    Available,
    /// A running job owns the tree
    Held,
}

crate::simple_display! {
    WorkspaceStatus {
        Available => "available",
        Held => "held",
    }
}

/// Persistent record of an isolated working tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub project: String,
    pub task_stream: String,
    /// Source repository the tree was created from
    pub source_path: PathBuf,
    /// Working-tree directory
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub use_count: u32,
    #[serde(default)]
    pub status: WorkspaceStatus,
}

impl Workspace {
    pub fn key(&self) -> WorkspaceKey {
        WorkspaceKey::new(self.project.clone(), self.task_stream.clone())
    }

    pub fn is_held(&self) -> bool {
        self.status == WorkspaceStatus::Held
    }
}

crate::builder! {
    pub struct WorkspaceBuilder => Workspace {
        into {
            project: String = "demo",
            task_stream: String = "feature/login",
            source_path: PathBuf = "/workspace/demo",
            path: PathBuf = "/workspace/.worktrees/demo/feature/login",
        }
        set {
            created_at: DateTime<Utc> = DateTime::<Utc>::default(),
            last_used_at: DateTime<Utc> = DateTime::<Utc>::default(),
            use_count: u32 = 1,
            status: WorkspaceStatus = WorkspaceStatus::Available,
        }
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
