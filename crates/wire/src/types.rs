// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Data transfer objects shared by daemon responses and CLI rendering.

use std::path::PathBuf;

use bt_core::{Job, JobStatus, Workspace, WorkspaceStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Job listing row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobSummary {
    pub id: String,
    pub project: String,
    pub task_stream: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.to_string(),
            project: job.project.clone(),
            task_stream: job.task_stream.clone(),
            status: job.status,
            created_at: job.created_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
        }
    }
}

/// Full job record as shown by `bt job show`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobDetail {
    pub id: String,
    pub project: String,
    pub project_path: PathBuf,
    pub task_stream: String,
    pub description: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub logs: Vec<String>,
    /// Whether the record came from the history store
    #[serde(default)]
    pub archived: bool,
}

impl JobDetail {
    pub fn from_job(job: &Job, archived: bool) -> Self {
        Self {
            id: job.id.to_string(),
            project: job.project.clone(),
            project_path: job.project_path.clone(),
            task_stream: job.task_stream.clone(),
            description: job.description.clone(),
            status: job.status,
            created_at: job.created_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
            workspace_path: job.workspace_path.clone(),
            result: job.result.clone(),
            error: job.error.clone(),
            logs: job.logs.clone(),
            archived,
        }
    }
}

/// Workspace listing row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkspaceEntry {
    pub project: String,
    pub task_stream: String,
    pub path: PathBuf,
    pub status: WorkspaceStatus,
    pub use_count: u32,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

impl From<&Workspace> for WorkspaceEntry {
    fn from(ws: &Workspace) -> Self {
        Self {
            project: ws.project.clone(),
            task_stream: ws.task_stream.clone(),
            path: ws.path.clone(),
            status: ws.status,
            use_count: ws.use_count,
            created_at: ws.created_at,
            last_used_at: ws.last_used_at,
        }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
