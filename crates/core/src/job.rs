// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier and state machine.

use crate::id::JobId;
use crate::time_fmt::format_log_stamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;


/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created, not yet running
    Pending,
    /// External assistant process is running
    Running,
    /// Paused on a question for the submitter
    WaitingForUserInput,
    /// Finished with a zero exit status
    Completed,
    /// Setup failure, nonzero exit, or cancellation
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Running => "running",
        WaitingForUserInput => "waiting",
        Completed => "completed",
        Failed => "failed",
    }
}

/// One request to perform a described task against a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub project: String,
    pub project_path: PathBuf,
    /// Task-stream (branch) the job runs on
    pub task_stream: String,
    pub description: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_path: Option<PathBuf>,
}

impl Job {
    /// Create a pending job with a fresh identity.
    pub fn new(
        project: impl Into<String>,
        project_path: impl Into<PathBuf>,
        task_stream: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: JobId::new(),
            project: project.into(),
            project_path: project_path.into(),
            task_stream: task_stream.into(),
            description: description.into(),
            status: JobStatus::Pending,
            created_at,
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
            logs: Vec::new(),
            workspace_path: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply a status transition.
    ///
    /// `started_at` is stamped on the first entry into `Running`. Terminal
    /// transitions stamp `completed_at` and record `result`/`error`; a job that
    /// is already terminal is left untouched and `false` is returned.
    pub fn transition(
        &mut self,
        status: JobStatus,
        result: Option<String>,
        error: Option<String>,
        at: DateTime<Utc>,
    ) -> bool {
        if self.is_terminal() {
            return false;
        }

        self.status = status;
        if status == JobStatus::Running && self.started_at.is_none() {
            self.started_at = Some(at);
        }
        if status.is_terminal() {
            self.completed_at = Some(at);
            self.result = result;
            self.error = error;
        }
        true
    }

    /// Append a `[YYYY-MM-DD HH:MM:SS] message` line to the job log.
    pub fn push_log(&mut self, message: &str, at: DateTime<Utc>) {
        self.logs.push(format!("[{}] {}", format_log_stamp(at), message));
    }

    /// Wall-clock run time, if the job has started.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        let started = self.started_at?;
        Some(self.completed_at.unwrap_or(now) - started)
    }
}

crate::builder! {
    pub struct JobBuilder => Job {
        into {
            project: String = "demo",
            project_path: PathBuf = "/workspace/demo",
            task_stream: String = "feature/login",
            description: String = "add logging",
        }
        set {
            id: JobId = JobId::new(),
            status: JobStatus = JobStatus::Pending,
            created_at: DateTime<Utc> = DateTime::<Utc>::default(),
            logs: Vec<String> = Vec::new(),
        }
        option {
            started_at: DateTime<Utc> = None,
            completed_at: DateTime<Utc> = None,
            result: String = None,
            error: String = None,
            workspace_path: PathBuf = None,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
