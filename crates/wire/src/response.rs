// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use bt_core::Project;
use serde::{Deserialize, Serialize};

use super::{JobDetail, JobSummary, WorkspaceEntry};

/// Response from daemon to CLI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success
    Ok,

    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// Daemon is shutting down
    ShuttingDown,

    /// Job accepted; the run continues in the background
    JobSubmitted { job: JobSummary },

    /// Cancellation was signalled to a running job
    JobCancelling { id: String },

    /// List of jobs
    Jobs { jobs: Vec<JobSummary> },

    /// Single job details
    Job { job: Option<Box<JobDetail>> },

    /// List of workspaces
    Workspaces { workspaces: Vec<WorkspaceEntry> },

    /// Workspace removal result
    WorkspaceRemoved { existed: bool },

    /// Discovered projects
    Projects { projects: Vec<Project> },

    /// Aggregate worker snapshot
    WorkerStatus { projects: Vec<Project>, running_jobs: Vec<JobSummary> },

    /// Daemon status
    Status { version: String, uptime_secs: u64, jobs_active: usize, workspaces_held: usize },

    /// Error response
    Error {
        message: String,
        #[serde(default)]
        kind: ErrorKind,
    },
}

/// Error category, so the CLI can choose an exit code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Request rejected by validation (bad name, empty description)
    Invalid,
    /// Exclusive resource already in use
    Conflict,
    NotFound,
    #[default]
    Internal,
}

bt_core::simple_display! {
    ErrorKind {
        Invalid => "invalid",
        Conflict => "conflict",
        NotFound => "not_found",
        Internal => "internal",
    }
}

impl Response {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Response::Error { message: message.into(), kind }
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
