// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query and command methods for DaemonClient.

use bt_core::Project;
use bt_wire::{JobDetail, JobSummary, Query, Request, Response, WorkspaceEntry};

use super::{ClientError, DaemonClient};

/// Daemon status as reported by `Request::Status`
#[derive(Debug, Clone, serde::Serialize)]
pub struct DaemonStatus {
    pub version: String,
    pub uptime_secs: u64,
    pub jobs_active: usize,
    pub workspaces_held: usize,
}

/// Aggregate worker snapshot
#[derive(Debug, Clone, serde::Serialize)]
pub struct WorkerSnapshot {
    pub projects: Vec<Project>,
    pub running_jobs: Vec<JobSummary>,
}

impl DaemonClient {
    pub async fn submit(
        &self,
        project: &str,
        task_stream: &str,
        description: &str,
    ) -> Result<JobSummary, ClientError> {
        let request = Request::Submit {
            project: project.to_string(),
            task_stream: task_stream.to_string(),
            description: description.to_string(),
        };
        match self.send(&request).await? {
            Response::JobSubmitted { job } => Ok(job),
            other => Self::reject(other),
        }
    }

    /// Query for active jobs
    pub async fn list_jobs(&self) -> Result<Vec<JobSummary>, ClientError> {
        match self.query(Query::ListJobs).await? {
            Response::Jobs { jobs } => Ok(jobs),
            other => Self::reject(other),
        }
    }

    /// Query for a specific job (active or archived)
    pub async fn get_job(&self, id: &str) -> Result<Option<JobDetail>, ClientError> {
        match self.query(Query::GetJob { id: id.to_string() }).await? {
            Response::Job { job } => Ok(job.map(|b| *b)),
            other => Self::reject(other),
        }
    }

    pub async fn job_history(&self, limit: Option<usize>) -> Result<Vec<JobSummary>, ClientError> {
        match self.query(Query::JobHistory { limit }).await? {
            Response::Jobs { jobs } => Ok(jobs),
            other => Self::reject(other),
        }
    }

    /// Signal cancellation; returns the resolved job id.
    pub async fn cancel_job(&self, id: &str) -> Result<String, ClientError> {
        match self.send(&Request::JobCancel { id: id.to_string() }).await? {
            Response::JobCancelling { id } => Ok(id),
            other => Self::reject(other),
        }
    }

    pub async fn list_workspaces(
        &self,
        project: Option<&str>,
    ) -> Result<Vec<WorkspaceEntry>, ClientError> {
        let query = Query::ListWorkspaces { project: project.map(str::to_string) };
        match self.query(query).await? {
            Response::Workspaces { workspaces } => Ok(workspaces),
            other => Self::reject(other),
        }
    }

    /// Returns whether the workspace existed.
    pub async fn remove_workspace(&self, project: &str, task_stream: &str) -> Result<bool, ClientError> {
        let request = Request::WorkspaceRemove {
            project: project.to_string(),
            task_stream: task_stream.to_string(),
        };
        match self.send(&request).await? {
            Response::WorkspaceRemoved { existed } => Ok(existed),
            other => Self::reject(other),
        }
    }

    pub async fn release_workspace(&self, project: &str, task_stream: &str) -> Result<(), ClientError> {
        let request = Request::WorkspaceRelease {
            project: project.to_string(),
            task_stream: task_stream.to_string(),
        };
        match self.send(&request).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        match self.query(Query::ListProjects).await? {
            Response::Projects { projects } => Ok(projects),
            other => Self::reject(other),
        }
    }

    pub async fn worker_status(&self) -> Result<WorkerSnapshot, ClientError> {
        match self.query(Query::WorkerStatus).await? {
            Response::WorkerStatus { projects, running_jobs } => {
                Ok(WorkerSnapshot { projects, running_jobs })
            }
            other => Self::reject(other),
        }
    }

    /// Get daemon status
    pub async fn status(&self) -> Result<DaemonStatus, ClientError> {
        match self.send(&Request::Status).await? {
            Response::Status { version, uptime_secs, jobs_active, workspaces_held } => {
                Ok(DaemonStatus { version, uptime_secs, jobs_active, workspaces_held })
            }
            other => Self::reject(other),
        }
    }

    /// Request daemon shutdown
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await {
            Ok(Response::Ok | Response::ShuttingDown) => Ok(()),
            // The daemon may exit before the response is flushed
            Err(ClientError::Protocol(bt_wire::ProtocolError::ConnectionClosed)) => Ok(()),
            Ok(other) => Self::reject(other),
            Err(e) => Err(e),
        }
    }

    /// Get daemon version via Hello handshake
    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello { version: env!("CARGO_PKG_VERSION").to_string() };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            other => Self::reject(other),
        }
    }

    async fn query(&self, query: Query) -> Result<Response, ClientError> {
        self.send(&Request::Query { query }).await
    }
}
