// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job submission.
//!
//! A submission is validated and its workspace acquired before the job is
//! created, so a rejected request leaves no trace. The run itself happens
//! on its own task; the caller gets the pending job back immediately.

use crate::allocator::AllocatorError;
use crate::orchestrator::Orchestrator;
use crate::projects::ProjectCatalog;
use bt_core::{
    validate_task_stream, Clock, Job, JobId, NameError, Project, WorkspaceKey, WorkspaceStatus,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// A request to run a task against a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub project: String,
    pub task_stream: String,
    pub description: String,
}

/// Reasons a submission is rejected.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    InvalidTaskStream(#[from] NameError),
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("project '{0}' not found")]
    ProjectNotFound(String),
    #[error("task stream '{}' of project '{}' is already in use", .0.task_stream, .0.project)]
    Conflict(WorkspaceKey),
    #[error("worker is shutting down")]
    ShuttingDown,
    #[error("failed to prepare workspace: {0}")]
    Allocator(AllocatorError),
}

impl From<AllocatorError> for SubmitError {
    fn from(e: AllocatorError) -> Self {
        match e {
            AllocatorError::InvalidKey(e) => SubmitError::InvalidTaskStream(e),
            AllocatorError::Conflict(key) => SubmitError::Conflict(key),
            e => SubmitError::Allocator(e),
        }
    }
}

/// Reasons an operator release is refused.
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error(transparent)]
    InvalidTaskStream(#[from] NameError),
    #[error("no workspace for task stream '{}' of project '{}'", .0.task_stream, .0.project)]
    NotFound(WorkspaceKey),
    #[error("workspace is held by running job {0}; cancel it first")]
    HeldBy(JobId),
}

/// A job executing on this worker and the workspace it holds.
struct RunningJob {
    token: CancellationToken,
    key: WorkspaceKey,
}

/// Aggregate snapshot for status reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerStatus {
    pub projects: Vec<Project>,
    pub running_jobs: Vec<Job>,
}

pub struct Dispatcher<C: Clock> {
    orchestrator: Arc<Orchestrator<C>>,
    catalog: ProjectCatalog,
    shutdown: CancellationToken,
    running: Arc<Mutex<HashMap<JobId, RunningJob>>>,
    running_count: watch::Sender<usize>,
    /// Held from acquire until the job is registered as running, and by
    /// operator releases, so a release never sees a held workspace whose
    /// owner is not yet visible.
    admission: tokio::sync::Mutex<()>,
}

impl<C: Clock> Dispatcher<C> {
    pub fn new(orchestrator: Arc<Orchestrator<C>>, catalog: ProjectCatalog) -> Self {
        Self {
            orchestrator,
            catalog,
            shutdown: CancellationToken::new(),
            running: Arc::new(Mutex::new(HashMap::new())),
            running_count: watch::Sender::new(0),
            admission: tokio::sync::Mutex::new(()),
        }
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator<C>> {
        &self.orchestrator
    }

    pub fn catalog(&self) -> &ProjectCatalog {
        &self.catalog
    }

    /// Validate, acquire and start a job. Returns the job as created.
    pub async fn submit(&self, req: SubmitRequest) -> Result<Job, SubmitError> {
        validate_task_stream(&req.task_stream)?;
        if req.description.trim().is_empty() {
            return Err(SubmitError::EmptyDescription);
        }
        if self.shutdown.is_cancelled() {
            return Err(SubmitError::ShuttingDown);
        }
        let project = self
            .catalog
            .find(&req.project)
            .await
            .ok_or_else(|| SubmitError::ProjectNotFound(req.project.clone()))?;

        let admission = self.admission.lock().await;
        let allocator = self.orchestrator.allocator();
        let ws = allocator.acquire(&project.name, &project.path, &req.task_stream).await?;

        let job = self.orchestrator.registry().create(
            &project.name,
            &project.path,
            &req.description,
            &req.task_stream,
        );

        let token = self.shutdown.child_token();
        {
            let mut running = self.running.lock();
            running.insert(job.id.clone(), RunningJob { token: token.clone(), key: ws.key() });
            self.running_count.send_replace(running.len());
        }
        drop(admission);

        let orchestrator = Arc::clone(&self.orchestrator);
        let running = Arc::clone(&self.running);
        let running_count = self.running_count.clone();
        let spawned = job.clone();
        tokio::spawn(async move {
            let outcome = orchestrator.run_acquired(&spawned, ws, token).await;
            if outcome.success {
                tracing::info!(job_id = %spawned.id, "job succeeded");
            } else {
                tracing::warn!(job_id = %spawned.id, error = %outcome.error, "job failed");
            }
            let mut running = running.lock();
            running.remove(&spawned.id);
            running_count.send_replace(running.len());
        });

        Ok(job)
    }

    /// Cancel a running job. Returns false if it is not running here.
    pub fn cancel(&self, id: &JobId) -> bool {
        match self.running.lock().get(id) {
            Some(entry) => {
                tracing::info!(job_id = %id, "cancel requested");
                entry.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Jobs currently executing on this worker.
    pub fn running_ids(&self) -> Vec<JobId> {
        self.running.lock().keys().cloned().collect()
    }

    /// Return a held workspace to the pool. Refused while a job on this
    /// worker still holds it; a workspace that is already available is left
    /// as is.
    pub async fn release_workspace(
        &self,
        project: &str,
        task_stream: &str,
    ) -> Result<(), ReleaseError> {
        validate_task_stream(task_stream)?;
        let key = WorkspaceKey::new(project, task_stream);
        let _admission = self.admission.lock().await;

        let allocator = self.orchestrator.allocator();
        let Some(ws) = allocator.get(project, task_stream).await else {
            return Err(ReleaseError::NotFound(key));
        };
        if !ws.is_held() {
            return Ok(());
        }
        let owner = self
            .running
            .lock()
            .iter()
            .find(|(_, entry)| entry.key == key)
            .map(|(id, _)| id.clone());
        if let Some(id) = owner {
            return Err(ReleaseError::HeldBy(id));
        }

        allocator.release(project, task_stream, WorkspaceStatus::Available).await;
        tracing::info!(%key, "workspace released by operator");
        Ok(())
    }

    pub async fn status(&self) -> WorkerStatus {
        WorkerStatus {
            projects: self.catalog.list().await,
            running_jobs: self.orchestrator.registry().list_active(),
        }
    }

    /// Refuse new submissions and cancel everything in flight.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Wait until no job is executing.
    pub async fn wait_idle(&self) {
        let mut rx = self.running_count.subscribe();
        let _ = rx.wait_for(|count| *count == 0).await;
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
