// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job registry: identity, status transitions, logs and history.
//!
//! Active jobs are held in memory and persisted one document per job under
//! the active store. A job reaching a terminal status is written to the
//! history store and dropped from the active set. All mutation happens
//! under one registry-wide lock. Persistence failures are logged and the
//! in-memory change stands.

use bt_core::{Clock, Job, JobId, JobStatus};
use bt_storage::{DocumentStore, StoreError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct JobRegistry<C: Clock> {
    active: DocumentStore,
    history: DocumentStore,
    clock: C,
    jobs: Mutex<HashMap<JobId, Job>>,
}

impl<C: Clock> JobRegistry<C> {
    /// Open both stores and load every in-flight job.
    ///
    /// Records that are already terminal (an archive write that failed
    /// earlier) are moved to history instead of being loaded.
    pub fn load(active_dir: &Path, history_dir: &Path, clock: C) -> Result<Self, StoreError> {
        let active = DocumentStore::open(active_dir)?;
        let history = DocumentStore::open(history_dir)?;

        let mut jobs = HashMap::new();
        for job in active.load_all::<Job>()? {
            if job.is_terminal() {
                archive(&active, &history, &job);
                continue;
            }
            jobs.insert(job.id.clone(), job);
        }
        tracing::info!(count = jobs.len(), dir = %active_dir.display(), "loaded active jobs");

        Ok(Self { active, history, clock, jobs: Mutex::new(jobs) })
    }

    /// Register a new pending job.
    pub fn create(
        &self,
        project: &str,
        project_path: &Path,
        description: &str,
        task_stream: &str,
    ) -> Job {
        let job = Job::new(project, project_path, task_stream, description, self.clock.now());
        let mut jobs = self.jobs.lock();
        self.persist(&job);
        jobs.insert(job.id.clone(), job.clone());
        tracing::info!(job_id = %job.id, project, task_stream, "job created");
        job
    }

    /// Apply a status change, returning the updated job.
    ///
    /// Terminal statuses archive the job. Returns `None` (with a warning)
    /// when the job is not active.
    pub fn update_status(
        &self,
        id: &JobId,
        status: JobStatus,
        result: Option<String>,
        error: Option<String>,
    ) -> Option<Job> {
        let mut jobs = self.jobs.lock();
        let Some(job) = jobs.get_mut(id) else {
            tracing::warn!(job_id = %id, %status, "status update for inactive job ignored");
            return None;
        };

        let from = job.status;
        job.transition(status, result, error, self.clock.now());
        tracing::info!(job_id = %id, %from, to = %status, "job status changed");

        if !status.is_terminal() {
            let snapshot = job.clone();
            self.persist(&snapshot);
            return Some(snapshot);
        }

        let job = jobs.remove(id)?;
        archive(&self.active, &self.history, &job);
        Some(job)
    }

    /// Append a timestamped line to an active job's log.
    pub fn append_log(&self, id: &JobId, line: &str) {
        let mut jobs = self.jobs.lock();
        let Some(job) = jobs.get_mut(id) else {
            return;
        };
        job.push_log(line, self.clock.now());
        self.persist(job);
    }

    /// Record the workspace an active job runs in.
    pub fn assign_workspace(&self, id: &JobId, path: PathBuf) {
        let mut jobs = self.jobs.lock();
        let Some(job) = jobs.get_mut(id) else {
            tracing::warn!(job_id = %id, "workspace assignment for inactive job ignored");
            return;
        };
        job.workspace_path = Some(path);
        self.persist(job);
    }

    /// Active job by id.
    pub fn get(&self, id: &JobId) -> Option<Job> {
        self.jobs.lock().get(id).cloned()
    }

    /// Archived job by id.
    pub fn get_archived(&self, id: &JobId) -> Option<Job> {
        match self.history.read(id.as_str()) {
            Ok(job) => job,
            Err(e) => {
                tracing::warn!(job_id = %id, error = %e, "unreadable history record");
                None
            }
        }
    }

    /// Snapshot of active jobs, oldest first.
    pub fn list_active(&self) -> Vec<Job> {
        let mut list: Vec<_> = self.jobs.lock().values().cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.as_str().cmp(b.id.as_str())));
        list
    }

    /// Archived jobs, newest first, at most `limit`.
    pub fn list_history(&self, limit: usize) -> Vec<Job> {
        let entries = match self.history.entries(JobId::PREFIX) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(dir = %self.history.dir().display(), error = %e, "failed to list job history");
                return Vec::new();
            }
        };

        entries
            .iter()
            .filter_map(|entry| match self.history.read_entry::<Job>(entry) {
                Ok(job) => Some(job),
                Err(e) => {
                    tracing::warn!(path = %entry.path.display(), error = %e, "skipping corrupt history record");
                    None
                }
            })
            .take(limit)
            .collect()
    }

    fn persist(&self, job: &Job) {
        if let Err(e) = self.active.write(job.id.as_str(), job) {
            tracing::error!(job_id = %job.id, error = %e, "failed to persist job");
        }
    }
}

/// Move a terminal job from the active store to history.
///
/// If the history write fails the terminal record is kept in the active
/// store so the next load retries the move.
fn archive(active: &DocumentStore, history: &DocumentStore, job: &Job) {
    if let Err(e) = history.write(job.id.as_str(), job) {
        tracing::error!(job_id = %job.id, error = %e, "failed to archive job");
        if let Err(e) = active.write(job.id.as_str(), job) {
            tracing::error!(job_id = %job.id, error = %e, "failed to persist job");
        }
        return;
    }
    if let Err(e) = active.delete(job.id.as_str()) {
        tracing::error!(job_id = %job.id, error = %e, "failed to remove active job record");
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
