// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orphan reconciliation after daemon restart.
//!
//! Jobs still in the active store and workspaces still marked held were
//! owned by a process that no longer exists.

use bt_core::{Clock, JobId, JobStatus, WorkspaceKey, WorkspaceStatus};
use bt_engine::{notes, JobRegistry, WorkspaceAllocator};
use tracing::{info, warn};

use crate::config::OrphanPolicy;

/// Error recorded on jobs failed by reconciliation
pub const INTERRUPTED_MESSAGE: &str = "interrupted: worker restarted";

/// Leftovers found at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub jobs: Vec<JobId>,
    pub workspaces: Vec<WorkspaceKey>,
    /// Whether the leftovers were resolved (false under the manual policy)
    pub resolved: bool,
}

impl ReconcileSummary {
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty() && self.workspaces.is_empty()
    }
}

pub async fn reconcile_orphans<C: Clock>(
    registry: &JobRegistry<C>,
    allocator: &WorkspaceAllocator<C>,
    policy: OrphanPolicy,
    clock: &C,
) -> ReconcileSummary {
    let jobs = registry.list_active();
    let held: Vec<_> =
        allocator.list_all(None).await.into_iter().filter(|ws| ws.is_held()).collect();

    let mut summary = ReconcileSummary {
        jobs: jobs.iter().map(|job| job.id.clone()).collect(),
        workspaces: held.iter().map(|ws| ws.key()).collect(),
        resolved: false,
    };
    if summary.is_empty() {
        return summary;
    }

    match policy {
        OrphanPolicy::Manual => {
            for job in &jobs {
                warn!(
                    job_id = %job.id,
                    project = %job.project,
                    task_stream = %job.task_stream,
                    status = %job.status,
                    "orphaned job left for operator"
                );
            }
            for ws in &held {
                warn!(
                    project = %ws.project,
                    task_stream = %ws.task_stream,
                    "workspace still held; release with `bt workspace release`"
                );
            }
        }
        OrphanPolicy::Release => {
            for job in &jobs {
                let failed = registry.update_status(
                    &job.id,
                    JobStatus::Failed,
                    None,
                    Some(INTERRUPTED_MESSAGE.to_string()),
                );
                info!(job_id = %job.id, from = %job.status, "failed orphaned job");
                let (Some(failed), Some(path)) = (failed, job.workspace_path.as_deref()) else {
                    continue;
                };
                if let Err(e) = notes::append_job(path, &failed, clock.now()) {
                    warn!(job_id = %job.id, path = %path.display(), error = %e, "failed to update task notes");
                }
            }
            for ws in &held {
                allocator.release(&ws.project, &ws.task_stream, WorkspaceStatus::Available).await;
                info!(project = %ws.project, task_stream = %ws.task_stream, "released orphaned workspace");
            }
            summary.resolved = true;
        }
    }

    summary
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
