// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only query handlers.

use bt_core::{Job, JobId, SystemClock};
use bt_engine::JobRegistry;
use bt_wire::{JobDetail, JobSummary, Query, Response, WorkspaceEntry};

use super::ListenCtx;
use crate::env::PROTOCOL_VERSION;

/// Handle query requests (read-only state access).
pub(super) async fn handle_query(ctx: &ListenCtx, query: Query) -> Response {
    let orchestrator = ctx.dispatcher.orchestrator();
    let registry = orchestrator.registry();

    match query {
        Query::ListJobs => {
            let jobs = registry.list_active().iter().map(JobSummary::from).collect();
            Response::Jobs { jobs }
        }

        Query::GetJob { id } => {
            let job = find_job(registry, &id)
                .map(|(job, archived)| Box::new(JobDetail::from_job(&job, archived)));
            Response::Job { job }
        }

        Query::JobHistory { limit } => {
            let limit = limit.unwrap_or(ctx.history_limit);
            let jobs = registry.list_history(limit).iter().map(JobSummary::from).collect();
            Response::Jobs { jobs }
        }

        Query::ListWorkspaces { project } => {
            let workspaces = orchestrator
                .allocator()
                .list_all(project.as_deref())
                .await
                .iter()
                .map(WorkspaceEntry::from)
                .collect();
            Response::Workspaces { workspaces }
        }

        Query::ListProjects => Response::Projects { projects: ctx.dispatcher.catalog().list().await },

        Query::WorkerStatus => {
            let status = ctx.dispatcher.status().await;
            Response::WorkerStatus {
                projects: status.projects,
                running_jobs: status.running_jobs.iter().map(JobSummary::from).collect(),
            }
        }
    }
}

pub(super) async fn handle_status(ctx: &ListenCtx) -> Response {
    let orchestrator = ctx.dispatcher.orchestrator();
    let workspaces_held =
        orchestrator.allocator().list_all(None).await.iter().filter(|ws| ws.is_held()).count();
    Response::Status {
        version: PROTOCOL_VERSION.to_string(),
        uptime_secs: ctx.start_time.elapsed().as_secs(),
        jobs_active: orchestrator.registry().list_active().len(),
        workspaces_held,
    }
}

/// Look up a job by exact id (active, then history) or by a unique prefix
/// of an active job's id. The flag is true for archived records.
pub(super) fn find_job(registry: &JobRegistry<SystemClock>, id: &str) -> Option<(Job, bool)> {
    if id.is_empty() {
        return None;
    }
    let exact = JobId::from_string(id);
    if let Some(job) = registry.get(&exact) {
        return Some((job, false));
    }
    if let Some(job) = registry.get_archived(&exact) {
        return Some((job, true));
    }

    let mut matches = registry
        .list_active()
        .into_iter()
        .filter(|job| job.id.as_str().starts_with(id) || job.id.suffix().starts_with(id));
    match (matches.next(), matches.next()) {
        (Some(job), None) => Some((job, false)),
        _ => None,
    }
}
