// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job submission and cancellation handlers.

use bt_engine::{SubmitError, SubmitRequest};
use bt_wire::{ErrorKind, JobSummary, Response};
use tracing::warn;

use super::query::find_job;
use super::ListenCtx;

pub(super) async fn handle_submit(
    ctx: &ListenCtx,
    project: String,
    task_stream: String,
    description: String,
) -> Response {
    let request = SubmitRequest { project, task_stream, description };
    match ctx.dispatcher.submit(request).await {
        Ok(job) => Response::JobSubmitted { job: JobSummary::from(&job) },
        Err(e) => {
            warn!(error = %e, "submission rejected");
            Response::error(submit_error_kind(&e), e.to_string())
        }
    }
}

fn submit_error_kind(e: &SubmitError) -> ErrorKind {
    match e {
        SubmitError::InvalidTaskStream(_) | SubmitError::EmptyDescription => ErrorKind::Invalid,
        SubmitError::ProjectNotFound(_) => ErrorKind::NotFound,
        SubmitError::Conflict(_) => ErrorKind::Conflict,
        SubmitError::ShuttingDown | SubmitError::Allocator(_) => ErrorKind::Internal,
    }
}

pub(super) fn handle_cancel(ctx: &ListenCtx, id: &str) -> Response {
    let registry = ctx.dispatcher.orchestrator().registry();
    let Some((job, archived)) = find_job(registry, id) else {
        return Response::error(ErrorKind::NotFound, format!("job '{id}' not found"));
    };
    if archived {
        return Response::error(
            ErrorKind::Conflict,
            format!("job {} already finished ({})", job.id, job.status),
        );
    }
    if ctx.dispatcher.cancel(&job.id) {
        Response::JobCancelling { id: job.id.to_string() }
    } else {
        Response::error(ErrorKind::Conflict, format!("job {} is not running on this worker", job.id))
    }
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
