// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace removal and manual release handlers.

use bt_core::validate_task_stream;
use bt_engine::{AllocatorError, ReleaseError};
use bt_wire::{ErrorKind, Response};
use tracing::warn;

use super::ListenCtx;

pub(super) async fn handle_remove(ctx: &ListenCtx, project: &str, task_stream: &str) -> Response {
    if let Err(e) = validate_task_stream(task_stream) {
        return Response::error(ErrorKind::Invalid, e.to_string());
    }
    match ctx.dispatcher.orchestrator().allocator().remove(project, task_stream).await {
        Ok(existed) => Response::WorkspaceRemoved { existed },
        Err(e @ AllocatorError::InUse(_)) => Response::error(ErrorKind::Conflict, e.to_string()),
        Err(e) => {
            warn!(project, task_stream, error = %e, "workspace removal failed");
            Response::error(ErrorKind::Internal, e.to_string())
        }
    }
}

/// Return a held workspace to the pool. Refused while a job on this
/// worker is still using it.
pub(super) async fn handle_release(ctx: &ListenCtx, project: &str, task_stream: &str) -> Response {
    match ctx.dispatcher.release_workspace(project, task_stream).await {
        Ok(()) => Response::Ok,
        Err(e) => {
            let kind = match e {
                ReleaseError::InvalidTaskStream(_) => ErrorKind::Invalid,
                ReleaseError::NotFound(_) => ErrorKind::NotFound,
                ReleaseError::HeldBy(_) => ErrorKind::Conflict,
            };
            Response::error(kind, e.to_string())
        }
    }
}
