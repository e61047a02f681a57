// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener context over a scratch workspace root.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bt_core::SystemClock;
use bt_engine::{
    AllocatorConfig, Dispatcher, ExecutionStrategy, JobRegistry, Orchestrator, ProjectCatalog,
    UnixScriptStrategy, WorkspaceAllocator,
};
use bt_wire::{JobDetail, Query, Request, Response};
use tempfile::TempDir;
use tokio::sync::Notify;

use super::{handle_request, ListenCtx};

pub(crate) struct Fixture {
    pub dir: TempDir,
    pub ctx: ListenCtx,
}

impl Fixture {
    /// Context whose jobs pipe their description into `assistant`.
    pub fn new(assistant: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("repos");
        let scripts = dir.path().join("scripts");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(&scripts).unwrap();

        let registry = Arc::new(
            JobRegistry::load(
                &dir.path().join("state/jobs/active"),
                &dir.path().join("state/jobs/history"),
                SystemClock,
            )
            .unwrap(),
        );
        let allocator =
            Arc::new(WorkspaceAllocator::load(AllocatorConfig::under(&root), SystemClock).unwrap());
        let strategy: Arc<dyn ExecutionStrategy> =
            Arc::new(UnixScriptStrategy::new(assistant).with_script_dir(scripts));
        let orchestrator = Arc::new(
            Orchestrator::new(registry, allocator, strategy, SystemClock)
                .with_cancel_grace(Duration::from_millis(500)),
        );
        let dispatcher = Arc::new(Dispatcher::new(orchestrator, ProjectCatalog::new(root)));

        let ctx = ListenCtx {
            dispatcher,
            history_limit: 50,
            start_time: Instant::now(),
            shutdown: Arc::new(Notify::new()),
        };
        Self { dir, ctx }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("repos")
    }

    /// A project directory with a `.git` marker and a pre-made worktree
    /// directory for `task_stream`, so acquisition adopts it without git.
    pub fn project(&self, name: &str, task_stream: &str) -> PathBuf {
        let path = self.root().join(name);
        std::fs::create_dir_all(path.join(".git")).unwrap();
        let worktree = self.ctx.dispatcher.orchestrator().allocator().path_for(name, task_stream);
        std::fs::create_dir_all(worktree).unwrap();
        path
    }

    pub async fn request(&self, request: Request) -> Response {
        handle_request(request, &self.ctx).await
    }

    pub async fn submit(&self, project: &str, task_stream: &str, description: &str) -> Response {
        self.request(Request::Submit {
            project: project.to_string(),
            task_stream: task_stream.to_string(),
            description: description.to_string(),
        })
        .await
    }

    /// Poll until the job has been archived and its run has let go of the workspace.
    pub async fn wait_archived(&self, id: &str) -> JobDetail {
        for _ in 0..500 {
            let response = self.request(Request::Query { query: Query::GetJob { id: id.to_string() } }).await;
            if let Response::Job { job: Some(job) } = response {
                let running = self.ctx.dispatcher.running_ids().iter().any(|r| r.as_str() == id);
                if job.archived && !running {
                    return *job;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("job {id} was not archived in time");
    }

    pub async fn wait_running(&self, id: &str) {
        for _ in 0..500 {
            let response = self.request(Request::Query { query: Query::GetJob { id: id.to_string() } }).await;
            if let Response::Job { job: Some(job) } = response {
                if job.status == bt_core::JobStatus::Running {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("job {id} never started running");
    }
}

pub(crate) fn submitted_id(response: &Response) -> String {
    match response {
        Response::JobSubmitted { job } => job.id.clone(),
        other => panic!("expected JobSubmitted, got {other:?}"),
    }
}

pub(crate) fn assert_error(response: &Response, expected: bt_wire::ErrorKind) -> &str {
    match response {
        Response::Error { message, kind } => {
            assert_eq!(*kind, expected, "unexpected kind for error: {message}");
            message
        }
        other => panic!("expected Error({expected}), got {other:?}"),
    }
}
