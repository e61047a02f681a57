// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bt-engine: Workspace allocation, job registry and execution orchestration

pub mod allocator;
pub mod dispatcher;
pub mod execution;
pub mod git;
pub mod notes;
pub mod orchestrator;
pub mod projects;
pub mod registry;
pub mod subprocess;

#[cfg(test)]
mod test_support;

pub use allocator::{AllocatorConfig, AllocatorError, WorkspaceAllocator};
pub use dispatcher::{Dispatcher, ReleaseError, SubmitError, SubmitRequest, WorkerStatus};
pub use execution::{
    strategy_for_host, ExecutionError, ExecutionStrategy, PreparedRun, UnixScriptStrategy,
    WindowsScriptStrategy,
};
pub use orchestrator::{Orchestrator, RunError, RunOutcome, CANCELLED_MESSAGE};
pub use projects::ProjectCatalog;
pub use registry::JobRegistry;
