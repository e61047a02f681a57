// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bt-core: Domain types for the bt task-stream worker

pub mod macros;

pub mod clock;
pub mod id;
pub mod job;
pub mod project;
pub mod task_stream;
pub mod time_fmt;
pub mod workspace;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use id::JobId;
#[cfg(any(test, feature = "test-support"))]
pub use job::JobBuilder;
pub use job::{Job, JobStatus};
pub use project::Project;
pub use task_stream::{validate_task_stream, NameError, MAX_TASK_STREAM_LEN};
pub use time_fmt::{format_elapsed, format_log_stamp, format_utc};
#[cfg(any(test, feature = "test-support"))]
pub use workspace::WorkspaceBuilder;
pub use workspace::{Workspace, WorkspaceKey, WorkspaceStatus};
