// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

/// Proptest strategies for core types.
pub mod strategies {
    use crate::job::JobStatus;
    use proptest::prelude::*;

    /// Task-stream names that pass validation.
    pub fn arb_task_stream() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_-]{0,12}(/[a-z0-9][a-z0-9_-]{0,12}){0,2}"
    }

    pub fn arb_job_status() -> impl Strategy<Value = JobStatus> {
        prop_oneof![
            Just(JobStatus::Pending),
            Just(JobStatus::Running),
            Just(JobStatus::WaitingForUserInput),
            Just(JobStatus::Completed),
            Just(JobStatus::Failed),
        ]
    }
}
