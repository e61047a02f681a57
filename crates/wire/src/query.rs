// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query types for reading daemon state.

use serde::{Deserialize, Serialize};

/// Query types for reading daemon state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Query {
    /// Jobs in the active set, oldest first
    ListJobs,
    /// Active or archived job by id (unique prefix match on active jobs)
    GetJob { id: String },
    /// Archived jobs, newest first
    JobHistory {
        /// Defaults to the daemon's configured history limit
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<usize>,
    },
    ListWorkspaces {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        project: Option<String>,
    },
    ListProjects,
    /// Aggregate snapshot of projects and running jobs
    WorkerStatus,
}
