// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use super::Query;

/// Request from CLI to daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Submit a job against a project's task stream
    Submit { project: String, task_stream: String, description: String },

    /// Cancel a running job
    JobCancel { id: String },

    /// Delete a workspace's working tree and metadata
    WorkspaceRemove { project: String, task_stream: String },

    /// Mark a workspace available again (manual orphan recovery)
    WorkspaceRelease { project: String, task_stream: String },

    /// Query state
    Query { query: Query },

    /// Get daemon status
    Status,

    /// Request daemon shutdown
    Shutdown,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
