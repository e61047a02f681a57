// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bt submit` - Queue a job on a project task stream

use anyhow::Result;
use clap::Args;

use crate::client::DaemonClient;
use crate::color;
use crate::exit_error::{ExitError, EXIT_VALIDATION};
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct SubmitArgs {
    /// Project (directory name under the workspace root)
    pub project: String,

    /// Task stream; jobs on the same stream run one at a time
    pub task_stream: String,

    /// Instructions for the assistant
    #[arg(required = true, num_args = 1..)]
    pub description: Vec<String>,
}

impl SubmitArgs {
    /// Reject bad names and blank descriptions before contacting the daemon.
    pub fn validate(&self) -> Result<String, ExitError> {
        bt_core::validate_task_stream(&self.task_stream)
            .map_err(|e| ExitError::new(EXIT_VALIDATION, e.to_string()))?;
        let description = self.description.join(" ");
        if description.trim().is_empty() {
            return Err(ExitError::new(EXIT_VALIDATION, "description must not be empty"));
        }
        Ok(description)
    }
}

pub async fn handle(args: SubmitArgs, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let description = args.validate()?;
    let job = client.submit(&args.project, &args.task_stream, &description).await?;
    format_or_json(format, &job, || {
        println!(
            "Job {} submitted ({}/{})",
            color::header(&job.id),
            job.project,
            job.task_stream
        );
    })
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
