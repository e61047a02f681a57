// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bt job` - Job inspection and cancellation

use anyhow::Result;
use bt_wire::{JobDetail, JobSummary};
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::color;
use crate::exit_error::ExitError;
use crate::output::{
    apply_limit, format_or_json, format_time_ago, handle_list, handle_list_with_limit, or_dash,
    OutputFormat,
};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct JobArgs {
    #[command(subcommand)]
    pub command: JobCommand,
}

#[derive(Subcommand)]
pub enum JobCommand {
    /// List active jobs
    List {
        /// Only jobs for this project
        #[arg(long)]
        project: Option<String>,
    },
    /// Show details of a job
    Show {
        /// Job ID (or unique prefix of an active job)
        id: String,

        /// Print the full captured log
        #[arg(long)]
        logs: bool,
    },
    /// List finished jobs, newest first
    History {
        /// Maximum number of jobs to show (default: 20)
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,

        /// Show all retained jobs (no limit)
        #[arg(long, conflicts_with = "limit")]
        no_limit: bool,
    },
    /// Cancel a running job
    Cancel {
        /// Job ID (or unique prefix)
        id: String,
    },
}

pub async fn handle(command: JobCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match command {
        JobCommand::List { project } => {
            let mut jobs = client.list_jobs().await?;
            if let Some(project) = project.as_deref() {
                jobs.retain(|j| j.project == project);
            }
            handle_list(format, &jobs, "No active jobs", |items, out| {
                job_table(items).render(out);
            })?;
        }
        JobCommand::Show { id, logs } => {
            let Some(job) = client.get_job(&id).await? else {
                return Err(ExitError::new(1, format!("job '{}' not found", id)).into());
            };
            format_or_json(format, &job, || print_detail(&job, logs))?;
        }
        JobCommand::History { limit, no_limit } => {
            let mut jobs = client.job_history(None).await?;
            let truncation = apply_limit(&mut jobs, limit, no_limit);
            handle_list_with_limit(format, &jobs, "No finished jobs", truncation, |items, out| {
                job_table(items).render(out);
            })?;
        }
        JobCommand::Cancel { id } => {
            let id = client.cancel_job(&id).await?;
            let obj = serde_json::json!({ "id": id, "cancelling": true });
            format_or_json(format, &obj, || println!("Cancelling job {}", color::header(&id)))?;
        }
    }
    Ok(())
}

pub(crate) fn job_table(jobs: &[JobSummary]) -> Table {
    let mut table = Table::new(vec![
        Column::muted("ID"),
        Column::left("PROJECT").with_max(20),
        Column::left("TASK STREAM").with_max(32),
        Column::status("STATUS"),
        Column::left("AGE"),
    ]);
    for job in jobs {
        table.row(vec![
            job.id.clone(),
            job.project.clone(),
            job.task_stream.clone(),
            job.status.to_string(),
            format_time_ago(job.created_at),
        ]);
    }
    table
}

fn print_detail(job: &JobDetail, full_logs: bool) {
    println!("{} {}", color::header("Job:"), job.id);
    println!("  {} {}", color::context("Project:"), job.project);
    println!("  {} {}", color::context("Task stream:"), job.task_stream);
    println!("  {} {}", color::context("Status:"), color::job_status(job.status));
    println!("  {} {}", color::context("Created:"), bt_core::format_utc(job.created_at));
    println!("  {} {}", color::context("Started:"), or_dash(job.started_at.map(bt_core::format_utc)));
    println!(
        "  {} {}",
        color::context("Completed:"),
        or_dash(job.completed_at.map(bt_core::format_utc))
    );
    println!(
        "  {} {}",
        color::context("Workspace:"),
        or_dash(job.workspace_path.as_ref().map(|p| p.display()))
    );
    println!("  {} {}", color::context("Description:"), job.description);
    if let Some(error) = &job.error {
        println!("  {} {}", color::context("Error:"), error);
    }
    if let Some(result) = &job.result {
        println!();
        println!("{}", color::header("Result:"));
        println!("{}", result.trim_end());
    }

    if job.logs.is_empty() {
        return;
    }
    const TAIL: usize = 10;
    let skip = if full_logs { 0 } else { job.logs.len().saturating_sub(TAIL) };
    println!();
    println!("{}", color::header("Log:"));
    if skip > 0 {
        println!("{}", color::muted(&format!("... {} earlier lines (use --logs)", skip)));
    }
    for line in &job.logs[skip..] {
        println!("  {}", line);
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
