// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bt workspace` - Workspace management commands

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::color;
use crate::exit_error::{ExitError, EXIT_VALIDATION};
use crate::output::{format_or_json, format_time_ago, handle_list, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct WorkspaceArgs {
    #[command(subcommand)]
    pub command: WorkspaceCommand,
}

#[derive(Subcommand)]
pub enum WorkspaceCommand {
    /// List workspaces
    List {
        /// Only workspaces for this project
        #[arg(long)]
        project: Option<String>,
    },
    /// Delete an available workspace and its worktree
    Remove { project: String, task_stream: String },
    /// Mark a held workspace available again (after a crash)
    Release { project: String, task_stream: String },
}

pub async fn handle(
    command: WorkspaceCommand,
    client: &DaemonClient,
    format: OutputFormat,
) -> Result<()> {
    match command {
        WorkspaceCommand::List { project } => {
            let mut workspaces = client.list_workspaces(project.as_deref()).await?;
            workspaces.sort_by(|a, b| {
                (a.project.as_str(), a.task_stream.as_str())
                    .cmp(&(b.project.as_str(), b.task_stream.as_str()))
            });
            handle_list(format, &workspaces, "No workspaces", |items, out| {
                let mut table = Table::new(vec![
                    Column::left("PROJECT").with_max(20),
                    Column::left("TASK STREAM").with_max(32),
                    Column::status("STATUS"),
                    Column::left("USES"),
                    Column::left("LAST USED"),
                    Column::muted("PATH"),
                ]);
                for w in items {
                    table.row(vec![
                        w.project.clone(),
                        w.task_stream.clone(),
                        w.status.to_string(),
                        w.use_count.to_string(),
                        format_time_ago(w.last_used_at),
                        w.path.display().to_string(),
                    ]);
                }
                table.render(out);
            })?;
        }
        WorkspaceCommand::Remove { project, task_stream } => {
            check_name(&task_stream)?;
            let existed = client.remove_workspace(&project, &task_stream).await?;
            let obj = serde_json::json!({
                "project": project,
                "task_stream": task_stream,
                "removed": existed,
            });
            format_or_json(format, &obj, || {
                if existed {
                    println!("Removed workspace {}", color::literal(&format!("{project}/{task_stream}")));
                } else {
                    println!("No workspace {}/{}", project, task_stream);
                }
            })?;
        }
        WorkspaceCommand::Release { project, task_stream } => {
            check_name(&task_stream)?;
            client.release_workspace(&project, &task_stream).await?;
            let obj = serde_json::json!({
                "project": project,
                "task_stream": task_stream,
                "status": "available",
            });
            format_or_json(format, &obj, || {
                println!("Released workspace {}", color::literal(&format!("{project}/{task_stream}")));
            })?;
        }
    }
    Ok(())
}

fn check_name(task_stream: &str) -> Result<(), ExitError> {
    bt_core::validate_task_stream(task_stream)
        .map_err(|e| ExitError::new(EXIT_VALIDATION, e.to_string()))
}
