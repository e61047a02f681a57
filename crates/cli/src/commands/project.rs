// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bt project` - Projects discovered under the workspace root

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::output::{handle_list, or_dash, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub command: ProjectCommand,
}

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// List git repositories jobs can target
    List,
}

pub async fn handle(
    command: ProjectCommand,
    client: &DaemonClient,
    format: OutputFormat,
) -> Result<()> {
    match command {
        ProjectCommand::List => {
            let projects = client.list_projects().await?;
            handle_list(format, &projects, "No projects", |items, out| {
                let mut table = Table::new(vec![
                    Column::left("NAME"),
                    Column::left("BRANCH").with_max(32),
                    Column::muted("PATH"),
                ]);
                for p in items {
                    table.row(vec![
                        p.name.clone(),
                        or_dash(p.branch.as_deref()),
                        p.path.display().to_string(),
                    ]);
                }
                table.render(out);
            })?;
        }
    }
    Ok(())
}
