// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! bt - operator CLI for the job worker daemon

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod color;
mod commands;
mod exit_error;
mod output;
mod table;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::client::DaemonClient;
use crate::commands::{daemon, job, project, submit, workspace};
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "bt", version, about = "Serialized coding-assistant jobs over isolated worktrees")]
#[command(styles = color::styles())]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a job to a project task stream
    Submit(submit::SubmitArgs),
    /// Job inspection and cancellation
    Job(job::JobArgs),
    /// Workspace management
    Workspace(workspace::WorkspaceArgs),
    /// Projects under the workspace root
    Project(project::ProjectArgs),
    /// Daemon management
    Daemon(daemon::DaemonArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {:#}", e);
        std::process::exit(exit_error::exit_code(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.output;
    let client = DaemonClient::from_env()?;
    match cli.command {
        Commands::Submit(args) => submit::handle(args, &client, format).await,
        Commands::Job(args) => job::handle(args.command, &client, format).await,
        Commands::Workspace(args) => workspace::handle(args.command, &client, format).await,
        Commands::Project(args) => project::handle(args.command, &client, format).await,
        Commands::Daemon(args) => daemon::handle(args.command, &client, format).await,
    }
}
