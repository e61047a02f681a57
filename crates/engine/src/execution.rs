// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Platform strategies for invoking the coding assistant.
//!
//! A strategy turns a job into a runnable command that feeds the job's
//! description to the assistant on stdin, and later disposes of whatever it
//! generated to do so. One strategy is chosen per process at startup.

use async_trait::async_trait;
use bt_core::Job;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors preparing or starting an external run.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("failed to write execution script {}: {source}", path.display())]
    Script {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// A command ready to run for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRun {
    pub program: String,
    pub args: Vec<String>,
    pub workdir: PathBuf,
    /// Generated file to delete once the run is over
    pub artifact: Option<PathBuf>,
}

#[async_trait]
pub trait ExecutionStrategy: Send + Sync + 'static {
    /// Build the command that runs `job` inside `workdir`.
    async fn prepare(&self, job: &Job, workdir: &Path) -> Result<PreparedRun, ExecutionError>;

    /// Remove anything `prepare` generated. Best-effort.
    fn dispose(&self, run: &PreparedRun) {
        let Some(path) = &run.artifact else {
            return;
        };
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "deleted execution script"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to delete execution script")
            }
        }
    }
}

/// Runs the assistant through a generated bash script.
pub struct UnixScriptStrategy {
    assistant_command: String,
    script_dir: PathBuf,
}

impl UnixScriptStrategy {
    pub fn new(assistant_command: impl Into<String>) -> Self {
        Self { assistant_command: assistant_command.into(), script_dir: std::env::temp_dir() }
    }

    pub fn with_script_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.script_dir = dir.into();
        self
    }

    pub fn script(&self, job: &Job, workdir: &Path) -> String {
        let eof = heredoc_delimiter(job);
        format!(
            "#!/bin/bash\n\
             \n\
             # Job: {id}\n\
             # Project: {project}\n\
             # Task stream: {stream}\n\
             \n\
             cd {workdir} || exit 1\n\
             \n\
             {command} <<'{eof}'\n\
             {description}\n\
             {eof}\n\
             \n\
             exit $?\n",
            id = job.id,
            project = single_line(&job.project),
            stream = job.task_stream,
            workdir = sh_quote(&workdir.display().to_string()),
            command = self.assistant_command,
            description = job.description,
        )
    }
}

#[async_trait]
impl ExecutionStrategy for UnixScriptStrategy {
    async fn prepare(&self, job: &Job, workdir: &Path) -> Result<PreparedRun, ExecutionError> {
        let path = self.script_dir.join(format!("bt_job_{}.sh", job.id));
        let script_err = |source| ExecutionError::Script { path: path.clone(), source };

        tokio::fs::write(&path, self.script(job, workdir)).await.map_err(script_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o700))
                .await
                .map_err(script_err)?;
        }
        tracing::info!(job_id = %job.id, path = %path.display(), "created bash script");

        Ok(PreparedRun {
            program: "/bin/bash".to_string(),
            args: vec![path.display().to_string()],
            workdir: workdir.to_path_buf(),
            artifact: Some(path),
        })
    }
}

/// Runs the assistant through a generated PowerShell script.
pub struct WindowsScriptStrategy {
    assistant_command: String,
    script_dir: PathBuf,
}

impl WindowsScriptStrategy {
    pub fn new(assistant_command: impl Into<String>) -> Self {
        Self { assistant_command: assistant_command.into(), script_dir: std::env::temp_dir() }
    }

    pub fn with_script_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.script_dir = dir.into();
        self
    }

    pub fn script(&self, job: &Job, workdir: &Path) -> String {
        format!(
            "# Job: {id}\r\n\
             # Project: {project}\r\n\
             # Task stream: {stream}\r\n\
             \r\n\
             Set-Location -LiteralPath {workdir}\r\n\
             \r\n\
             $description = @'\r\n\
             {description}\r\n\
             '@\r\n\
             \r\n\
             $description | {command}\r\n\
             \r\n\
             exit $LASTEXITCODE\r\n",
            id = job.id,
            project = single_line(&job.project),
            stream = job.task_stream,
            workdir = ps_quote(&workdir.display().to_string()),
            description = here_string_body(&job.description),
            command = self.assistant_command,
        )
    }
}

#[async_trait]
impl ExecutionStrategy for WindowsScriptStrategy {
    async fn prepare(&self, job: &Job, workdir: &Path) -> Result<PreparedRun, ExecutionError> {
        let path = self.script_dir.join(format!("bt_job_{}.ps1", job.id));
        tokio::fs::write(&path, self.script(job, workdir))
            .await
            .map_err(|source| ExecutionError::Script { path: path.clone(), source })?;
        tracing::info!(job_id = %job.id, path = %path.display(), "created PowerShell script");

        Ok(PreparedRun {
            program: "powershell".to_string(),
            args: vec![
                "-NoProfile".to_string(),
                "-ExecutionPolicy".to_string(),
                "Bypass".to_string(),
                "-File".to_string(),
                path.display().to_string(),
            ],
            workdir: workdir.to_path_buf(),
            artifact: Some(path),
        })
    }
}

/// Strategy for the platform this process runs on.
pub fn strategy_for_host(assistant_command: &str) -> Arc<dyn ExecutionStrategy> {
    if cfg!(windows) {
        Arc::new(WindowsScriptStrategy::new(assistant_command))
    } else {
        Arc::new(UnixScriptStrategy::new(assistant_command))
    }
}

/// Heredoc terminator unique to the job, so no description line can end it.
fn heredoc_delimiter(job: &Job) -> String {
    format!("TASK_INPUT_EOF_{}", job.id.suffix().replace('-', "_"))
}

/// Single-quote for POSIX shells.
fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Single-quote for PowerShell.
fn ps_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// A line starting with `'@` would close a PowerShell here-string early.
fn here_string_body(s: &str) -> String {
    s.lines()
        .map(|line| if line.starts_with("'@") { format!(" {line}") } else { line.to_string() })
        .collect::<Vec<_>>()
        .join("\r\n")
}

fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

#[cfg(test)]
#[path = "execution_tests.rs"]
mod tests;
