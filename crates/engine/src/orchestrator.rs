// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution orchestrator.
//!
//! Drives one job from workspace acquisition to its terminal status. The
//! workspace is released and the execution artifact disposed on every path
//! out of [`Orchestrator::run_acquired`].

use crate::allocator::{AllocatorError, WorkspaceAllocator};
use crate::execution::{ExecutionError, ExecutionStrategy, PreparedRun};
use crate::notes;
use crate::registry::JobRegistry;
use bt_core::{Clock, Job, JobId, JobStatus, NameError, Workspace, WorkspaceKey, WorkspaceStatus};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Time a cancelled process gets between SIGTERM and SIGKILL.
pub const CANCEL_GRACE: Duration = Duration::from_secs(5);

pub const CANCELLED_MESSAGE: &str = "cancelled";

/// How long output is still collected after the process exits.
pub const OUTPUT_DRAIN: Duration = Duration::from_secs(2);

/// Errors that reject the run without touching the job.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    InvalidKey(#[from] NameError),
    #[error("task stream '{}' of project '{}' is already in use", .0.task_stream, .0.project)]
    Conflict(WorkspaceKey),
}

/// Result of one orchestrated run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub success: bool,
    pub output: String,
    pub error: String,
}

impl RunOutcome {
    fn failed(error: impl Into<String>) -> Self {
        Self { success: false, output: String::new(), error: error.into() }
    }
}

enum Exit {
    Finished(ExitStatus),
    Cancelled,
}

struct Captured {
    exit: Exit,
    stdout: String,
    stderr: String,
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

pub struct Orchestrator<C: Clock> {
    registry: Arc<JobRegistry<C>>,
    allocator: Arc<WorkspaceAllocator<C>>,
    strategy: Arc<dyn ExecutionStrategy>,
    clock: C,
    cancel_grace: Duration,
}

impl<C: Clock> Orchestrator<C> {
    pub fn new(
        registry: Arc<JobRegistry<C>>,
        allocator: Arc<WorkspaceAllocator<C>>,
        strategy: Arc<dyn ExecutionStrategy>,
        clock: C,
    ) -> Self {
        Self { registry, allocator, strategy, clock, cancel_grace: CANCEL_GRACE }
    }

    pub fn with_cancel_grace(mut self, grace: Duration) -> Self {
        self.cancel_grace = grace;
        self
    }

    pub fn registry(&self) -> &Arc<JobRegistry<C>> {
        &self.registry
    }

    pub fn allocator(&self) -> &Arc<WorkspaceAllocator<C>> {
        &self.allocator
    }

    /// Acquire the job's workspace, then run it.
    ///
    /// Validation and conflict errors return `Err` and leave the job as it
    /// was. Any other failure ends the job `Failed`.
    pub async fn run(&self, job: &Job, cancel: CancellationToken) -> Result<RunOutcome, RunError> {
        let ws = match self.allocator.acquire(&job.project, &job.project_path, &job.task_stream).await
        {
            Ok(ws) => ws,
            Err(AllocatorError::InvalidKey(e)) => return Err(RunError::InvalidKey(e)),
            Err(AllocatorError::Conflict(key)) => return Err(RunError::Conflict(key)),
            Err(e) => {
                let message = format!("failed to prepare workspace: {e}");
                self.registry.append_log(&job.id, &format!("Exception: {message}"));
                self.finish(&job.id, JobStatus::Failed, None, Some(message.clone()), None);
                return Ok(RunOutcome::failed(message));
            }
        };
        Ok(self.run_acquired(job, ws, cancel).await)
    }

    /// Run a job in a workspace the caller already holds.
    pub async fn run_acquired(&self, job: &Job, ws: Workspace, cancel: CancellationToken) -> RunOutcome {
        let mut prepared = None;
        let outcome = self.drive(job, &ws, &cancel, &mut prepared).await;

        self.allocator.release(&ws.project, &ws.task_stream, WorkspaceStatus::Available).await;
        if let Some(run) = &prepared {
            self.strategy.dispose(run);
        }
        outcome
    }

    async fn drive(
        &self,
        job: &Job,
        ws: &Workspace,
        cancel: &CancellationToken,
        prepared: &mut Option<PreparedRun>,
    ) -> RunOutcome {
        let id = &job.id;
        self.registry.assign_workspace(id, ws.path.clone());

        if let Err(e) = notes::initialize(ws, self.clock.now()) {
            tracing::warn!(
                job_id = %id,
                path = %ws.path.display(),
                error = %e,
                "failed to initialize task notes"
            );
        }

        self.registry.update_status(id, JobStatus::Running, None, None);
        self.registry.append_log(
            id,
            &format!("Starting execution for project {} on task stream {}", job.project, job.task_stream),
        );

        let run = match self.strategy.prepare(job, &ws.path).await {
            Ok(run) => prepared.insert(run),
            Err(e) => return self.fail(id, ws, e.to_string()),
        };

        let captured = match self.execute(id, run, cancel).await {
            Ok(captured) => captured,
            Err(e) => return self.fail(id, ws, e.to_string()),
        };

        match captured.exit {
            Exit::Finished(status) if status.success() => {
                self.registry.append_log(id, "Job completed successfully");
                let output = captured.stdout;
                self.finish(id, JobStatus::Completed, Some(output.clone()), None, Some(ws));
                RunOutcome { success: true, output, error: captured.stderr }
            }
            Exit::Finished(status) => {
                let code = status.code().map_or_else(|| "signal".to_string(), |c| c.to_string());
                self.registry.append_log(id, &format!("Job failed with exit code {code}"));
                let error = if captured.stderr.trim().is_empty() {
                    format!("exited with status {code}")
                } else {
                    captured.stderr
                };
                self.finish(id, JobStatus::Failed, None, Some(error.clone()), Some(ws));
                RunOutcome { success: false, output: captured.stdout, error }
            }
            Exit::Cancelled => {
                self.registry.append_log(id, "Job cancelled");
                let error = CANCELLED_MESSAGE.to_string();
                self.finish(id, JobStatus::Failed, None, Some(error.clone()), Some(ws));
                RunOutcome { success: false, output: captured.stdout, error }
            }
        }
    }

    fn fail(&self, id: &JobId, ws: &Workspace, message: String) -> RunOutcome {
        tracing::error!(job_id = %id, error = %message, "job setup failed");
        self.registry.append_log(id, &format!("Exception: {message}"));
        self.finish(id, JobStatus::Failed, None, Some(message.clone()), Some(ws));
        RunOutcome::failed(message)
    }

    /// Record the terminal status, then append it to the task notes.
    fn finish(
        &self,
        id: &JobId,
        status: JobStatus,
        result: Option<String>,
        error: Option<String>,
        ws: Option<&Workspace>,
    ) {
        let Some(job) = self.registry.update_status(id, status, result, error) else {
            return;
        };
        tracing::info!(job_id = %id, %status, "job finished");
        if let Some(ws) = ws {
            if let Err(e) = notes::append_job(&ws.path, &job, self.clock.now()) {
                tracing::warn!(job_id = %id, path = %ws.path.display(), error = %e, "failed to update task notes");
            }
        }
    }

    /// Spawn the prepared command and stream its output into the job log.
    async fn execute(
        &self,
        id: &JobId,
        run: &PreparedRun,
        cancel: &CancellationToken,
    ) -> Result<Captured, ExecutionError> {
        let mut cmd = Command::new(&run.program);
        cmd.args(&run.args)
            .current_dir(&run.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        {
            cmd.process_group(0);
        }

        let mut child = cmd
            .spawn()
            .map_err(|source| ExecutionError::Spawn { program: run.program.clone(), source })?;
        tracing::info!(job_id = %id, program = %run.program, pid = ?child.id(), "started external process");

        let (tx, mut rx) = mpsc::channel(256);
        if let Some(out) = child.stdout.take() {
            tokio::spawn(forward_lines(out, Stream::Stdout, tx.clone()));
        }
        if let Some(err) = child.stderr.take() {
            tokio::spawn(forward_lines(err, Stream::Stderr, tx.clone()));
        }
        drop(tx);

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut cancelled = false;
        let mut output_open = true;
        let status = loop {
            tokio::select! {
                _ = cancel.cancelled(), if !cancelled => {
                    cancelled = true;
                    tracing::info!(job_id = %id, "cancelling external process");
                    self.terminate(&mut child).await;
                }
                status = child.wait() => break status,
                line = rx.recv(), if output_open => match line {
                    Some(line) => self.record(id, line, &mut stdout, &mut stderr),
                    None => output_open = false,
                },
            }
        }
        .map_err(|source| ExecutionError::Spawn { program: run.program.clone(), source })?;

        // Pipes may outlive the process when a descendant inherited them
        let deadline = tokio::time::Instant::now() + OUTPUT_DRAIN;
        while output_open {
            match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(line)) => self.record(id, line, &mut stdout, &mut stderr),
                Ok(None) => output_open = false,
                Err(_) => {
                    tracing::warn!(job_id = %id, "output still open after exit, giving up");
                    break;
                }
            }
        }

        let exit = if cancelled { Exit::Cancelled } else { Exit::Finished(status) };
        Ok(Captured { exit, stdout: join_lines(stdout), stderr: join_lines(stderr) })
    }

    fn record(
        &self,
        id: &JobId,
        (stream, line): (Stream, String),
        stdout: &mut Vec<String>,
        stderr: &mut Vec<String>,
    ) {
        match stream {
            Stream::Stdout => {
                tracing::info!(job_id = %id, "{}", line);
                self.registry.append_log(id, &line);
                stdout.push(line);
            }
            Stream::Stderr => {
                tracing::warn!(job_id = %id, "{}", line);
                self.registry.append_log(id, &format!("ERROR: {line}"));
                stderr.push(line);
            }
        }
    }

    /// SIGTERM the process group, then SIGKILL whatever is left after the
    /// grace period.
    async fn terminate(&self, child: &mut Child) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = child.id() {
                let group = Pid::from_raw(pid as i32);
                let _ = killpg(group, Signal::SIGTERM);
                let _ = tokio::time::timeout(self.cancel_grace, child.wait()).await;
                let _ = killpg(group, Signal::SIGKILL);
            }
        }
        let _ = child.kill().await;
    }
}

async fn forward_lines<R>(reader: R, stream: Stream, tx: mpsc::Sender<(Stream, String)>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf).trim_end_matches(['\n', '\r']).to_string();
                if tx.send((stream, line)).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "stopped reading process output");
                break;
            }
        }
    }
}

fn join_lines(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
