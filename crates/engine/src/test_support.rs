// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scratch git repositories and engine fixtures for tests.

use crate::{AllocatorConfig, ExecutionStrategy, JobRegistry, Orchestrator, WorkspaceAllocator};
use bt_core::FakeClock;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// A temporary directory holding a workspace root with git projects in it.
pub(crate) struct TestRoot {
    pub dir: TempDir,
}

impl TestRoot {
    pub fn new() -> Self {
        Self { dir: TempDir::new().unwrap() }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `git init` a project with one commit on `main`.
    pub fn project(&self, name: &str) -> PathBuf {
        let path = self.path().join(name);
        std::fs::create_dir_all(&path).unwrap();
        run_git(&path, &["init", "--quiet", "--initial-branch=main"]);
        std::fs::write(path.join("README.md"), format!("# {name}\n")).unwrap();
        run_git(&path, &["add", "README.md"]);
        run_git(&path, &["commit", "--quiet", "-m", "initial"]);
        path
    }
}

pub(crate) fn run_git(repo: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(["-c", "user.name=bt", "-c", "user.email=bt@localhost", "-c", "commit.gpgsign=false"])
        .args(args)
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Runs a fixed `sh -c` script and drops a marker file as its artifact.
pub(crate) struct ShellStrategy {
    pub script: String,
    pub artifact_dir: PathBuf,
    pub fail_prepare: bool,
}

impl ShellStrategy {
    pub fn new(script: &str, artifact_dir: &Path) -> Self {
        Self { script: script.to_string(), artifact_dir: artifact_dir.to_path_buf(), fail_prepare: false }
    }

    pub fn artifact_for(&self, job: &bt_core::Job) -> PathBuf {
        self.artifact_dir.join(format!("{}.marker", job.id))
    }
}

#[async_trait::async_trait]
impl crate::ExecutionStrategy for ShellStrategy {
    async fn prepare(
        &self,
        job: &bt_core::Job,
        workdir: &Path,
    ) -> Result<crate::PreparedRun, crate::ExecutionError> {
        let artifact = self.artifact_for(job);
        if self.fail_prepare {
            return Err(crate::ExecutionError::Script {
                path: artifact,
                source: std::io::Error::other("disk full"),
            });
        }
        std::fs::write(&artifact, "").unwrap();
        Ok(crate::PreparedRun {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), self.script.clone()],
            workdir: workdir.to_path_buf(),
            artifact: Some(artifact),
        })
    }
}

/// Registry and allocator over a scratch workspace root.
pub(crate) struct Harness {
    pub root: TestRoot,
    pub clock: FakeClock,
    pub registry: Arc<JobRegistry<FakeClock>>,
    pub allocator: Arc<WorkspaceAllocator<FakeClock>>,
}

impl Harness {
    pub fn new() -> Self {
        let root = TestRoot::new();
        let clock = FakeClock::new();
        let state = root.path().join(".state");
        let registry = JobRegistry::load(
            &state.join("jobs/active"),
            &state.join("jobs/history"),
            clock.clone(),
        )
        .unwrap();
        let allocator =
            WorkspaceAllocator::load(AllocatorConfig::under(root.path()), clock.clone()).unwrap();
        Self { root, clock, registry: Arc::new(registry), allocator: Arc::new(allocator) }
    }

    pub fn orchestrator(&self, strategy: Arc<dyn ExecutionStrategy>) -> Orchestrator<FakeClock> {
        Orchestrator::new(self.registry.clone(), self.allocator.clone(), strategy, self.clock.clone())
            .with_cancel_grace(Duration::from_millis(500))
    }

    pub fn shell(&self, script: &str) -> ShellStrategy {
        ShellStrategy::new(script, self.root.path())
    }
}
