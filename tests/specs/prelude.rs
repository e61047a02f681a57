// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the specs.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

/// Upper bound for any polling wait in a spec
pub const SPEC_WAIT_MAX_MS: u64 = 15_000;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Poll `check` until it returns true or `max_ms` elapses.
pub fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    loop {
        if check() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// `bt` without any worker environment, for help/usage specs.
pub fn cli() -> CliBuilder {
    CliBuilder::new(assert_cmd::cargo::cargo_bin("bt"))
}

/// Isolated worker: its own state directory, workspace root and assistant.
pub struct Worker {
    dir: tempfile::TempDir,
    assistant: String,
}

impl Worker {
    /// Worker whose assistant echoes the job description back.
    pub fn new() -> Self {
        Self::with_assistant("cat")
    }

    pub fn with_assistant(assistant: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("state")).unwrap();
        std::fs::create_dir_all(dir.path().join("workspace")).unwrap();
        Self { dir, assistant: assistant.to_string() }
    }

    pub fn state_dir(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    pub fn workspace_root(&self) -> PathBuf {
        self.dir.path().join("workspace")
    }

    pub fn worktree(&self, project: &str, task_stream: &str) -> PathBuf {
        self.workspace_root().join(".worktrees").join(project).join(task_stream)
    }

    /// Create a git repository with one commit under the workspace root.
    pub fn repo(&self, name: &str) -> PathBuf {
        let path = self.workspace_root().join(name);
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join("README.md"), format!("# {name}\n")).unwrap();
        git(&path, &["init", "-q", "-b", "main"]);
        git(&path, &["add", "."]);
        git(&path, &["commit", "-q", "-m", "initial"]);
        path
    }

    pub fn bt(&self) -> CliBuilder {
        let mut builder = cli();
        builder.envs = vec![
            ("BT_STATE_DIR".into(), self.state_dir().display().to_string()),
            ("BT_WORKSPACE_ROOT".into(), self.workspace_root().display().to_string()),
            ("BT_ASSISTANT_COMMAND".into(), self.assistant.clone()),
            ("BT_DRAIN_TIMEOUT_MS".into(), "2000".into()),
            ("BT_LOG".into(), "debug".into()),
        ];
        builder
    }

    pub fn start(&self) {
        self.bt().args(&["daemon", "start"]).passes().stdout_has("Daemon started");
    }

    /// SIGKILL the daemon, leaving its state files behind.
    pub fn daemon_kill(&self) -> bool {
        let Ok(pid) = std::fs::read_to_string(self.state_dir().join("daemon.pid")) else {
            return false;
        };
        let status = Command::new("kill").args(["-9", pid.trim()]).status();
        matches!(status, Ok(s) if s.success())
    }

    /// Poll `bt job show <id> -o json` until the job reaches `status`.
    pub fn wait_for_status(&self, id: &str, status: &str) -> bool {
        wait_for(SPEC_WAIT_MAX_MS, || {
            let out = self.bt().args(&["job", "show", id, "-o", "json"]).run();
            out.success && out.json()["status"] == status
        })
    }

    /// Poll until the workspace for `project/task_stream` is available.
    pub fn wait_for_release(&self, project: &str, task_stream: &str) -> bool {
        wait_for(SPEC_WAIT_MAX_MS, || {
            let list = self.bt().args(&["workspace", "list", "-o", "json"]).run().json();
            list.as_array().is_some_and(|items| {
                items.iter().any(|w| {
                    w["project"] == project
                        && w["task_stream"] == task_stream
                        && w["status"] == "available"
                })
            })
        })
    }

    pub fn daemon_log(&self) -> String {
        std::fs::read_to_string(self.state_dir().join("daemon.log")).unwrap_or_default()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        let _ = self.bt().args(&["daemon", "stop"]).run();
        self.daemon_kill();
    }
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "spec")
        .env("GIT_AUTHOR_EMAIL", "spec@example.com")
        .env("GIT_COMMITTER_NAME", "spec")
        .env("GIT_COMMITTER_EMAIL", "spec@example.com")
        .status()
        .unwrap();
    assert!(status.success(), "git {args:?} failed");
}

pub struct CliBuilder {
    bin: PathBuf,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new(bin: PathBuf) -> Self {
        Self { bin, args: Vec::new(), envs: Vec::new() }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn run(self) -> RunAssert {
        let output = Command::new(&self.bin)
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .env("NO_COLOR", "1")
            .env_remove("COLOR")
            .output()
            .unwrap();
        RunAssert {
            args: self.args,
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    #[track_caller]
    pub fn passes(self) -> RunAssert {
        let run = self.run();
        assert!(
            run.success,
            "bt {:?} failed ({:?})\nstdout:\n{}\nstderr:\n{}",
            run.args, run.code, run.stdout, run.stderr
        );
        run
    }

    #[track_caller]
    pub fn fails(self) -> RunAssert {
        let run = self.run();
        assert!(!run.success, "bt {:?} unexpectedly passed\nstdout:\n{}", run.args, run.stdout);
        run
    }
}

pub struct RunAssert {
    args: Vec<String>,
    pub success: bool,
    pub code: Option<i32>,
    stdout: String,
    stderr: String,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        self.stdout.clone()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).unwrap_or(serde_json::Value::Null)
    }

    #[track_caller]
    pub fn code(self, expected: i32) -> Self {
        assert_eq!(self.code, Some(expected), "bt {:?}\nstderr:\n{}", self.args, self.stderr);
        self
    }

    /// Exact stdout comparison with a line diff on mismatch.
    #[track_caller]
    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout, expected, "bt {:?}", self.args);
        self
    }

    #[track_caller]
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout missing {needle:?}:\n{}", self.stdout);
        self
    }

    #[track_caller]
    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr missing {needle:?}:\n{}", self.stderr);
        self
    }
}
