//! Local validation specs
//!
//! Bad input is rejected with exit code 2 before any daemon is contacted.

use crate::prelude::*;

#[test]
fn invalid_task_stream_exits_two_without_daemon() {
    let worker = Worker::new();
    worker
        .bt()
        .args(&["submit", "webapp", "../escape", "do", "things"])
        .fails()
        .code(2)
        .stderr_has("..");
}

#[test]
fn lock_suffix_is_rejected() {
    let worker = Worker::new();
    worker.bt().args(&["submit", "webapp", "main.lock", "work"]).fails().code(2);
}

#[test]
fn names_that_would_leave_the_worktree_root_are_rejected() {
    let worker = Worker::new();
    for name in ["/tmp/escape", "fix/", "a//b"] {
        worker.bt().args(&["submit", "webapp", name, "work"]).fails().code(2);
        worker.bt().args(&["workspace", "remove", "webapp", name]).fails().code(2);
    }
}

#[test]
fn blank_description_exits_two() {
    let worker = Worker::new();
    worker.bt().args(&["submit", "webapp", "fix", " "]).fails().code(2).stderr_has("description");
}

#[test]
fn commands_without_daemon_report_not_running() {
    let worker = Worker::new();
    worker.bt().args(&["job", "list"]).fails().code(1).stderr_has("not running");
    worker.bt().args(&["daemon", "status"]).passes().stdout_eq("Daemon not running\n");
}
