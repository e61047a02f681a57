//! Daemon lifecycle specs

use crate::prelude::*;

#[test]
fn start_status_stop() {
    let worker = Worker::new();
    worker.start();

    worker
        .bt()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("running")
        .stdout_has(env!("CARGO_PKG_VERSION"));
    assert!(worker.state_dir().join("daemon.sock").exists());
    assert!(worker.state_dir().join("daemon.pid").exists());

    worker.bt().args(&["daemon", "stop"]).passes().stdout_has("Daemon stopped");
    assert!(!worker.state_dir().join("daemon.sock").exists());
    assert!(!worker.state_dir().join("daemon.pid").exists());
    worker.bt().args(&["daemon", "status"]).passes().stdout_has("Daemon not running");
}

#[test]
fn second_start_reports_already_running() {
    let worker = Worker::new();
    worker.start();
    worker.bt().args(&["daemon", "start"]).passes().stdout_has("already running");
}

#[test]
fn status_json_counts_jobs_and_workspaces() {
    let worker = Worker::new();
    worker.start();
    let status = worker.bt().args(&["daemon", "status", "-o", "json"]).passes().json();
    assert_eq!(status["status"], "running");
    assert_eq!(status["jobs_active"], 0);
    assert_eq!(status["workspaces_held"], 0);
}

#[test]
fn daemon_writes_log_file() {
    let worker = Worker::new();
    worker.start();
    let logged = wait_for(SPEC_WAIT_MAX_MS, || worker.daemon_log().contains("loaded workspaces"));
    assert!(logged, "daemon log:\n{}", worker.daemon_log());
}
