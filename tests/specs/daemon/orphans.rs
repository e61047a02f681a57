//! Orphan reconciliation specs
//!
//! A daemon killed mid-job leaves an active job and a held workspace behind;
//! the next start fails the job and frees the workspace.

use crate::prelude::*;

#[test]
fn restart_after_crash_fails_interrupted_job() {
    let worker = Worker::with_assistant("sleep 5; cat");
    worker.repo("webapp");
    worker.start();

    let job = worker.bt().args(&["submit", "webapp", "fix", "interrupted", "-o", "json"]).passes().json();
    let id = job["id"].as_str().unwrap().to_string();
    assert!(worker.wait_for_status(&id, "running"));

    assert!(worker.daemon_kill(), "daemon should be killable");
    let gone = wait_for(SPEC_WAIT_MAX_MS, || {
        worker.bt().args(&["daemon", "status"]).run().stdout().contains("not running")
    });
    assert!(gone);

    worker.start();
    let job = worker.bt().args(&["job", "show", &id, "-o", "json"]).passes().json();
    assert_eq!(job["status"], "failed");
    assert_eq!(job["error"], "interrupted: worker restarted");
    assert_eq!(job["archived"], true);

    let list = worker.bt().args(&["workspace", "list", "-o", "json"]).passes().json();
    assert_eq!(list[0]["status"], "available");

    // The stream is usable again
    worker.bt().args(&["submit", "webapp", "fix", "retry"]).passes();
}
