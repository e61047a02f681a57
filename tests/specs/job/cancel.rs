//! Job cancellation specs

use crate::prelude::*;

#[test]
fn cancel_stops_running_job() {
    let worker = Worker::with_assistant("sleep 30; cat");
    worker.repo("webapp");
    worker.start();

    let job = worker.bt().args(&["submit", "webapp", "fix", "never finishes", "-o", "json"]).passes().json();
    let id = job["id"].as_str().unwrap().to_string();
    assert!(worker.wait_for_status(&id, "running"));

    worker.bt().args(&["job", "cancel", &id]).passes().stdout_has("Cancelling");
    assert!(worker.wait_for_status(&id, "failed"));

    let job = worker.bt().args(&["job", "show", &id, "-o", "json"]).passes().json();
    assert_eq!(job["error"], "cancelled");
}

#[test]
fn cancel_of_finished_job_is_a_conflict() {
    let worker = Worker::new();
    worker.repo("webapp");
    worker.start();

    let job = worker.bt().args(&["submit", "webapp", "fix", "quick", "-o", "json"]).passes().json();
    let id = job["id"].as_str().unwrap().to_string();
    assert!(worker.wait_for_status(&id, "completed"));

    worker.bt().args(&["job", "cancel", &id]).fails().code(3).stderr_has("already finished");
}

#[test]
fn cancel_of_unknown_job_fails() {
    let worker = Worker::new();
    worker.start();
    worker.bt().args(&["job", "cancel", "job-nope"]).fails().code(1).stderr_has("not found");
}
