//! Workspace management specs

use crate::prelude::*;

fn run_job(worker: &Worker, task_stream: &str) -> String {
    let job = worker
        .bt()
        .args(&["submit", "webapp", task_stream, "work", "-o", "json"])
        .passes()
        .json();
    job["id"].as_str().unwrap().to_string()
}

#[test]
fn list_shows_workspaces_per_project() {
    let worker = Worker::new();
    worker.repo("webapp");
    worker.repo("api");
    worker.start();

    let id = run_job(&worker, "fix");
    assert!(worker.wait_for_status(&id, "completed"));
    assert!(worker.wait_for_release("webapp", "fix"));

    worker
        .bt()
        .args(&["workspace", "list"])
        .passes()
        .stdout_has("webapp")
        .stdout_has("fix")
        .stdout_has("available");
    worker.bt().args(&["workspace", "list", "--project", "api"]).passes().stdout_has("No workspaces");
    worker.bt().args(&["project", "list"]).passes().stdout_has("api").stdout_has("webapp");
}

#[test]
fn held_workspace_cannot_be_removed_or_released() {
    let worker = Worker::with_assistant("sleep 30; cat");
    worker.repo("webapp");
    worker.start();

    let id = run_job(&worker, "fix");
    assert!(worker.wait_for_status(&id, "running"));

    worker.bt().args(&["workspace", "remove", "webapp", "fix"]).fails().code(3);
    worker
        .bt()
        .args(&["workspace", "release", "webapp", "fix"])
        .fails()
        .code(3)
        .stderr_has("cancel it first");

    worker.bt().args(&["job", "cancel", &id]).passes();
    assert!(worker.wait_for_status(&id, "failed"));
}

#[test]
fn available_workspace_is_removed_with_its_tree() {
    let worker = Worker::new();
    worker.repo("webapp");
    worker.start();

    let id = run_job(&worker, "fix");
    assert!(worker.wait_for_status(&id, "completed"));
    let tree = worker.worktree("webapp", "fix");
    assert!(worker.wait_for_release("webapp", "fix"));

    worker
        .bt()
        .args(&["workspace", "remove", "webapp", "fix"])
        .passes()
        .stdout_eq("Removed workspace webapp/fix\n");
    assert!(!tree.exists());
    worker
        .bt()
        .args(&["workspace", "remove", "webapp", "fix"])
        .passes()
        .stdout_eq("No workspace webapp/fix\n");
}

#[test]
fn workspace_names_are_validated_locally() {
    let worker = Worker::new();
    worker.bt().args(&["workspace", "release", "webapp", "bad..name"]).fails().code(2);
}
