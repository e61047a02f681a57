//! Job execution specs
//!
//! Submitted jobs run in a per-stream worktree and end Completed or Failed.

use crate::prelude::*;

fn submit(worker: &Worker, project: &str, task_stream: &str, description: &str) -> String {
    let job = worker
        .bt()
        .args(&["submit", project, task_stream, description, "-o", "json"])
        .passes()
        .json();
    job["id"].as_str().unwrap().to_string()
}

#[test]
fn job_completes_in_new_worktree() {
    let worker = Worker::new();
    let repo = worker.repo("webapp");
    worker.start();

    let id = submit(&worker, "webapp", "feature/login", "add a login page");
    assert!(id.starts_with("job-"), "id: {id}");
    assert!(worker.wait_for_status(&id, "completed"), "log:\n{}", worker.daemon_log());

    let job = worker.bt().args(&["job", "show", &id, "-o", "json"]).passes().json();
    assert!(job["result"].as_str().unwrap().contains("add a login page"));
    assert_eq!(job["archived"], true);

    let tree = worker.worktree("webapp", "feature/login");
    assert!(tree.join("README.md").exists(), "worktree checked out at {}", tree.display());
    assert!(tree.join("TASK_NOTES.md").exists());

    let branch = std::process::Command::new("git")
        .args(["rev-parse", "--verify", "--quiet", "refs/heads/feature/login"])
        .current_dir(&repo)
        .status()
        .unwrap();
    assert!(branch.success(), "task stream branch should exist in the source repo");
}

#[test]
fn second_job_reuses_the_workspace() {
    let worker = Worker::new();
    worker.repo("webapp");
    worker.start();

    let first = submit(&worker, "webapp", "fix", "first pass");
    assert!(worker.wait_for_status(&first, "completed"));
    assert!(worker.wait_for_release("webapp", "fix"));
    let second = submit(&worker, "webapp", "fix", "second pass");
    assert!(worker.wait_for_status(&second, "completed"));
    assert!(worker.wait_for_release("webapp", "fix"));

    let list = worker.bt().args(&["workspace", "list", "-o", "json"]).passes().json();
    assert_eq!(list[0]["use_count"], 2);

    let notes = std::fs::read_to_string(worker.worktree("webapp", "fix").join("TASK_NOTES.md"))
        .unwrap();
    assert!(notes.contains(&first) && notes.contains(&second), "notes:\n{notes}");
}

#[test]
fn failing_assistant_marks_job_failed_and_frees_workspace() {
    let worker = Worker::with_assistant("echo broken >&2; exit 3");
    worker.repo("webapp");
    worker.start();

    let id = submit(&worker, "webapp", "fix", "will fail");
    assert!(worker.wait_for_status(&id, "failed"));

    let job = worker.bt().args(&["job", "show", &id, "-o", "json"]).passes().json();
    assert!(!job["error"].as_str().unwrap_or_default().is_empty());

    assert!(worker.wait_for_release("webapp", "fix"));
}

#[test]
fn busy_task_stream_is_a_conflict() {
    let worker = Worker::with_assistant("sleep 5; cat");
    worker.repo("webapp");
    worker.start();

    let id = submit(&worker, "webapp", "fix", "slow");
    assert!(worker.wait_for_status(&id, "running"));

    worker.bt().args(&["submit", "webapp", "fix", "again"]).fails().code(3);
    // Other streams proceed independently
    submit(&worker, "webapp", "docs", "parallel");

    let active = worker.bt().args(&["job", "list", "-o", "json"]).passes().json();
    assert!(active.as_array().unwrap().iter().any(|j| j["id"] == id.as_str()));
}

#[test]
fn unknown_project_is_rejected() {
    let worker = Worker::new();
    worker.start();
    worker.bt().args(&["submit", "ghost", "fix", "work"]).fails().code(1).stderr_has("ghost");
}

#[test]
fn history_lists_finished_jobs_newest_first() {
    let worker = Worker::new();
    worker.repo("webapp");
    worker.start();

    let first = submit(&worker, "webapp", "a", "one");
    assert!(worker.wait_for_status(&first, "completed"));
    let second = submit(&worker, "webapp", "b", "two");
    assert!(worker.wait_for_status(&second, "completed"));

    let history = worker.bt().args(&["job", "history", "-o", "json"]).passes().json();
    let ids: Vec<&str> = history.as_array().unwrap().iter().filter_map(|j| j["id"].as_str()).collect();
    assert_eq!(ids, vec![second.as_str(), first.as_str()]);

    worker.bt().args(&["job", "history"]).passes().stdout_has("completed");
}
