// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bt_core::FakeClock;
use std::fs::File;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    clock: FakeClock,
    registry: JobRegistry<FakeClock>,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let clock = FakeClock::new();
        let registry = Self::open(&dir, &clock);
        Self { dir, clock, registry }
    }

    fn open(dir: &TempDir, clock: &FakeClock) -> JobRegistry<FakeClock> {
        JobRegistry::load(&dir.path().join("active"), &dir.path().join("history"), clock.clone())
            .unwrap()
    }

    fn reopen(&self) -> JobRegistry<FakeClock> {
        Self::open(&self.dir, &self.clock)
    }

    fn active_file(&self, id: &JobId) -> PathBuf {
        self.dir.path().join("active").join(format!("{id}.json"))
    }

    fn history_file(&self, id: &JobId) -> PathBuf {
        self.dir.path().join("history").join(format!("{id}.json"))
    }

    fn create(&self) -> Job {
        self.registry.create("demo", Path::new("/workspace/demo"), "add logging", "feature/x")
    }
}

#[test]
fn create_persists_pending_job() {
    let f = Fixture::new();
    let job = f.create();

    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.created_at, f.clock.now());
    assert!(f.active_file(&job.id).is_file());
    assert_eq!(f.registry.get(&job.id), Some(job));
}

#[test]
fn running_stamps_started_at_once() {
    let f = Fixture::new();
    let job = f.create();

    f.clock.advance(Duration::from_secs(1));
    let running = f.registry.update_status(&job.id, JobStatus::Running, None, None).unwrap();
    let started = running.started_at;
    assert_eq!(started, Some(f.clock.now()));

    f.clock.advance(Duration::from_secs(1));
    f.registry.update_status(&job.id, JobStatus::WaitingForUserInput, None, None);
    f.registry.update_status(&job.id, JobStatus::Running, None, None);

    assert_eq!(f.registry.get(&job.id).unwrap().started_at, started);
}

#[test]
fn non_terminal_update_repersists_active_record() {
    let f = Fixture::new();
    let job = f.create();

    f.registry.update_status(&job.id, JobStatus::WaitingForUserInput, None, None);

    let reloaded = f.reopen();
    assert_eq!(reloaded.get(&job.id).unwrap().status, JobStatus::WaitingForUserInput);
}

#[test]
fn terminal_update_moves_job_to_history() {
    let f = Fixture::new();
    let job = f.create();
    f.registry.update_status(&job.id, JobStatus::Running, None, None);

    let done = f
        .registry
        .update_status(&job.id, JobStatus::Completed, Some("all good".into()), None)
        .unwrap();

    assert!(f.registry.get(&job.id).is_none());
    assert!(f.registry.list_active().is_empty());
    assert!(!f.active_file(&job.id).exists());
    assert!(f.history_file(&job.id).is_file());

    let history = f.registry.list_history(10);
    assert_eq!(history, vec![done.clone()]);
    assert_eq!(history[0].result.as_deref(), Some("all good"));
    assert_eq!(f.registry.get_archived(&job.id), Some(done));
}

#[test]
fn updates_to_inactive_jobs_are_ignored() {
    let f = Fixture::new();
    let job = f.create();
    f.registry.update_status(&job.id, JobStatus::Failed, None, Some("boom".into()));

    assert!(f.registry.update_status(&job.id, JobStatus::Completed, None, None).is_none());
    f.registry.append_log(&job.id, "late line");
    f.registry.assign_workspace(&job.id, PathBuf::from("/late"));

    let archived = f.registry.get_archived(&job.id).unwrap();
    assert_eq!(archived.status, JobStatus::Failed);
    assert!(archived.logs.is_empty());
    assert!(archived.workspace_path.is_none());
}

#[test]
fn append_log_and_assign_workspace_persist() {
    let f = Fixture::new();
    let job = f.create();

    f.registry.assign_workspace(&job.id, PathBuf::from("/workspace/.worktrees/demo/feature/x"));
    f.registry.append_log(&job.id, "first");
    f.clock.advance(Duration::from_secs(2));
    f.registry.append_log(&job.id, "second");

    let reloaded = f.reopen().get(&job.id).unwrap();
    assert_eq!(
        reloaded.logs,
        vec!["[2026-01-01 00:00:00] first".to_string(), "[2026-01-01 00:00:02] second".to_string()]
    );
    assert_eq!(
        reloaded.workspace_path.as_deref(),
        Some(Path::new("/workspace/.worktrees/demo/feature/x"))
    );
}

#[test]
fn reload_restores_active_jobs_as_is() {
    let f = Fixture::new();
    let pending = f.create();
    f.clock.advance(Duration::from_secs(1));
    let running = f.create();
    f.registry.update_status(&running.id, JobStatus::Running, None, None);
    let running = f.registry.get(&running.id).unwrap();

    let reloaded = f.reopen();

    assert_eq!(reloaded.list_active(), vec![pending, running]);
}

#[test]
fn reload_archives_terminal_records_left_in_active_store() {
    let f = Fixture::new();
    let mut job = Job::builder().build();
    job.transition(JobStatus::Completed, Some("ok".into()), None, f.clock.now());
    std::fs::write(f.active_file(&job.id), serde_json::to_vec(&job).unwrap()).unwrap();

    let reloaded = f.reopen();

    assert!(reloaded.get(&job.id).is_none());
    assert!(!f.active_file(&job.id).exists());
    assert_eq!(reloaded.get_archived(&job.id), Some(job));
}

#[test]
fn reload_skips_corrupt_active_records() {
    let f = Fixture::new();
    let job = f.create();
    std::fs::write(f.dir.path().join("active/job-corrupt.json"), "{").unwrap();

    assert_eq!(f.reopen().list_active(), vec![job]);
}

#[test]
fn history_is_newest_first_limited_and_skips_corrupt() {
    let f = Fixture::new();
    let mut ids = Vec::new();
    for i in 0..3u64 {
        let job = f.create();
        f.registry.update_status(&job.id, JobStatus::Completed, Some(format!("r{i}")), None);
        let file = File::options().write(true).open(f.history_file(&job.id)).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(1_000 + i)).unwrap();
        ids.push(job.id);
    }
    let corrupt = f.dir.path().join("history/job-corrupt.json");
    std::fs::write(&corrupt, "not json").unwrap();
    File::options()
        .write(true)
        .open(&corrupt)
        .unwrap()
        .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(5_000))
        .unwrap();

    let history: Vec<_> = f.registry.list_history(2).into_iter().map(|j| j.id).collect();
    assert_eq!(history, vec![ids[2].clone(), ids[1].clone()]);

    assert_eq!(f.registry.list_history(10).len(), 3);
}

#[test]
fn terminal_record_matches_history_record() {
    let f = Fixture::new();
    let job = f.create();
    f.registry.update_status(&job.id, JobStatus::Running, None, None);
    f.registry.append_log(&job.id, "working");
    let failed = f
        .registry
        .update_status(&job.id, JobStatus::Failed, None, Some("exit 1".into()))
        .unwrap();

    let archived = f.registry.list_history(1).remove(0);
    assert_eq!(archived, failed);
    assert_eq!(archived.error.as_deref(), Some("exit 1"));
    assert!(archived.completed_at.is_some());
}
