// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Running notes kept inside each workspace.
//!
//! A markdown file at the worktree root records every job run on the task
//! stream so later jobs can pick up context. It is advisory: callers treat
//! failures here as warnings.

use bt_core::{format_utc, Job, JobStatus, Workspace};
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const NOTES_FILE: &str = "TASK_NOTES.md";

/// Longest result or error excerpt copied into the notes, in characters.
pub const MAX_EXCERPT_CHARS: usize = 2000;

const TRUNCATION_MARKER: &str = "\n... (truncated)";
const LAST_UPDATED: &str = "**Last Updated:**";

pub fn notes_path(workdir: &Path) -> PathBuf {
    workdir.join(NOTES_FILE)
}

/// Write the notes header unless the file already exists.
///
/// Returns whether a new file was created.
pub fn initialize(ws: &Workspace, now: DateTime<Utc>) -> io::Result<bool> {
    let path = notes_path(&ws.path);
    if path.exists() {
        return Ok(false);
    }

    let stamp = format_utc(now);
    let header = format!(
        "# Task Stream: {}\n\
         **Project:** {}\n\
         **Started:** {stamp}\n\
         {LAST_UPDATED} {stamp}\n\
         \n\
         ---\n\
         \n\
         ## Job History\n\
         \n",
        ws.task_stream, ws.project,
    );

    let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
    file.write_all(header.as_bytes())?;
    tracing::info!(path = %path.display(), "initialized task notes");
    Ok(true)
}

/// Append a section for a finished job and refresh the header timestamp.
///
/// A missing notes file is left missing.
pub fn append_job(workdir: &Path, job: &Job, now: DateTime<Utc>) -> io::Result<()> {
    let path = notes_path(workdir);
    if !path.exists() {
        tracing::warn!(path = %path.display(), job_id = %job.id, "task notes missing, skipping append");
        return Ok(());
    }

    let mut file = OpenOptions::new().append(true).open(&path)?;
    file.write_all(job_section(job, now).as_bytes())?;
    drop(file);

    touch_last_updated(&path, now)
}

fn job_section(job: &Job, now: DateTime<Utc>) -> String {
    let mut section = format!(
        "### Job: {} ({})\n**Status:** {}\n\n**Description:**\n```\n{}\n```\n\n",
        job.id,
        format_utc(now),
        job.status,
        job.description,
    );

    let excerpt = match job.status {
        JobStatus::Completed => job.result.as_deref().map(|r| ("Result", r)),
        JobStatus::Failed => job.error.as_deref().map(|e| ("Error", e)),
        _ => None,
    };
    if let Some((label, text)) = excerpt.filter(|(_, t)| !t.trim().is_empty()) {
        section.push_str(&format!("**{label}:**\n```\n{}\n```\n", truncate_excerpt(text)));
    }

    section.push_str("\n---\n\n");
    section
}

/// Cut `text` to [`MAX_EXCERPT_CHARS`] characters, marking the cut.
pub fn truncate_excerpt(text: &str) -> String {
    match text.char_indices().nth(MAX_EXCERPT_CHARS) {
        Some((idx, _)) => format!("{}{TRUNCATION_MARKER}", &text[..idx]),
        None => text.to_string(),
    }
}

fn touch_last_updated(path: &Path, now: DateTime<Utc>) -> io::Result<()> {
    let content = fs::read_to_string(path)?;
    let mut replaced = false;
    let updated: Vec<String> = content
        .split('\n')
        .map(|line| {
            if !replaced && line.starts_with(LAST_UPDATED) {
                replaced = true;
                format!("{LAST_UPDATED} {}", format_utc(now))
            } else {
                line.to_string()
            }
        })
        .collect();
    if replaced {
        fs::write(path, updated.join("\n"))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "notes_tests.rs"]
mod tests;
