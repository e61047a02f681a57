// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task-stream name validation.
//!
//! A task-stream name doubles as a git branch name and as a path segment
//! under the worktree root, so it is checked before any side effect.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Longest accepted task-stream name, in characters.
pub const MAX_TASK_STREAM_LEN: usize = 100;

/// Anything outside ASCII letters, digits, Hangul syllables, `/`, `_`, `-`.
#[allow(clippy::expect_used)]
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9가-힣/_-]").expect("constant regex pattern is valid"));

/// Reason a task-stream name was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("task stream name is empty")]
    Empty,
    #[error("task stream name is {len} characters (max {MAX_TASK_STREAM_LEN})")]
    TooLong { len: usize },
    #[error("task stream name must not contain '..'")]
    DoubleDot,
    #[error("task stream name must not contain '@{{'")]
    ReflogSyntax,
    #[error("task stream name must not start with '.'")]
    LeadingDot,
    #[error("task stream name must not end with '.'")]
    TrailingDot,
    #[error("task stream name must not end with '.lock'")]
    LockSuffix,
    #[error("task stream name must not start with '/'")]
    LeadingSlash,
    #[error("task stream name must not end with '/'")]
    TrailingSlash,
    #[error("task stream name must not contain '//'")]
    EmptyComponent,
    #[error("task stream name contains invalid character {ch:?}")]
    InvalidCharacter { ch: char },
}

/// Validate a task-stream name.
pub fn validate_task_stream(name: &str) -> Result<(), NameError> {
    if name.trim().is_empty() {
        return Err(NameError::Empty);
    }

    let len = name.chars().count();
    if len > MAX_TASK_STREAM_LEN {
        return Err(NameError::TooLong { len });
    }

    if name.contains("..") {
        return Err(NameError::DoubleDot);
    }
    if name.contains("@{") {
        return Err(NameError::ReflogSyntax);
    }
    if name.starts_with('.') {
        return Err(NameError::LeadingDot);
    }
    if name.ends_with(".lock") {
        return Err(NameError::LockSuffix);
    }
    if name.ends_with('.') {
        return Err(NameError::TrailingDot);
    }
    if name.starts_with('/') {
        return Err(NameError::LeadingSlash);
    }
    if name.ends_with('/') {
        return Err(NameError::TrailingSlash);
    }
    if name.contains("//") {
        return Err(NameError::EmptyComponent);
    }

    if let Some(ch) = DISALLOWED.find(name).and_then(|m| m.as_str().chars().next()) {
        return Err(NameError::InvalidCharacter { ch });
    }

    Ok(())
}

#[cfg(test)]
#[path = "task_stream_tests.rs"]
mod tests;
