// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifiers.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// Unique identifier for a job.
///
/// `job-` followed by 19 random nanoid characters, so a fresh id is 23
/// bytes and stays inline in the `SmolStr`. Generated once at submission and
/// never reused; it names both the active record and the archived history
/// record on disk, and clients may refer to a job by any unique prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(SmolStr);

impl JobId {
    pub const PREFIX: &'static str = "job-";

    pub fn new() -> Self {
        Self(SmolStr::new(format!("{}{}", Self::PREFIX, nanoid::nanoid!(19))))
    }

    /// Wrap an id read from a request or a stored record. Not validated.
    pub fn from_string(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The random part, without `job-`. Ids stored without the prefix are
    /// returned whole.
    pub fn suffix(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lets `HashMap<JobId, _>` be queried with a plain `&str`.
impl std::borrow::Borrow<str> for JobId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
