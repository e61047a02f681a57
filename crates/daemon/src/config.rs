// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker settings: `<state_dir>/config.toml` plus environment overrides.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// What startup does with jobs and workspaces left over from a previous run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Fail leftover jobs and release held workspaces
    #[default]
    Release,
    /// Log leftovers and leave them for an operator
    Manual,
}

bt_core::simple_display! {
    OrphanPolicy {
        Release => "release",
        Manual => "manual",
    }
}

impl FromStr for OrphanPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "release" => Ok(OrphanPolicy::Release),
            "manual" => Ok(OrphanPolicy::Manual),
            other => Err(format!("unknown orphan policy '{other}' (expected release or manual)")),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("invalid config {}: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("invalid {var}: {message}")]
    Env { var: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory holding project repositories
    pub workspace_root: PathBuf,
    /// Assistant CLI that receives the job description on stdin
    pub assistant_command: String,
    pub orphan_policy: OrphanPolicy,
    /// Default number of archived jobs returned by history queries
    pub history_limit: usize,
    pub git_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from("/workspace"),
            assistant_command: "claude".to_string(),
            orphan_policy: OrphanPolicy::Release,
            history_limit: 50,
            git_timeout_secs: 120,
        }
    }
}

impl Settings {
    /// Load the config file (missing file means defaults), then apply env overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut settings = Self::from_file(path)?;
        settings.apply_env()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(path, &text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read { path: path.to_path_buf(), source }),
        }
    }

    fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(root) = crate::env::workspace_root() {
            self.workspace_root = root;
        }
        if let Some(command) = crate::env::assistant_command() {
            self.assistant_command = command;
        }
        if let Some(policy) = crate::env::orphan_policy() {
            self.orphan_policy = policy
                .parse()
                .map_err(|message| ConfigError::Env { var: "BT_ORPHAN_POLICY", message })?;
        }
        Ok(())
    }

    pub fn git_timeout(&self) -> Duration {
        Duration::from_secs(self.git_timeout_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
