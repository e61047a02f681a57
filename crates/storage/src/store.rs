// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One JSON document per key, one file per document.
//!
//! Writes go to a sibling `.tmp` file and are renamed into place, so a crash
//! mid-write leaves either the old or the new document. The store does no
//! locking of its own; callers serialize access.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

const EXTENSION: &str = "json";
const TMP_EXTENSION: &str = "json.tmp";

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid document key {0:?}")]
    InvalidKey(String),
}

/// A document present on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub key: String,
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// A directory of JSON documents.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    /// Open (creating if needed) the store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{EXTENSION}"))
    }

    /// Overwrite the document for `key`.
    pub fn write<T: Serialize>(&self, key: &str, doc: &T) -> Result<(), StoreError> {
        check_key(key)?;
        let path = self.path_for(key);
        let tmp_path = path.with_extension(TMP_EXTENSION);
        let json = serde_json::to_vec_pretty(doc)?;

        fs::create_dir_all(&self.dir)?;
        fs::write(&tmp_path, json)?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }

    /// Read the document for `key`, or `None` if absent.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        check_key(key)?;
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the document for `key`. Returns whether it existed.
    pub fn delete(&self, key: &str) -> Result<bool, StoreError> {
        check_key(key)?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Documents whose key starts with `prefix`, newest first by mtime.
    pub fn entries(&self, prefix: &str) -> Result<Vec<StoredEntry>, StoreError> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for dir_entry in read_dir.flatten() {
            let path = dir_entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !key.starts_with(prefix) {
                continue;
            }
            let modified = dir_entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            entries.push(StoredEntry { key: key.to_string(), path, modified });
        }

        entries.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.key.cmp(&b.key)));
        Ok(entries)
    }

    /// Deserialize a listed entry.
    pub fn read_entry<T: DeserializeOwned>(&self, entry: &StoredEntry) -> Result<T, StoreError> {
        let bytes = fs::read(&entry.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Every readable document, newest first.
    ///
    /// Unreadable or malformed documents are skipped with a warning.
    pub fn load_all<T: DeserializeOwned>(&self) -> Result<Vec<T>, StoreError> {
        let mut docs = Vec::new();
        for entry in self.entries("")? {
            match self.read_entry(&entry) {
                Ok(doc) => docs.push(doc),
                Err(e) => {
                    tracing::warn!(path = %entry.path.display(), error = %e, "skipping unreadable document");
                }
            }
        }
        Ok(docs)
    }
}

fn check_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
