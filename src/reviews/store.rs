// src/reviews/store.rs
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Ids of every review already delivered, plus an advisory timestamp of the
/// last successful persistence. `last_run` is never consulted for dedup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenSet {
    pub review_ids: HashSet<String>,
    pub last_run: Option<DateTime<Utc>>,
}

impl SeenSet {
    pub fn contains(&self, id: &str) -> bool {
        self.review_ids.contains(id)
    }

    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.review_ids.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.review_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.review_ids.is_empty()
    }
}

/// File-backed seen set. One file per app id; no locking, the invoking
/// scheduler is assumed to guarantee non-overlapping runs.
pub struct SeenSetStore {
    path: PathBuf,
}

impl SeenSetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails the caller. A missing file is a fresh start; a corrupt or
    /// unreadable file is logged and treated the same, because delivery is
    /// at-least-once and re-notifying beats crashing the run.
    pub fn load(&self) -> SeenSet {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return SeenSet::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "error reading seen set, starting fresh");
                return SeenSet::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "corrupt seen set, starting fresh");
                SeenSet::default()
            }
        }
    }

    /// Write-temp-then-rename so a crash mid-write never leaves a half-written
    /// file for the next `load` to reject.
    pub fn save(&self, set: &SeenSet) -> Result<(), StoreError> {
        let json = serde_json::to_string(set)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), ids = set.len(), "seen set saved");
        Ok(())
    }
}
