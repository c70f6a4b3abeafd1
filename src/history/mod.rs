use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::output::ResultSummary;
use crate::scan::ScanConfiguration;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history entry {index} does not exist (history has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("failed to write history file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize history: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}

/// One recorded scan attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    #[serde(default)]
    pub scan_type: String,
    pub params: ScanConfiguration,
    #[serde(default)]
    pub summary: Option<ResultSummary>,
}

impl HistoryEntry {
    pub fn new(
        scan_type: impl Into<String>,
        params: ScanConfiguration,
        summary: Option<ResultSummary>,
    ) -> Self {
        Self {
            timestamp: now_iso8601(),
            scan_type: scan_type.into(),
            params,
            summary,
        }
    }
}

fn now_iso8601() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Flat JSON list of past scans. Every operation rewrites the whole file and
/// there is no locking, so concurrent writers race (last one wins).
#[derive(Clone, Debug)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns all entries, oldest first. A missing or unparseable file reads
    /// as an empty history.
    pub fn list(&self) -> Vec<HistoryEntry> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "history unreadable, treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_slice::<Vec<HistoryEntry>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "history corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    pub fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let mut entries = self.list();
        entries.push(entry);
        self.save(&entries)
    }

    /// Fetches the entry at a 1-based index.
    pub fn get(&self, index: usize) -> Result<HistoryEntry, HistoryError> {
        let entries = self.list();
        let len = entries.len();
        checked_slot(index, len)
            .and_then(|i| entries.into_iter().nth(i))
            .ok_or(HistoryError::IndexOutOfRange { index, len })
    }

    /// Removes the entry at a 1-based index and returns it.
    pub fn delete_at(&self, index: usize) -> Result<HistoryEntry, HistoryError> {
        let mut entries = self.list();
        let len = entries.len();
        let slot = checked_slot(index, len).ok_or(HistoryError::IndexOutOfRange { index, len })?;
        let removed = entries.remove(slot);
        self.save(&entries)?;
        Ok(removed)
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        let body = serde_json::to_vec_pretty(entries)
            .map_err(|source| HistoryError::Serialize { source })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| HistoryError::Write {
                path: self.path.display().to_string(),
                source,
            })?;
        }
        std::fs::write(&self.path, body).map_err(|source| HistoryError::Write {
            path: self.path.display().to_string(),
            source,
        })?;
        debug!(path = %self.path.display(), entries = entries.len(), "history saved");
        Ok(())
    }
}

fn checked_slot(index: usize, len: usize) -> Option<usize> {
    if (1..=len).contains(&index) {
        Some(index - 1)
    } else {
        None
    }
}
