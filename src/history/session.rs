//! Session history of synthesis results.

use std::collections::VecDeque;
use std::path::PathBuf;

use chrono::Local;
use serde::Serialize;

use crate::storage::{AudioStore, StorageError};
use crate::text::CleanText;

/// Format used for history timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One completed synthesis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub engine_label: String,
    pub text: CleanText,
    pub audio_path: PathBuf,
    pub language: Option<String>,
}

impl HistoryEntry {
    /// Create an entry stamped with the current local time.
    pub fn new(
        engine_label: impl Into<String>,
        text: CleanText,
        audio_path: PathBuf,
        language: Option<String>,
    ) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            engine_label: engine_label.into(),
            text,
            audio_path,
            language,
        }
    }
}

/// Whether an entry's audio can still be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStatus {
    Available(Vec<u8>),
    Missing,
}

/// An entry paired with its resolved audio.
#[derive(Debug, Clone)]
pub struct Playback<'a> {
    pub entry: &'a HistoryEntry,
    pub status: ArtifactStatus,
}

/// Most-recent-first log of one session's results.
///
/// Owned by the caller and threaded through each request.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct SessionHistory {
    entries: VecDeque<HistoryEntry>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry in front of all earlier ones.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load the audio of every entry, newest first.
    ///
    /// Entries whose file has been cleaned up come back as
    /// [`ArtifactStatus::Missing`]; the rest of the list still resolves.
    pub fn playback(&self, store: &AudioStore) -> Vec<Playback<'_>> {
        self.entries
            .iter()
            .map(|entry| {
                let status = match store.read_artifact(&entry.audio_path) {
                    Ok(bytes) => ArtifactStatus::Available(bytes),
                    Err(StorageError::ArtifactMissing(path)) => {
                        tracing::warn!(path = %path.display(), "Audio file not found (it may have been cleaned)");
                        ArtifactStatus::Missing
                    }
                    Err(e) => {
                        tracing::warn!(path = %entry.audio_path.display(), error = %e, "Audio file unreadable");
                        ArtifactStatus::Missing
                    }
                };
                Playback { entry, status }
            })
            .collect()
    }
}
