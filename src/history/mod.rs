//! Per-session history of generated audio.

mod session;

pub use session::{ArtifactStatus, HistoryEntry, Playback, SessionHistory, TIMESTAMP_FORMAT};
