//! Working directory for generated audio artifacts.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when touching audio artifacts.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Audio file not found (it may have been cleaned): {0}")]
    ArtifactMissing(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Owns the flat directory that synthesized audio files are written into.
#[derive(Debug, Clone)]
pub struct AudioStore {
    audio_dir: PathBuf,
}

impl AudioStore {
    /// Create a store rooted at `audio_dir`. Nothing is created on disk yet.
    pub fn new(audio_dir: PathBuf) -> Self {
        Self { audio_dir }
    }

    /// Get the working directory path.
    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    /// Create the working directory if it does not exist.
    pub fn ensure_dir(&self) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.audio_dir)?;
        Ok(())
    }

    /// Path for a new artifact: `<audio_dir>/<random token>.<extension>`.
    pub fn new_artifact_path(&self, extension: &str) -> PathBuf {
        let token = Uuid::new_v4().simple().to_string();
        self.audio_dir.join(format!("{token}.{extension}"))
    }

    /// Read an artifact's bytes.
    ///
    /// Returns [`StorageError::ArtifactMissing`] if the file was removed
    /// after its path was recorded.
    pub fn read_artifact(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        std::fs::read(path).map_err(|e| missing_or_io(path, e))
    }

    /// Copy an artifact to `destination`, returning the number of bytes copied.
    pub fn export_artifact(&self, path: &Path, destination: &Path) -> Result<u64, StorageError> {
        if !path.is_file() {
            return Err(StorageError::ArtifactMissing(path.to_path_buf()));
        }

        std::fs::copy(path, destination).map_err(|e| missing_or_io(path, e))
    }

    /// Remove an artifact, ignoring files that are already gone.
    pub fn discard(&self, path: &Path) {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "Discarded partial artifact"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Could not discard artifact"),
        }
    }
}

/// Duration in seconds of a WAV file, or `None` if it is not readable as WAV.
pub fn wav_duration(path: &Path) -> Option<f32> {
    let reader = hound::WavReader::open(path).ok()?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }
    Some(reader.duration() as f32 / spec.sample_rate as f32)
}

fn missing_or_io(path: &Path, error: std::io::Error) -> StorageError {
    if error.kind() == ErrorKind::NotFound {
        StorageError::ArtifactMissing(path.to_path_buf())
    } else {
        StorageError::IoError(error)
    }
}
