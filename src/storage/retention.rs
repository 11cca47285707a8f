//! Age-based cleanup of generated audio.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::Serialize;

/// Default retention window in minutes.
pub const DEFAULT_MAX_AGE_MINUTES: u64 = 30;

/// A file the cleanup pass could not inspect or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Regular files examined.
    pub scanned: usize,
    pub deleted: Vec<PathBuf>,
    pub failed: Vec<CleanupFailure>,
}

impl CleanupReport {
    /// True when nothing was deleted and nothing failed.
    pub fn is_noop(&self) -> bool {
        self.deleted.is_empty() && self.failed.is_empty()
    }
}

/// Deletes artifacts older than a fixed age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    max_age: Duration,
}

impl RetentionPolicy {
    pub fn new(max_age_minutes: u64) -> Self {
        Self {
            max_age: Duration::from_secs(max_age_minutes.saturating_mul(60)),
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Delete every regular file directly inside `audio_dir` whose age exceeds
    /// the retention window.
    ///
    /// Best effort: a missing directory is a no-op and per-file failures are
    /// collected in the report instead of aborting the scan.
    pub fn clean_old_audio_files(&self, audio_dir: &Path) -> CleanupReport {
        self.clean_at(audio_dir, SystemTime::now())
    }

    /// Same as [`clean_old_audio_files`](Self::clean_old_audio_files) with an
    /// explicit clock.
    pub fn clean_at(&self, audio_dir: &Path, now: SystemTime) -> CleanupReport {
        self.sweep(audio_dir, now, |path| std::fs::remove_file(path))
    }

    pub(super) fn sweep<F>(&self, audio_dir: &Path, now: SystemTime, mut remove: F) -> CleanupReport
    where
        F: FnMut(&Path) -> std::io::Result<()>,
    {
        let mut report = CleanupReport::default();

        let entries = match std::fs::read_dir(audio_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return report,
            Err(e) => {
                record_failure(&mut report, audio_dir.to_path_buf(), e);
                return report;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    record_failure(&mut report, audio_dir.to_path_buf(), e);
                    continue;
                }
            };
            let path = entry.path();

            // DirEntry::metadata does not follow symlinks.
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    record_failure(&mut report, path, e);
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }
            report.scanned += 1;

            let modified = match metadata.modified() {
                Ok(modified) => modified,
                Err(e) => {
                    record_failure(&mut report, path, e);
                    continue;
                }
            };

            // Modification times in the future count as age zero.
            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            if age <= self.max_age {
                continue;
            }

            match remove(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), age_secs = age.as_secs(), "Deleted old audio file");
                    report.deleted.push(path);
                }
                // Vanished mid-scan; someone else already reclaimed it.
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => record_failure(&mut report, path, e),
            }
        }

        if !report.is_noop() {
            tracing::info!(
                dir = %audio_dir.display(),
                scanned = report.scanned,
                deleted = report.deleted.len(),
                failed = report.failed.len(),
                "Audio cleanup finished"
            );
        }

        report
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE_MINUTES)
    }
}

fn record_failure(report: &mut CleanupReport, path: PathBuf, error: std::io::Error) {
    tracing::warn!(path = %path.display(), error = %error, "Skipping audio file during cleanup");
    report.failed.push(CleanupFailure {
        path,
        reason: error.to_string(),
    });
}
