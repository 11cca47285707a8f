//! Audio artifact storage and retention.
//!
//! Generated files live in a single flat working directory. The
//! [`RetentionPolicy`] reclaims old files opportunistically on each request,
//! and readers must tolerate a recorded path having disappeared in between.

mod retention;
mod store;

pub use retention::{CleanupFailure, CleanupReport, DEFAULT_MAX_AGE_MINUTES, RetentionPolicy};
pub use store::{AudioStore, StorageError, wav_duration};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::Path;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn write_file_aged(path: &Path, age: Duration) {
        std::fs::write(path, b"ID3 fake mp3").unwrap();
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    fn minutes(n: u64) -> Duration {
        Duration::from_secs(n * 60)
    }

    // ===========================================
    // RetentionPolicy tests
    // ===========================================

    #[test]
    fn test_retention_deletes_only_strictly_older_files() {
        let temp_dir = TempDir::new().unwrap();
        let old = temp_dir.path().join("old.mp3");
        let young = temp_dir.path().join("young.mp3");
        write_file_aged(&old, minutes(31));
        write_file_aged(&young, minutes(29));

        let report = RetentionPolicy::new(30).clean_old_audio_files(temp_dir.path());

        assert!(!old.exists());
        assert!(young.exists());
        assert_eq!(report.scanned, 2);
        assert_eq!(report.deleted, vec![old]);
        assert!(report.failed.is_empty());
    }

    #[test]
    fn test_retention_keeps_file_exactly_at_limit() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("edge.wav");
        std::fs::write(&path, b"RIFF").unwrap();
        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();

        let policy = RetentionPolicy::new(10);
        let report = policy.clean_at(temp_dir.path(), modified + minutes(10));
        assert!(report.deleted.is_empty());
        assert!(path.exists());

        let report = policy.clean_at(temp_dir.path(), modified + minutes(10) + Duration::from_secs(1));
        assert_eq!(report.deleted.len(), 1);
        assert!(!path.exists());
    }

    #[test]
    fn test_retention_missing_directory_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does-not-exist");

        let report = RetentionPolicy::default().clean_old_audio_files(&missing);

        assert_eq!(report, CleanupReport::default());
        assert!(!missing.exists());
    }

    #[test]
    fn test_retention_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        write_file_aged(&temp_dir.path().join("a.mp3"), minutes(120));
        write_file_aged(&temp_dir.path().join("b.mp3"), minutes(45));
        write_file_aged(&temp_dir.path().join("c.mp3"), minutes(5));
        let policy = RetentionPolicy::new(30);

        let first = policy.clean_old_audio_files(temp_dir.path());
        let remaining_after_first: HashSet<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        let second = policy.clean_old_audio_files(temp_dir.path());
        let remaining_after_second: HashSet<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();

        assert_eq!(first.deleted.len(), 2);
        assert!(second.is_noop());
        assert_eq!(remaining_after_first, remaining_after_second);
    }

    #[test]
    fn test_retention_ignores_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let nested_dir = temp_dir.path().join("nested");
        std::fs::create_dir(&nested_dir).unwrap();
        let nested_file = nested_dir.join("deep.mp3");
        write_file_aged(&nested_file, minutes(600));

        let report = RetentionPolicy::new(1).clean_old_audio_files(temp_dir.path());

        assert_eq!(report.scanned, 0);
        assert!(nested_dir.exists());
        assert!(nested_file.exists());
    }

    #[test]
    fn test_retention_future_mtime_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("future.mp3");
        std::fs::write(&path, b"ID3").unwrap();
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + minutes(60)).unwrap();

        let report = RetentionPolicy::new(0).clean_old_audio_files(temp_dir.path());

        assert!(report.deleted.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn test_retention_continues_after_failed_delete() {
        let temp_dir = TempDir::new().unwrap();
        let stuck = temp_dir.path().join("a.mp3");
        let other = temp_dir.path().join("b.mp3");
        write_file_aged(&stuck, minutes(5));
        write_file_aged(&other, minutes(5));

        let report = RetentionPolicy::new(1).sweep(temp_dir.path(), SystemTime::now(), |path| {
            if path == stuck {
                Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied))
            } else {
                std::fs::remove_file(path)
            }
        });

        assert_eq!(report.scanned, 2);
        assert_eq!(report.deleted, vec![other.clone()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path, stuck);
        assert!(!report.failed[0].reason.is_empty());
        assert!(stuck.exists());
        assert!(!other.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_retention_read_only_directory_reports_each_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let audio_dir = temp_dir.path().join("audio");
        std::fs::create_dir(&audio_dir).unwrap();
        let first = audio_dir.join("a.mp3");
        let second = audio_dir.join("b.mp3");
        write_file_aged(&first, minutes(5));
        write_file_aged(&second, minutes(5));

        std::fs::set_permissions(&audio_dir, std::fs::Permissions::from_mode(0o555)).unwrap();
        // Permission bits do not bind root; nothing to observe then.
        if std::fs::write(audio_dir.join("write-check"), b"").is_ok() {
            std::fs::set_permissions(&audio_dir, std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let report = RetentionPolicy::new(1).clean_old_audio_files(&audio_dir);
        std::fs::set_permissions(&audio_dir, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(report.scanned, 2);
        assert!(report.deleted.is_empty());
        let mut failed: Vec<_> = report.failed.iter().map(|f| f.path.clone()).collect();
        failed.sort();
        assert_eq!(failed, vec![first.clone(), second.clone()]);
        assert!(report.failed.iter().all(|f| !f.reason.is_empty()));
        assert!(first.exists() && second.exists());

        // Once the directory is writable again the next pass reclaims both.
        let retry = RetentionPolicy::new(1).clean_old_audio_files(&audio_dir);
        assert_eq!(retry.deleted.len(), 2);
        assert!(retry.failed.is_empty());
    }

    #[test]
    fn test_retention_on_regular_file_reports_failure() {
        let temp_dir = TempDir::new().unwrap();
        let not_a_dir = temp_dir.path().join("audio");
        std::fs::write(&not_a_dir, b"ID3").unwrap();

        let report = RetentionPolicy::new(1).clean_old_audio_files(&not_a_dir);

        assert_eq!(report.scanned, 0);
        assert!(report.deleted.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path, not_a_dir);
        assert!(not_a_dir.is_file());
    }

    #[test]
    fn test_retention_default_window_is_thirty_minutes() {
        assert_eq!(RetentionPolicy::default().max_age(), minutes(30));
    }

    // ===========================================
    // AudioStore tests
    // ===========================================

    #[test]
    fn test_store_does_not_create_directory_eagerly() {
        let temp_dir = TempDir::new().unwrap();
        let audio_dir = temp_dir.path().join("audio");

        let store = AudioStore::new(audio_dir.clone());
        assert!(!audio_dir.exists());

        store.ensure_dir().unwrap();
        assert!(audio_dir.is_dir());
        assert_eq!(store.audio_dir(), audio_dir.as_path());
    }

    #[test]
    fn test_store_artifact_paths_are_unique() {
        let temp_dir = TempDir::new().unwrap();
        let store = AudioStore::new(temp_dir.path().to_path_buf());

        let paths: HashSet<_> = (0..500).map(|_| store.new_artifact_path("mp3")).collect();

        assert_eq!(paths.len(), 500);
        for path in &paths {
            assert_eq!(path.parent().unwrap(), temp_dir.path());
            assert_eq!(path.extension().unwrap(), "mp3");
            let stem = path.file_stem().unwrap().to_str().unwrap();
            assert_eq!(stem.len(), 32);
            assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_store_read_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let store = AudioStore::new(temp_dir.path().to_path_buf());
        let path = store.new_artifact_path("mp3");
        std::fs::write(&path, b"ID3 audio").unwrap();

        let bytes = store.read_artifact(&path).unwrap();

        assert_eq!(bytes, b"ID3 audio");
    }

    #[test]
    fn test_store_read_missing_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let store = AudioStore::new(temp_dir.path().to_path_buf());
        let path = store.new_artifact_path("mp3");

        let result = store.read_artifact(&path);

        assert!(matches!(result, Err(StorageError::ArtifactMissing(p)) if p == path));
    }

    #[test]
    fn test_store_export_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let store = AudioStore::new(temp_dir.path().join("audio"));
        store.ensure_dir().unwrap();
        let path = store.new_artifact_path("wav");
        std::fs::write(&path, b"RIFF data").unwrap();
        let destination = temp_dir.path().join("download.wav");

        let copied = store.export_artifact(&path, &destination).unwrap();

        assert_eq!(copied, 9);
        assert_eq!(std::fs::read(&destination).unwrap(), b"RIFF data");
        assert!(path.exists());
    }

    #[test]
    fn test_store_export_missing_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let store = AudioStore::new(temp_dir.path().to_path_buf());
        let path = store.new_artifact_path("wav");

        let result = store.export_artifact(&path, &temp_dir.path().join("out.wav"));

        assert!(matches!(result, Err(StorageError::ArtifactMissing(_))));
    }

    #[test]
    fn test_store_discard_tolerates_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = AudioStore::new(temp_dir.path().to_path_buf());
        let path = store.new_artifact_path("wav");
        std::fs::write(&path, b"partial").unwrap();

        store.discard(&path);
        store.discard(&path);

        assert!(!path.exists());
    }

    #[test]
    fn test_wav_duration() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..4000 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let duration = wav_duration(&path).unwrap();

        assert!((duration - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_wav_duration_non_wav() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clip.mp3");
        std::fs::write(&path, b"ID3 not a wav").unwrap();

        assert_eq!(wav_duration(&path), None);
    }
}
