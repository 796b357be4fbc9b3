use std::hash::Hasher;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use compio::fs;
use metrohash::MetroHash64;
use snafu::{ResultExt, Snafu};

use crate::ext::{AsyncTryFrom, BestEffortPathExt};

/// Compact identity of a file's current content.
///
/// Modification time is the cheap common case; a content hash is the
/// fallback for filesystems that do not report one. `Absent` stands for a
/// path that does not exist (yet), so deletion and creation both register
/// as changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileFingerprint {
    Absent,
    ModifiedTime(SystemTime),
    Hash(u64),
}

impl FileFingerprint {
    /// Fingerprints a path, folding "file missing" into [`Self::Absent`]
    /// instead of an error. Used by the watcher, which must keep polling
    /// across deletes and recreates.
    pub async fn probe(path: &Path) -> Self {
        match Self::async_try_from(path).await {
            Ok(fingerprint) => fingerprint,
            Err(_) => FileFingerprint::Absent,
        }
    }
}

impl AsyncTryFrom<&Path> for FileFingerprint {
    type Error = FingerprintError;

    async fn async_try_from(path: &Path) -> Result<Self, Self::Error> {
        let metadata = match path.metadata() {
            Ok(metadata) => metadata,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Ok(FileFingerprint::Absent);
            }
            Err(error) => {
                return Err(FingerprintError::PathError {
                    path: path.to_path_buf(),
                    source: error,
                });
            }
        };

        if metadata.is_dir() {
            return DirectorySnafu {
                path: path.to_path_buf(),
            }
            .fail();
        }

        // Modified time first, content hash only when unavailable
        if let Ok(modified_time) = metadata.modified() {
            return Ok(FileFingerprint::ModifiedTime(modified_time));
        }

        let bytes = fs::read(path).await.context(PathSnafu {
            path: path.to_path_buf(),
        })?;

        let mut hasher = MetroHash64::default();
        hasher.write(&bytes);
        Ok(FileFingerprint::Hash(hasher.finish()))
    }
}

#[derive(Debug, Snafu)]
pub enum FingerprintError {
    #[snafu(display("Failed to fingerprint path: {}", path.best_effort_path_display()))]
    PathError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("The supplied path {} is a directory", path.best_effort_path_display()))]
    DirectoryError { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::thread;
    use std::time::Duration;

    use tempfile::{NamedTempFile, TempDir};

    use super::*;

    #[compio::test]
    async fn regular_file_fingerprints() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "content").expect("Failed to write to temp file");

        let fingerprint = FileFingerprint::async_try_from(temp_file.path()).await;

        assert!(matches!(
            fingerprint,
            Ok(FileFingerprint::ModifiedTime(_)) | Ok(FileFingerprint::Hash(_))
        ));
    }

    #[compio::test]
    async fn missing_file_is_absent_not_an_error() {
        let fingerprint = FileFingerprint::probe(Path::new("/this/path/does/not/exist.txt")).await;
        assert_eq!(fingerprint, FileFingerprint::Absent);
    }

    #[compio::test]
    async fn directory_is_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let result = FileFingerprint::async_try_from(temp_dir.path()).await;

        assert!(matches!(result, Err(FingerprintError::DirectoryError { .. })));
    }

    #[compio::test]
    async fn modification_changes_the_fingerprint() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "initial").expect("Failed to write to temp file");

        let first = FileFingerprint::probe(temp_file.path()).await;

        thread::sleep(Duration::from_millis(10));
        writeln!(temp_file, "more").expect("Failed to write to temp file");
        temp_file.flush().expect("Failed to flush temp file");

        let second = FileFingerprint::probe(temp_file.path()).await;

        assert_ne!(first, second);
    }

    #[compio::test]
    async fn unchanged_file_keeps_its_fingerprint() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "stable").expect("Failed to write to temp file");

        let first = FileFingerprint::probe(temp_file.path()).await;
        let second = FileFingerprint::probe(temp_file.path()).await;

        assert_eq!(first, second);
    }
}
