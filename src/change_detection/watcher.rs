use std::path::PathBuf;
use std::time::Duration;

use compio::time::sleep;
use tracing::debug;

use crate::ext::BestEffortPathExt;
use crate::scheduler::ChangeSignal;

use super::file_fingerprint::FileFingerprint;

/// How often the watched files are re-fingerprinted. Deliberately shorter
/// than the debounce window, so a burst of edits lands as multiple signals
/// that the scheduler then coalesces.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Polls a fixed set of files and reports fingerprint divergence to the
/// scheduler.
pub struct FileWatcher {
    paths: Vec<PathBuf>,
    interval: Duration,
    signal: ChangeSignal,
}

impl FileWatcher {
    pub fn new(paths: Vec<PathBuf>, signal: ChangeSignal) -> Self {
        Self {
            paths,
            interval: POLL_INTERVAL,
            signal,
        }
    }

    pub async fn snapshot(&self) -> Vec<FileFingerprint> {
        let mut fingerprints = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            fingerprints.push(FileFingerprint::probe(path).await);
        }
        fingerprints
    }

    /// One polling pass: re-probes every path against the previous snapshot,
    /// emits one signal per diverged path, and updates the snapshot in
    /// place. Returns how many paths diverged.
    pub async fn poll_once(&self, last: &mut Vec<FileFingerprint>) -> usize {
        let mut changed = 0;

        for (index, path) in self.paths.iter().enumerate() {
            let current = FileFingerprint::probe(path).await;
            if current != last[index] {
                debug!("Change detected: {}", path.best_effort_path_display());
                self.signal.notify();
                last[index] = current;
                changed += 1;
            }
        }

        changed
    }

    /// Polls until dropped (the watch command's lifetime).
    pub async fn run(self) {
        let mut last = self.snapshot().await;

        loop {
            sleep(self.interval).await;
            self.poll_once(&mut last).await;
        }
    }
}
