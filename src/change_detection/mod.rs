//! External-change detection for the watched files.
//!
//! The exclude file and the sidecar are fingerprinted by modification time
//! (content hash when the filesystem offers no mtime); a polling watcher
//! feeds divergences into the scheduler's signal channel.

mod file_fingerprint;
mod watcher;

pub use file_fingerprint::{FileFingerprint, FingerprintError};
pub use watcher::{FileWatcher, POLL_INTERVAL};
