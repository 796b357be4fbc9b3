use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use compio::buf::BufResult;
use compio::fs;
use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::ext::BestEffortPathExt;
use crate::tree::ChangelistTree;

use super::records::{records_equal, ChangelistRecord};

/// Fixed sidecar location, byte-compatible with the editor extension that
/// introduced the format so both tools can share state.
pub const SIDECAR_RELATIVE_PATH: &str = ".vscode/changelists.json";

/// Stateless adapter between the tree and the JSON sidecar file.
#[derive(Debug, Clone)]
pub struct SidecarStore {
    root: PathBuf,
}

impl SidecarStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.root.join(SIDECAR_RELATIVE_PATH)
    }

    /// Loads the persisted records. An absent file is the recoverable
    /// "not yet initialized" condition; a present but malformed file is a
    /// parse failure surfaced to the caller.
    pub async fn load(&self) -> Result<Vec<ChangelistRecord>, SidecarError> {
        let path = self.path();
        debug!("Loading sidecar: {}", path.best_effort_path_display());

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return ConfigNotFoundSnafu.fail();
            }
            Err(error) => {
                return Err(SidecarError::ReadError {
                    file_path: path.best_effort_path_display(),
                    source: error,
                });
            }
        };

        serde_json::from_slice(&bytes).context(ParseSnafu {
            file_path: path.best_effort_path_display(),
        })
    }

    /// Writes the records, pretty-printed, unless the on-disk set already
    /// deep-equals the new one. Returns whether a disk write happened.
    pub async fn write(&self, records: &[ChangelistRecord]) -> Result<bool, SidecarError> {
        match self.load().await {
            Ok(previous) if records_equal(&previous, records) => {
                debug!("Sidecar unchanged, skipping write");
                return Ok(false);
            }
            // Absent: first write. Malformed: an explicit persist replaces
            // the broken file with a valid one.
            Ok(_) | Err(SidecarError::ConfigNotFound) | Err(SidecarError::ParseError { .. }) => {}
            Err(error) => return Err(error),
        }

        let path = self.path();
        let bytes = serde_json::to_vec_pretty(records).context(SerializeSnafu)?;

        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent).await;
        }

        let BufResult(result, _buffer) = fs::write(&path, bytes).await;
        result.context(WriteSnafu {
            file_path: path.best_effort_path_display(),
        })?;

        debug!("Wrote sidecar: {}", path.best_effort_path_display());
        Ok(true)
    }

    /// Migrates a tree into records, correlating each name with a previous
    /// record to preserve `id`, `created_at` and `description`. `renames`
    /// maps a new name to the name it replaced, so identity survives a
    /// rename. Unmatched names get fresh identity.
    pub fn tree_to_records(
        tree: &ChangelistTree,
        previous: &[ChangelistRecord],
        renames: &HashMap<String, String>,
    ) -> Vec<ChangelistRecord> {
        tree.iter()
            .map(|(name, members)| {
                let files: Vec<String> = members.files().map(str::to_string).collect();

                let matched = previous
                    .iter()
                    .find(|record| record.name == name)
                    .or_else(|| {
                        renames
                            .get(name)
                            .and_then(|old| previous.iter().find(|record| record.name == *old))
                    });

                match matched {
                    Some(existing) => ChangelistRecord {
                        id: existing.id.clone(),
                        name: name.to_string(),
                        files,
                        description: existing.description.clone(),
                        created_at: existing.created_at,
                    },
                    None => ChangelistRecord::new(name, files),
                }
            })
            .collect()
    }

    /// Builds a tree from records. Empty file lists become empty member
    /// sets; the placeholder is never auto-inserted here.
    pub fn tree_from_records(records: &[ChangelistRecord]) -> ChangelistTree {
        let mut tree = ChangelistTree::new();
        for record in records {
            tree.replace_changelist(&record.name, record.files.iter());
        }
        tree
    }
}

impl AsRef<Path> for SidecarStore {
    fn as_ref(&self) -> &Path {
        &self.root
    }
}

#[derive(Debug, Snafu)]
pub enum SidecarError {
    #[snafu(display("Changelist config not found"))]
    ConfigNotFound,
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse the config file: {}", file_path))]
    ParseError {
        file_path: String,
        source: serde_json::Error,
    },
    #[snafu(display("Failed to serialize changelist records"))]
    SerializeError { source: serde_json::Error },
    #[snafu(display("Failed to write the config file: {}", file_path))]
    WriteError {
        file_path: String,
        source: std::io::Error,
    },
}
