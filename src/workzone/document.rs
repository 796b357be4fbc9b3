use std::io::ErrorKind;
use std::path::Path;

use compio::fs;
use snafu::Snafu;
use tracing::debug;

use crate::ext::{AsyncTryFrom, BestEffortPathExt};

use super::{WORKZONE_END, WORKZONE_START};

/// Line span of the workzone inside a document. `start` and `end` are the
/// indexes of the marker lines themselves; the owned region is the exclusive
/// range between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkzoneSpan {
    pub start: usize,
    pub end: usize,
}

/// A text document split into lines.
///
/// Splitting normalizes `\r\n` to `\n`; joining back always uses `\n`. That
/// is the only byte-level change a round trip may introduce outside the
/// workzone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    pub fn from_content(content: &str) -> Self {
        let lines = content
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Finds the workzone markers, scanning for the first exact (trimmed)
    /// match of each. A missing marker is the recoverable "not yet
    /// initialized" condition, not a fatal error.
    pub fn locate_workzone(&self) -> Result<WorkzoneSpan, WorkzoneError> {
        let start = self
            .lines
            .iter()
            .position(|line| line.trim() == WORKZONE_START);
        let end = self.lines.iter().position(|line| line.trim() == WORKZONE_END);

        match (start, end) {
            // Markers in reverse order read as uninitialized as well
            (Some(start), Some(end)) if start < end => Ok(WorkzoneSpan { start, end }),
            _ => WorkzoneNotFoundSnafu.fail(),
        }
    }

    pub fn has_workzone(&self) -> bool {
        self.locate_workzone().is_ok()
    }
}

impl AsyncTryFrom<&Path> for Document {
    type Error = WorkzoneError;

    async fn async_try_from(path: &Path) -> Result<Self, Self::Error> {
        debug!("Reading document: {}", path.best_effort_path_display());

        match fs::read(path).await {
            Ok(bytes) => Ok(Self::from_content(&String::from_utf8_lossy(&bytes))),
            // An absent file is an empty document; locating the workzone in
            // it then reports the uninitialized condition
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!("Document does not exist yet, treating as empty");
                Ok(Self::from_content(""))
            }
            Err(error) => Err(WorkzoneError::ReadError {
                file_path: path.best_effort_path_display(),
                source: error,
            }),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum WorkzoneError {
    #[snafu(display("Workzone not found"))]
    WorkzoneNotFound,
    #[snafu(display("Failed to read the exclude file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write the exclude file: {}", file_path))]
    WriteError {
        file_path: String,
        source: std::io::Error,
    },
}
