use std::path::Path;

use tracing::warn;

use super::commands::{run, GitCommand};

/// Two-character porcelain code marking an untracked path.
const UNTRACKED_CODE: &str = "??";

/// Captures the porcelain status lines for the working tree. Best-effort:
/// any failure yields an empty capture, which reads as "everything
/// tracked" downstream.
pub async fn query_status(cwd: &Path) -> Vec<String> {
    match run(cwd, &GitCommand::Status).await {
        Ok(lines) => lines,
        Err(error) => {
            warn!("Status query failed: {}", error);
            Vec::new()
        }
    }
}

/// Whether the captured status lines report the path as untracked. Any
/// status code other than `??` counts as tracked.
pub fn is_untracked(path: &str, status_lines: &[String]) -> bool {
    status_lines.iter().any(|line| {
        line.trim_start().starts_with(UNTRACKED_CODE) && line.contains(path)
    })
}

/// Whether `cwd` is inside a git working tree.
pub async fn is_repository(cwd: &Path) -> bool {
    run(cwd, &GitCommand::CheckRepository).await.is_ok()
}
