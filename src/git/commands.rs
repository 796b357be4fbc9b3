use std::fmt;
use std::path::Path;
use std::process::Stdio;

use compio::{io::compat::AsyncStream, process::Command};
use futures::{AsyncBufReadExt, StreamExt, io::BufReader};
use snafu::{ResultExt, Snafu};
use tracing::{debug, warn};

/// The git invocations this tool issues. Arguments are always passed as an
/// argv vector, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCommand {
    /// `git status --porcelain`
    Status,
    /// `git rev-parse --is-inside-work-tree`
    CheckRepository,
    /// `git update-index --assume-unchanged <path>`
    AssumeUnchanged { path: String },
    /// `git update-index --no-assume-unchanged <path>`
    NoAssumeUnchanged { path: String },
    /// `git add --force <paths…>`
    ForceAdd { paths: Vec<String> },
}

impl GitCommand {
    fn args(&self) -> Vec<&str> {
        match self {
            GitCommand::Status => vec!["status", "--porcelain"],
            GitCommand::CheckRepository => vec!["rev-parse", "--is-inside-work-tree"],
            GitCommand::AssumeUnchanged { path } => {
                vec!["update-index", "--assume-unchanged", path]
            }
            GitCommand::NoAssumeUnchanged { path } => {
                vec!["update-index", "--no-assume-unchanged", path]
            }
            GitCommand::ForceAdd { paths } => {
                let mut args = vec!["add", "--force"];
                args.extend(paths.iter().map(String::as_str));
                args
            }
        }
    }
}

impl fmt::Display for GitCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "git {}", self.args().join(" "))
    }
}

/// Runs a git command to completion and returns its stdout lines. Non-zero
/// exit is an error carrying the exit code.
pub async fn run(cwd: &Path, command: &GitCommand) -> Result<Vec<String>, GitCommandError> {
    debug!("Executing command: {}", command);

    let mut cmd = Command::new("git");
    cmd.args(command.args());
    cmd.current_dir(cwd);
    let _ = cmd.stdout(Stdio::piped());
    let _ = cmd.stderr(Stdio::piped());

    let mut handle = cmd.spawn().context(SpawnSnafu {
        command: command.to_string(),
    })?;

    // git's output here is small; draining stdout then stderr sequentially
    // cannot fill the pipes
    let stdout_lines = match handle.stdout.take() {
        Some(stdout) => collect_lines(AsyncStream::new(stdout)).await,
        None => Vec::new(),
    };
    let stderr_lines = match handle.stderr.take() {
        Some(stderr) => collect_lines(AsyncStream::new(stderr)).await,
        None => Vec::new(),
    };

    let status = handle.wait().await.context(WaitSnafu {
        command: command.to_string(),
    })?;

    if status.success() {
        debug!("{} success: true; {} stdout lines", command, stdout_lines.len());
        Ok(stdout_lines)
    } else {
        debug!("{} success: false; {}", command, stderr_lines.join("; "));
        UnsuccessfulExecutionSnafu {
            command: command.to_string(),
            status: status.code().unwrap_or(-1),
        }
        .fail()
    }
}

/// Best-effort variant: failures are logged and returned, never propagated
/// upward as a batch abort. Siblings in the same batch still run.
pub async fn try_run(cwd: &Path, command: &GitCommand) -> Result<Vec<String>, GitCommandError> {
    match run(cwd, command).await {
        Ok(lines) => Ok(lines),
        Err(error) => {
            warn!("{}", error);
            Err(error)
        }
    }
}

async fn collect_lines<R>(stream: R) -> Vec<String>
where
    R: futures::AsyncRead + Unpin,
{
    let reader = BufReader::new(stream);
    let mut lines = reader.lines();
    let mut collected = Vec::new();

    while let Some(line_result) = lines.next().await {
        match line_result {
            Ok(line) => collected.push(line),
            Err(error) => {
                debug!("Error reading command output: {}", error);
            }
        }
    }

    collected
}

#[derive(Debug, Snafu)]
pub enum GitCommandError {
    #[snafu(display("Failed to spawn '{}'", command))]
    SpawnError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to wait for '{}'", command))]
    WaitError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("'{}' failed with exit code {}", command, status))]
    UnsuccessfulExecution { command: String, status: i32 },
    #[snafu(display("Failed to dispatch '{}': {}", command, message))]
    DispatchError { command: String, message: String },
    #[snafu(display("'{}' got cancelled", command))]
    CanceledError {
        command: String,
        source: futures_channel::oneshot::Canceled,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argv_rendering_covers_every_command() {
        let cases = [
            (GitCommand::Status, "git status --porcelain"),
            (
                GitCommand::CheckRepository,
                "git rev-parse --is-inside-work-tree",
            ),
            (
                GitCommand::AssumeUnchanged {
                    path: "src/a.ts".into(),
                },
                "git update-index --assume-unchanged src/a.ts",
            ),
            (
                GitCommand::NoAssumeUnchanged {
                    path: "src/a.ts".into(),
                },
                "git update-index --no-assume-unchanged src/a.ts",
            ),
            (
                GitCommand::ForceAdd {
                    paths: vec!["a.ts".into(), "b.ts".into()],
                },
                "git add --force a.ts b.ts",
            ),
        ];

        for (command, rendered) in cases {
            assert_eq!(command.to_string(), rendered);
        }
    }

    #[compio::test]
    async fn status_outside_a_repository_fails_without_panicking() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");

        let result = run(dir.path(), &GitCommand::Status).await;

        assert!(matches!(
            result,
            Err(GitCommandError::UnsuccessfulExecution { .. }) | Err(GitCommandError::SpawnError { .. })
        ));
    }
}
