use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::thread::available_parallelism;

use compio::dispatcher::{Dispatcher, DispatcherBuilder};
use snafu::{ResultExt, Snafu};
use tracing::{debug, warn};

use super::commands::{run, GitCommand, GitCommandError};

/// Worker count fallback when system parallelism cannot be determined
const DEFAULT_WORKER_THREADS: usize = 1;

/// One per-file command in a batch.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub path: String,
    pub command: GitCommand,
}

/// Per-item result of a batch. Failures are data, not control flow: callers
/// inspect partial outcomes deterministically instead of catching.
#[derive(Debug)]
pub struct BatchOutcome {
    pub path: String,
    pub result: Result<(), GitCommandError>,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Parallel, best-effort fan-out of independent git invocations.
///
/// Every item touches a disjoint path and carries no shared mutable state,
/// so the batch dispatches them all before collecting any result. A failed
/// or hung item stalls only its own slot; siblings always run.
pub struct GitBatch {
    dispatcher: Dispatcher,
    cwd: PathBuf,
}

impl GitBatch {
    pub fn new(cwd: impl Into<PathBuf>) -> Result<Self, GitBatchCreationError> {
        let workers_num = Self::determine_worker_count();
        debug!("Using {} worker threads for git fan-out", workers_num);

        let dispatcher = DispatcherBuilder::new()
            .worker_threads(workers_num)
            .build()
            .context(DispatcherSnafu)?;

        Ok(Self {
            dispatcher,
            cwd: cwd.into(),
        })
    }

    fn determine_worker_count() -> NonZeroUsize {
        available_parallelism()
            .ok()
            .or_else(|| NonZeroUsize::new(DEFAULT_WORKER_THREADS))
            .unwrap_or(NonZeroUsize::MIN)
    }

    /// Dispatches every item, then collects one outcome per item in input
    /// order. Never short-circuits.
    pub async fn run(&self, items: Vec<BatchItem>) -> Vec<BatchOutcome> {
        let mut pending = Vec::with_capacity(items.len());

        for item in items {
            let cwd = self.cwd.clone();
            let command = item.command.clone();
            let receiver = self
                .dispatcher
                .dispatch(move || async move { run(&cwd, &command).await.map(|_| ()) })
                .map_err(|error| GitCommandError::DispatchError {
                    command: item.command.to_string(),
                    message: error.to_string(),
                });

            pending.push((item, receiver));
        }

        let mut outcomes = Vec::with_capacity(pending.len());

        for (item, receiver) in pending {
            let result = match receiver {
                Ok(receiver) => match receiver.await {
                    Ok(inner) => inner,
                    Err(canceled) => Err(GitCommandError::CanceledError {
                        command: item.command.to_string(),
                        source: canceled,
                    }),
                },
                Err(dispatch_error) => Err(dispatch_error),
            };

            if let Err(error) = &result {
                warn!("Batch entry for '{}' failed: {}", item.path, error);
            }

            outcomes.push(BatchOutcome {
                path: item.path,
                result,
            });
        }

        outcomes
    }
}

#[derive(Debug, Snafu)]
pub enum GitBatchCreationError {
    #[snafu(display("Failed to create git command dispatcher"))]
    DispatcherError { source: std::io::Error },
}
