//! Git collaborators: porcelain status queries and index-visibility
//! commands, fanned out best-effort per file.

mod batch;
mod commands;
mod status;

pub use batch::{BatchItem, BatchOutcome, GitBatch, GitBatchCreationError};
pub use commands::{run, try_run, GitCommand, GitCommandError};
pub use status::{is_repository, is_untracked, query_status};
