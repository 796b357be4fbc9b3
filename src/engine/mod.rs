//! Session orchestration.
//!
//! The session owns the one mutable tree per workspace and drives the full
//! lifecycle: load from disk, mutate with git side effects, persist through
//! the no-op-write gates. The provider is the read-only face a rendering
//! host consumes.

mod provider;
mod session;

pub use provider::{changelist_label, RefreshSignal, TreeView};
pub use session::{Session, SessionError, DEFAULT_CHANGELIST, EXCLUDE_RELATIVE_PATH};
