//! JSON sidecar persistence.
//!
//! The sidecar superseded the exclude-file workzone as the primary store: a
//! pretty-printed JSON array of changelist records carrying identity and
//! creation metadata the text format cannot hold.

mod records;
mod store;

pub use records::{records_equal, ChangelistRecord};
pub use store::{SidecarError, SidecarStore, SIDECAR_RELATIVE_PATH};
