//! The marked region of `.git/info/exclude` owned by this tool.
//!
//! Everything outside the two marker lines is opaque user content and is
//! preserved byte-for-byte (modulo CRLF normalization at the document
//! boundary). Everything between them is ours: one header line per
//! changelist followed by its file paths.

mod document;
mod parse;
mod serialize;

pub use document::{Document, WorkzoneError, WorkzoneSpan};
pub use parse::{parse_tree, parse_workzone, ParsedChangelist};
pub use serialize::{ensure_workzone, header_line, region_lines, splice};

/// Exact literal start marker line.
pub const WORKZONE_START: &str = "# ==== GIT CHANGELISTS ====";

/// Exact literal end marker line.
pub const WORKZONE_END: &str = "# ==== END: GIT CHANGELISTS ====";

pub(crate) const HEADER_PREFIX: &str = "# ==== ";
pub(crate) const HEADER_SUFFIX: &str = " ====";
