//! In-memory changelist tree.
//!
//! The tree is the single mutable source of truth during a session: an
//! insertion-ordered mapping from changelist name to an ordered member set.
//! Members are a sum type (a real file path or the reserved "No files"
//! placeholder), so the type system rules out nesting files inside files.

mod changelist_tree;
mod member;

pub use changelist_tree::{ChangelistTree, TreeError, normalize_path, strip_label_padding};
pub use member::{Member, MemberSet, NO_FILES_PLACEHOLDER};

/// Invisible separator a presentation layer may append to a changelist label
/// for padding (U+2800 BRAILLE PATTERN BLANK). Lookups strip everything from
/// this character onward.
pub const LABEL_PAD: char = '\u{2800}';
