use crate::tree::ChangelistTree;

use super::document::{Document, WorkzoneError};
use super::{HEADER_PREFIX, HEADER_SUFFIX, WORKZONE_END, WORKZONE_START};

/// Builds the header line for a changelist name.
pub fn header_line(name: &str) -> String {
    format!("{HEADER_PREFIX}{name}{HEADER_SUFFIX}")
}

/// Serializes a tree into the lines of the workzone region (exclusive of the
/// marker lines): a blank line before every header, the header, the real
/// file paths in insertion order, and one closing blank line. Placeholder
/// entries are never written.
///
/// Re-parsing the produced region yields a tree with identical keys and
/// per-key file order.
pub fn region_lines(tree: &ChangelistTree) -> Vec<String> {
    let mut lines = Vec::new();

    for (name, members) in tree.iter() {
        lines.push(String::new());
        lines.push(header_line(name));
        lines.extend(members.files().map(str::to_string));
    }

    lines.push(String::new());
    lines
}

/// Replaces the workzone region of a document with a fresh serialization of
/// the tree, returning the complete new document text. Every byte outside
/// the marker lines is carried over untouched.
///
/// The caller compares the result against the on-disk content and skips the
/// write when identical; that short-circuit is what keeps the scheduler from
/// reacting to our own writes.
pub fn splice(document: &Document, tree: &ChangelistTree) -> Result<String, WorkzoneError> {
    let span = document.locate_workzone()?;

    let mut lines: Vec<&str> = Vec::new();
    lines.extend(document.lines()[..=span.start].iter().map(String::as_str));
    let region = region_lines(tree);
    lines.extend(region.iter().map(String::as_str));
    lines.extend(document.lines()[span.end..].iter().map(String::as_str));

    Ok(lines.join("\n"))
}

/// Appends an empty workzone to a document that has none, leaving existing
/// content in place. Returns the content unchanged when the markers are
/// already present.
pub fn ensure_workzone(content: &str) -> String {
    if Document::from_content(content).has_workzone() {
        return content.to_string();
    }

    format!(
        "{}\n\n{WORKZONE_START}\n{WORKZONE_END}\n",
        content.trim_end()
    )
}
