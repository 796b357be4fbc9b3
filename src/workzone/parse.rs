use crate::tree::ChangelistTree;

use super::document::{Document, WorkzoneError};
use super::{HEADER_PREFIX, HEADER_SUFFIX};

/// One header occurrence inside the workzone, with the file lines that
/// followed it. Duplicate names are NOT merged here; each occurrence is a
/// distinct record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedChangelist {
    pub name: String,
    pub files: Vec<String>,
}

/// Recognizes a changelist header line and extracts its name.
///
/// The name token is restricted to `[A-Za-z0-9_ ]+` so it can never collide
/// with the header decoration or the end marker (which carries a colon).
fn header_name(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let name = trimmed
        .strip_prefix(HEADER_PREFIX)?
        .strip_suffix(HEADER_SUFFIX)?;

    if name.is_empty() {
        return None;
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ' ')
    {
        return None;
    }

    Some(name)
}

/// Parses the workzone region into changelist records, in document order.
///
/// Blank lines are ignored. Non-blank lines before the first header are
/// stray content and are dropped.
pub fn parse_workzone(document: &Document) -> Result<Vec<ParsedChangelist>, WorkzoneError> {
    let span = document.locate_workzone()?;
    let region = &document.lines()[span.start + 1..span.end];

    let mut records: Vec<ParsedChangelist> = Vec::new();

    for line in region {
        if let Some(name) = header_name(line) {
            records.push(ParsedChangelist {
                name: name.to_string(),
                files: Vec::new(),
            });
            continue;
        }

        let path = line.trim();
        if path.is_empty() {
            continue;
        }
        if let Some(current) = records.last_mut() {
            current.files.push(path.to_string());
        }
    }

    Ok(records)
}

/// Collapses parsed records into a tree. A later record with the same name
/// replaces the earlier one's member set entirely (last-occurrence-wins, no
/// union merge).
pub fn parse_tree(document: &Document) -> Result<ChangelistTree, WorkzoneError> {
    let mut tree = ChangelistTree::new();
    for record in parse_workzone(document)? {
        tree.replace_changelist(&record.name, record.files.iter());
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const SCENARIO: &str = "foo\n# ==== GIT CHANGELISTS ====\n\n# ==== MyList ====\nsrc/a.ts\n\n# ==== END: GIT CHANGELISTS ====\nbar";

    #[test]
    fn scenario_document_parses_to_a_single_changelist() {
        let doc = Document::from_content(SCENARIO);

        let tree = parse_tree(&doc).unwrap();

        assert_eq!(tree.names().collect::<Vec<_>>(), vec!["MyList"]);
        assert_eq!(
            tree.members("MyList").unwrap().files().collect::<Vec<_>>(),
            vec!["src/a.ts"]
        );
    }

    #[rstest]
    #[case("# ==== MyList ====", Some("MyList"))]
    #[case("# ==== My List 2 ====", Some("My List 2"))]
    #[case("# ==== with_underscore ====", Some("with_underscore"))]
    #[case("  # ==== Indented ====  ", Some("Indented"))]
    #[case("# ==== END: GIT CHANGELISTS ====", None)]
    #[case("# ==== bad!name ====", None)]
    #[case("# ====  ====", None)]
    #[case("src/a.ts", None)]
    #[case("", None)]
    fn header_recognition(#[case] line: &str, #[case] expected: Option<&str>) {
        assert_eq!(header_name(line), expected);
    }

    #[test]
    fn missing_workzone_is_reported_not_panicked() {
        let doc = Document::from_content("just an ordinary exclude file\n*.log\n");
        assert!(matches!(
            parse_workzone(&doc),
            Err(WorkzoneError::WorkzoneNotFound)
        ));
    }

    #[test]
    fn blank_lines_are_not_paths() {
        let doc = Document::from_content(
            "# ==== GIT CHANGELISTS ====\n\n# ==== A ====\n\na.ts\n\n\nb.ts\n\n# ==== END: GIT CHANGELISTS ====",
        );

        let records = parse_workzone(&doc).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].files, vec!["a.ts", "b.ts"]);
    }

    #[test]
    fn duplicate_headers_stay_distinct_records() {
        let doc = Document::from_content(
            "# ==== GIT CHANGELISTS ====\n# ==== A ====\nfirst.ts\n# ==== A ====\nsecond.ts\n# ==== END: GIT CHANGELISTS ====",
        );

        let records = parse_workzone(&doc).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].files, vec!["first.ts"]);
        assert_eq!(records[1].files, vec!["second.ts"]);
    }

    #[test]
    fn duplicate_headers_collapse_last_wins_in_the_tree() {
        let doc = Document::from_content(
            "# ==== GIT CHANGELISTS ====\n# ==== A ====\nfirst.ts\n# ==== A ====\nsecond.ts\n# ==== END: GIT CHANGELISTS ====",
        );

        let tree = parse_tree(&doc).unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(
            tree.members("A").unwrap().files().collect::<Vec<_>>(),
            vec!["second.ts"]
        );
    }

    #[test]
    fn stray_lines_before_the_first_header_are_dropped() {
        let doc = Document::from_content(
            "# ==== GIT CHANGELISTS ====\norphan.ts\n# ==== A ====\na.ts\n# ==== END: GIT CHANGELISTS ====",
        );

        let records = parse_workzone(&doc).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].files, vec!["a.ts"]);
    }

    #[test]
    fn file_order_is_preserved() {
        let doc = Document::from_content(
            "# ==== GIT CHANGELISTS ====\n# ==== A ====\nz.ts\na.ts\nm.ts\n# ==== END: GIT CHANGELISTS ====",
        );

        let records = parse_workzone(&doc).unwrap();

        assert_eq!(records[0].files, vec!["z.ts", "a.ts", "m.ts"]);
    }
}
