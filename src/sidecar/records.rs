use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persistence form of a single changelist.
///
/// `id` is generated once and survives renames; `created_at` is immutable
/// once set. `name` mirrors the tree key and may diverge only transiently
/// while a rename is being persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelistRecord {
    pub id: String,
    pub name: String,
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChangelistRecord {
    /// A fresh record with generated identity and the current timestamp.
    pub fn new(name: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            files,
            description: None,
            created_at: Utc::now(),
        }
    }

    /// Change-detection equality: identity, name, and the file list's length
    /// and order. Description and creation time deliberately do not
    /// participate; they never change through tree mutations.
    pub fn same_as(&self, other: &ChangelistRecord) -> bool {
        self.id == other.id && self.name == other.name && self.files == other.files
    }
}

/// Deep equality over two record sets, in order. This gate is the primary
/// defense against redundant disk writes during rapid sequential mutations.
pub fn records_equal(a: &[ChangelistRecord], b: &[ChangelistRecord]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(left, right)| left.same_as(right))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, files: &[&str]) -> ChangelistRecord {
        ChangelistRecord::new(name, files.iter().map(|f| f.to_string()).collect())
    }

    #[test]
    fn fresh_records_get_distinct_ids() {
        let a = record("A", &[]);
        let b = record("A", &[]);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn same_as_ignores_description() {
        let a = record("A", &["f.ts"]);
        let mut b = a.clone();
        b.description = Some("notes".into());
        assert!(a.same_as(&b));
    }

    #[test]
    fn same_as_detects_file_reorder() {
        let a = record("A", &["one.ts", "two.ts"]);
        let mut b = a.clone();
        b.files.reverse();
        assert!(!a.same_as(&b));
    }

    #[test]
    fn records_equal_detects_length_change() {
        let a = vec![record("A", &[])];
        assert!(!records_equal(&a, &[]));
        assert!(records_equal(&a, &a.clone()));
    }

    #[test]
    fn serializes_with_camel_case_iso_timestamp() {
        let rec = record("My List", &["src/a.ts"]);

        let json = serde_json::to_string(&rec).unwrap();

        assert!(json.contains("\"createdAt\""));
        assert!(!json.contains("\"description\""));
        assert!(json.contains("\"files\":[\"src/a.ts\"]"));

        let back: ChangelistRecord = serde_json::from_str(&json).unwrap();
        assert!(back.same_as(&rec));
        assert_eq!(back.created_at, rec.created_at);
    }
}
