use hashlink::LinkedHashMap;

/// Reserved member meaning "this changelist intentionally has no files".
pub const NO_FILES_PLACEHOLDER: &str = "No files";

/// A leaf of the changelist tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member {
    /// A repository-relative, forward-slash normalized file path.
    File,
    /// The reserved "No files" entry.
    Placeholder,
}

/// Ordered set of members of a single changelist, keyed by path.
///
/// Insertion order is semantic: serialization emits files in the order they
/// were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberSet {
    entries: LinkedHashMap<String, Member>,
}

impl MemberSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for file in files {
            set.insert_file(file.into());
        }
        set
    }

    /// Inserts a real file path. No-op when already present. Removes the
    /// placeholder the instant a real file lands.
    ///
    /// Returns `true` when the set changed.
    pub fn insert_file(&mut self, path: String) -> bool {
        if self.entries.contains_key(&path) {
            return false;
        }

        self.entries.insert(path, Member::File);
        self.entries.remove(NO_FILES_PLACEHOLDER);
        true
    }

    /// Inserts the placeholder entry. Callers re-add it when the last real
    /// file is removed; the tree never does so on its own.
    pub fn insert_placeholder(&mut self) {
        if self.entries.is_empty() {
            self.entries
                .insert(NO_FILES_PLACEHOLDER.to_string(), Member::Placeholder);
        }
    }

    /// Returns `true` when the set changed.
    pub fn remove(&mut self, path: &str) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn has_placeholder(&self) -> bool {
        self.entries
            .values()
            .any(|member| matches!(member, Member::Placeholder))
    }

    /// Real file paths in insertion order, placeholder excluded.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, member)| matches!(member, Member::File))
            .map(|(path, _)| path.as_str())
    }

    /// Every entry key in insertion order, placeholder included.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn file_count(&self) -> usize {
        self.files().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserting_a_real_file_removes_the_placeholder() {
        let mut set = MemberSet::new();
        set.insert_placeholder();
        assert!(set.has_placeholder());

        assert!(set.insert_file("src/a.ts".into()));

        assert!(!set.has_placeholder());
        assert_eq!(set.files().collect::<Vec<_>>(), vec!["src/a.ts"]);
    }

    #[test]
    fn removing_the_last_file_leaves_an_empty_set() {
        let mut set = MemberSet::from_files(["src/a.ts"]);

        assert!(set.remove("src/a.ts"));

        assert!(set.is_empty());
        assert!(!set.has_placeholder());
    }

    #[test]
    fn placeholder_is_not_inserted_over_existing_files() {
        let mut set = MemberSet::from_files(["src/a.ts"]);
        set.insert_placeholder();
        assert!(!set.has_placeholder());
    }

    #[test]
    fn duplicate_insert_is_a_noop() {
        let mut set = MemberSet::new();
        assert!(set.insert_file("a".into()));
        assert!(!set.insert_file("a".into()));
        assert_eq!(set.file_count(), 1);
    }

    #[test]
    fn files_preserve_insertion_order() {
        let set = MemberSet::from_files(["z", "a", "m"]);
        assert_eq!(set.files().collect::<Vec<_>>(), vec!["z", "a", "m"]);
    }
}
