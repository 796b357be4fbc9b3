use hashlink::LinkedHashMap;
use snafu::Snafu;

use super::member::MemberSet;
use super::LABEL_PAD;

/// Normalizes a path for membership tracking: backslashes become forward
/// slashes so the same file compares equal regardless of the platform that
/// produced it.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Strips presentation padding from a changelist label, returning the name
/// usable as a lookup key. Everything from the first [`LABEL_PAD`] onward is
/// decoration.
pub fn strip_label_padding(name: &str) -> &str {
    match name.find(LABEL_PAD) {
        Some(index) => &name[..index],
        None => name,
    }
}

/// Insertion-ordered mapping from changelist name to member set.
///
/// All mutating operations are synchronous and atomic with respect to a
/// single caller; the session guarantees no reload interleaves with an
/// in-progress mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangelistTree {
    lists: LinkedHashMap<String, MemberSet>,
}

impl ChangelistTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a changelist with the given initial files.
    pub fn create_changelist<I, S>(&mut self, name: &str, initial_files: I) -> Result<(), TreeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = strip_label_padding(name);
        if self.lists.contains_key(name) {
            return DuplicateNameSnafu { name }.fail();
        }

        let members = MemberSet::from_files(
            initial_files
                .into_iter()
                .map(|file| normalize_path(file.as_ref())),
        );
        self.lists.insert(name.to_string(), members);
        Ok(())
    }

    /// Atomically moves the member set under the new key and drops the old
    /// one. The renamed changelist moves to the end of the iteration order.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> Result<(), TreeError> {
        let old_name = strip_label_padding(old_name);
        let new_name = strip_label_padding(new_name);

        if old_name == new_name {
            return Ok(());
        }
        if self.lists.contains_key(new_name) {
            return DuplicateNameSnafu { name: new_name }.fail();
        }

        let members = self
            .lists
            .remove(old_name)
            .ok_or_else(|| TreeError::UnknownChangelist {
                name: old_name.to_string(),
            })?;
        self.lists.insert(new_name.to_string(), members);
        Ok(())
    }

    /// No-op when the changelist is absent.
    pub fn remove(&mut self, name: &str) {
        self.lists.remove(strip_label_padding(name));
    }

    /// Adds a file to a changelist, normalizing the path first. No-op when
    /// the path is already a member.
    pub fn add_file(&mut self, changelist: &str, path: &str) -> Result<bool, TreeError> {
        let name = strip_label_padding(changelist);
        let members = self
            .lists
            .get_mut(name)
            .ok_or_else(|| TreeError::UnknownChangelist {
                name: name.to_string(),
            })?;

        Ok(members.insert_file(normalize_path(path)))
    }

    /// Removes a file from a changelist. No-op when the path is absent.
    pub fn remove_file(&mut self, changelist: &str, path: &str) -> Result<bool, TreeError> {
        let name = strip_label_padding(changelist);
        let members = self
            .lists
            .get_mut(name)
            .ok_or_else(|| TreeError::UnknownChangelist {
                name: name.to_string(),
            })?;

        Ok(members.remove(path))
    }

    /// Inserts or replaces a changelist wholesale. Used when importing an
    /// external representation where a later record with the same name
    /// supersedes an earlier one.
    pub fn replace_changelist<I, S>(&mut self, name: &str, files: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = strip_label_padding(name);
        let members = MemberSet::from_files(
            files
                .into_iter()
                .map(|file| normalize_path(file.as_ref())),
        );
        // A repeated name keeps its original position, the member set is
        // replaced outright
        self.lists.insert(name.to_string(), members);
    }

    /// Re-inserts the placeholder into an emptied changelist. Exposed for
    /// callers honoring the "placeholder after last removal" rule.
    pub fn insert_placeholder(&mut self, changelist: &str) {
        if let Some(members) = self.lists.get_mut(strip_label_padding(changelist)) {
            members.insert_placeholder();
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lists.contains_key(strip_label_padding(name))
    }

    pub fn members(&self, name: &str) -> Option<&MemberSet> {
        self.lists.get(strip_label_padding(name))
    }

    /// The changelist currently holding the given path, if any. A path lives
    /// in at most one changelist.
    pub fn changelist_of(&self, path: &str) -> Option<&str> {
        let path = normalize_path(path);
        self.lists
            .iter()
            .find(|(_, members)| members.contains(&path))
            .map(|(name, _)| name.as_str())
    }

    /// Changelist names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MemberSet)> {
        self.lists
            .iter()
            .map(|(name, members)| (name.as_str(), members))
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

#[derive(Debug, Snafu)]
pub enum TreeError {
    #[snafu(display("Changelist '{}' already exists", name))]
    DuplicateName { name: String },
    #[snafu(display("Changelist '{}' not found", name))]
    UnknownChangelist { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_create_fails() {
        let mut tree = ChangelistTree::new();
        tree.create_changelist("A", Vec::<&str>::new()).unwrap();

        let result = tree.create_changelist("A", Vec::<&str>::new());

        assert!(matches!(result, Err(TreeError::DuplicateName { name }) if name == "A"));
    }

    #[test]
    fn rename_onto_existing_distinct_name_fails() {
        let mut tree = ChangelistTree::new();
        tree.create_changelist("A", Vec::<&str>::new()).unwrap();
        tree.create_changelist("C", Vec::<&str>::new()).unwrap();
        tree.rename("A", "B").unwrap();

        let result = tree.rename("C", "B");

        assert!(matches!(result, Err(TreeError::DuplicateName { name }) if name == "B"));
    }

    #[test]
    fn rename_moves_the_member_set() {
        let mut tree = ChangelistTree::new();
        tree.create_changelist("A", ["src/a.ts"]).unwrap();

        tree.rename("A", "B").unwrap();

        assert!(!tree.contains("A"));
        assert_eq!(
            tree.members("B").unwrap().files().collect::<Vec<_>>(),
            vec!["src/a.ts"]
        );
    }

    #[test]
    fn rename_to_same_name_is_a_noop() {
        let mut tree = ChangelistTree::new();
        tree.create_changelist("A", ["src/a.ts"]).unwrap();
        tree.rename("A", "A").unwrap();
        assert!(tree.contains("A"));
    }

    #[test]
    fn remove_of_absent_changelist_is_a_noop() {
        let mut tree = ChangelistTree::new();
        tree.remove("missing");
        assert!(tree.is_empty());
    }

    #[test]
    fn add_file_normalizes_backslashes() {
        let mut tree = ChangelistTree::new();
        tree.create_changelist("A", Vec::<&str>::new()).unwrap();

        tree.add_file("A", "src\\win\\path.ts").unwrap();

        assert!(tree.members("A").unwrap().contains("src/win/path.ts"));
    }

    #[test]
    fn add_file_to_unknown_changelist_errors() {
        let mut tree = ChangelistTree::new();
        let result = tree.add_file("missing", "a.ts");
        assert!(matches!(result, Err(TreeError::UnknownChangelist { .. })));
    }

    #[test]
    fn padded_label_resolves_to_the_undecorated_key() {
        let mut tree = ChangelistTree::new();
        tree.create_changelist("My List", ["a.ts"]).unwrap();

        let padded = format!("My List{}(1 file)", LABEL_PAD);

        assert!(tree.contains(&padded));
        assert!(tree.remove_file(&padded, "a.ts").unwrap());
    }

    #[test]
    fn a_path_lives_in_at_most_one_changelist() {
        let mut tree = ChangelistTree::new();
        tree.create_changelist("A", ["shared.ts"]).unwrap();
        tree.create_changelist("B", Vec::<&str>::new()).unwrap();

        // Moving between changelists is remove-then-add, never a transfer
        assert!(tree.remove_file("A", "shared.ts").unwrap());
        assert!(tree.add_file("B", "shared.ts").unwrap());

        assert_eq!(tree.changelist_of("shared.ts"), Some("B"));
    }

    #[test]
    fn names_iterate_in_insertion_order() {
        let mut tree = ChangelistTree::new();
        for name in ["Zeta", "Alpha", "Mid"] {
            tree.create_changelist(name, Vec::<&str>::new()).unwrap();
        }
        assert_eq!(tree.names().collect::<Vec<_>>(), vec!["Zeta", "Alpha", "Mid"]);
    }
}
