use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::tree::{strip_label_padding, ChangelistTree, LABEL_PAD, NO_FILES_PLACEHOLDER};

/// Formats the padded display label for a changelist. The pad character
/// separates the name from the decoration so lookups can strip it back off.
pub fn changelist_label(name: &str, file_count: usize) -> String {
    let noun = if file_count == 1 { "file" } else { "files" };
    format!("{name}{LABEL_PAD}({file_count} {noun})")
}

/// Read-only presentation adapter over the tree.
///
/// A rendering host asks for children, labels and parents; the engine never
/// renders anything itself.
pub struct TreeView<'t> {
    tree: &'t ChangelistTree,
}

impl<'t> TreeView<'t> {
    pub fn new(tree: &'t ChangelistTree) -> Self {
        Self { tree }
    }

    /// Child keys of a node: padded changelist labels at the root, member
    /// entries under a changelist. An empty member set presents the
    /// placeholder even when it is not materialized in the tree.
    pub fn children(&self, parent: Option<&str>) -> Vec<String> {
        match parent {
            None => self
                .tree
                .iter()
                .map(|(name, members)| changelist_label(name, members.file_count()))
                .collect(),
            Some(name) => match self.tree.members(name) {
                Some(members) if members.is_empty() => vec![NO_FILES_PLACEHOLDER.to_string()],
                Some(members) => members.keys().map(str::to_string).collect(),
                None => Vec::new(),
            },
        }
    }

    pub fn tree_label(&self, key: &str) -> String {
        let name = strip_label_padding(key);
        match self.tree.members(name) {
            Some(members) => changelist_label(name, members.file_count()),
            None => key.to_string(),
        }
    }

    /// The changelist a member key belongs to; `None` for changelist keys
    /// and for keys the tree does not know.
    pub fn parent_of(&self, key: &str) -> Option<&str> {
        if self.tree.contains(key) {
            return None;
        }
        self.tree.changelist_of(key)
    }
}

/// Invalidation channel between the engine and a rendering host. The engine
/// notifies after every persisted mutation and every reload; the host
/// re-reads the tree through [`TreeView`] when a notification lands.
#[derive(Debug, Clone)]
pub struct RefreshSignal {
    sender: UnboundedSender<()>,
}

impl RefreshSignal {
    pub fn channel() -> (Self, UnboundedReceiver<()>) {
        let (sender, receiver) = mpsc::unbounded();
        (Self { sender }, receiver)
    }

    pub fn notify(&self) {
        let _ = self.sender.unbounded_send(());
    }
}
