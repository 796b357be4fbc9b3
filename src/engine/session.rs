use std::collections::HashMap;
use std::path::{Path, PathBuf};

use compio::buf::BufResult;
use compio::fs;
use futures_channel::mpsc::UnboundedReceiver;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::ext::{AsyncTryFrom, AsyncTryInto, BestEffortPathExt};
use crate::git::{self, BatchItem, GitBatch, GitBatchCreationError, GitCommand};
use crate::sidecar::{ChangelistRecord, SidecarError, SidecarStore};
use crate::tree::{normalize_path, strip_label_padding, ChangelistTree, MemberSet, TreeError};
use crate::workzone::{ensure_workzone, parse_tree, splice, Document, WorkzoneError};

use super::provider::RefreshSignal;

/// Changelist seeded on first initialization.
pub const DEFAULT_CHANGELIST: &str = "Default";

/// The exclude file whose workzone this tool owns, relative to the
/// workspace root.
pub const EXCLUDE_RELATIVE_PATH: &str = ".git/info/exclude";

/// Single owner of the in-memory tree for one workspace.
///
/// Lifecycle is explicit: `load` pulls state from disk (sidecar first, the
/// workzone as the migration fallback), the mutation methods change the tree
/// and apply git side effects, `persist` pushes both representations back
/// out through their no-op-write gates. Mutations are not reentrant; the
/// single-threaded runtime serializes them.
pub struct Session {
    root: PathBuf,
    tree: ChangelistTree,
    records: Vec<ChangelistRecord>,
    sidecar: SidecarStore,
    batch: GitBatch,
    // New name to the name it replaced, carrying record identity across
    // renames until the next persist
    pending_renames: HashMap<String, String>,
    refresh: RefreshSignal,
    refresh_events: Option<UnboundedReceiver<()>>,
    initialized: bool,
}

impl Session {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let root = root.into();
        let batch = GitBatch::new(&root).context(BatchCreationSnafu)?;
        let (refresh, refresh_events) = RefreshSignal::channel();

        Ok(Self {
            sidecar: SidecarStore::new(&root),
            root,
            tree: ChangelistTree::new(),
            records: Vec::new(),
            batch,
            pending_renames: HashMap::new(),
            refresh,
            refresh_events: Some(refresh_events),
            initialized: false,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tree(&self) -> &ChangelistTree {
        &self.tree
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn exclude_path(&self) -> PathBuf {
        self.root.join(EXCLUDE_RELATIVE_PATH)
    }

    pub fn sidecar_path(&self) -> PathBuf {
        self.sidecar.path()
    }

    /// The refresh event stream, once. The engine notifies it after every
    /// persisted mutation and reload.
    pub fn take_refresh_events(&mut self) -> Option<UnboundedReceiver<()>> {
        self.refresh_events.take()
    }

    /// Pulls the tree from disk. The sidecar is authoritative; when absent,
    /// the workzone is imported instead (the migration path for workspaces
    /// predating the sidecar). Neither present means uninitialized, which is
    /// not an error.
    pub async fn load(&mut self) -> Result<(), SessionError> {
        match self.sidecar.load().await {
            Ok(records) => {
                self.tree = SidecarStore::tree_from_records(&records);
                self.records = records;
                self.initialized = true;
            }
            Err(SidecarError::ConfigNotFound) => {
                let document = Document::async_try_from(self.exclude_path().as_path())
                    .await
                    .context(WorkzoneSnafu)?;

                match parse_tree(&document) {
                    Ok(tree) => {
                        debug!("No sidecar yet, imported the workzone");
                        self.tree = tree;
                        self.records.clear();
                        self.initialized = true;
                    }
                    Err(WorkzoneError::WorkzoneNotFound) => {
                        self.tree = ChangelistTree::new();
                        self.records.clear();
                        self.initialized = false;
                    }
                    Err(error) => return Err(error).context(WorkzoneSnafu),
                }
            }
            Err(error) => return Err(error).context(SidecarSnafu),
        }

        self.pending_renames.clear();
        Ok(())
    }

    /// Pushes the tree into both representations. Each write is gated on
    /// equality with the current on-disk content; those gates are what keep
    /// the watcher from reacting to our own writes. Returns whether any disk
    /// write happened.
    pub async fn persist(&mut self) -> Result<bool, SessionError> {
        let records = SidecarStore::tree_to_records(&self.tree, &self.records, &self.pending_renames);
        let wrote_sidecar = self.sidecar.write(&records).await.context(SidecarSnafu)?;
        self.records = records;
        self.pending_renames.clear();

        let path = self.exclude_path();
        let document: Document = path.as_path().async_try_into().await.context(WorkzoneSnafu)?;
        let current = document.text();
        let prepared = Document::from_content(&ensure_workzone(&current));
        let next = splice(&prepared, &self.tree).context(WorkzoneSnafu)?;

        let wrote_exclude = if next == current {
            debug!("Exclude file unchanged, skipping write");
            false
        } else {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent).await;
            }
            let BufResult(result, _buffer) = fs::write(&path, next.into_bytes()).await;
            result
                .map_err(|source| WorkzoneError::WriteError {
                    file_path: path.best_effort_path_display(),
                    source,
                })
                .context(WorkzoneSnafu)?;
            debug!("Wrote exclude file: {}", path.best_effort_path_display());
            true
        };

        self.initialized = true;
        if wrote_sidecar || wrote_exclude {
            self.refresh.notify();
        }
        Ok(wrote_sidecar || wrote_exclude)
    }

    /// First-run setup: imports whatever already exists, seeds the default
    /// changelist when the tree is empty, and persists both stores. Safe to
    /// run repeatedly.
    pub async fn init(&mut self) -> Result<(), SessionError> {
        self.load().await?;

        if self.tree.is_empty() {
            self.tree
                .create_changelist(DEFAULT_CHANGELIST, Vec::<&str>::new())
                .context(TreeSnafu)?;
            self.tree.insert_placeholder(DEFAULT_CHANGELIST);
        }

        self.persist().await?;
        info!(
            "Changelists initialized in {}",
            self.root.best_effort_path_display()
        );
        Ok(())
    }

    /// Re-pulls state after an external edit and signals the host.
    pub async fn reload(&mut self) -> Result<(), SessionError> {
        self.load().await?;
        self.refresh.notify();
        Ok(())
    }

    pub async fn create_changelist(
        &mut self,
        name: &str,
        files: &[String],
    ) -> Result<(), SessionError> {
        self.require_initialized()?;
        self.tree.create_changelist(name, files).context(TreeSnafu)?;

        let members = self.member_files(name);
        if members.is_empty() {
            self.tree.insert_placeholder(name);
        } else {
            self.hide_tracked(&members).await;
        }

        self.persist().await.map(|_| ())
    }

    pub async fn rename_changelist(&mut self, old: &str, new: &str) -> Result<(), SessionError> {
        self.require_initialized()?;

        let old_key = strip_label_padding(old).to_string();
        let new_key = strip_label_padding(new).to_string();
        self.tree.rename(&old_key, &new_key).context(TreeSnafu)?;

        if old_key != new_key {
            // Chained renames within one session still point at the
            // original persisted name
            let origin = self.pending_renames.remove(&old_key).unwrap_or(old_key);
            self.pending_renames.insert(new_key, origin);
        }

        self.persist().await.map(|_| ())
    }

    /// Removes a changelist and restores index visibility of its tracked
    /// members. No-op when the changelist is absent.
    pub async fn remove_changelist(&mut self, name: &str) -> Result<(), SessionError> {
        self.require_initialized()?;

        let members = self.member_files(name);
        self.tree.remove(name);
        self.restore_tracked(&members).await;

        self.persist().await.map(|_| ())
    }

    /// Adds a file to a changelist, detaching it from its previous one
    /// first. Tracked files are hidden from the index on the way in.
    pub async fn add_file(&mut self, changelist: &str, path: &str) -> Result<(), SessionError> {
        self.require_initialized()?;

        // Validate the target before detaching, so a failed add leaves the
        // tree exactly as it was
        if !self.tree.contains(changelist) {
            return Err(TreeError::UnknownChangelist {
                name: strip_label_padding(changelist).to_string(),
            })
            .context(TreeSnafu);
        }

        let normalized = normalize_path(path);
        if let Some(current) = self.tree.changelist_of(&normalized).map(str::to_string) {
            if current != strip_label_padding(changelist) {
                self.tree
                    .remove_file(&current, &normalized)
                    .context(TreeSnafu)?;
                self.reinsert_placeholder_if_emptied(&current);
            }
        }

        let changed = self.tree.add_file(changelist, &normalized).context(TreeSnafu)?;
        if changed {
            self.hide_tracked(std::slice::from_ref(&normalized)).await;
        }

        self.persist().await.map(|_| ())
    }

    /// Removes a file from whichever changelist holds it and restores its
    /// index visibility.
    pub async fn remove_file(&mut self, path: &str) -> Result<(), SessionError> {
        self.require_initialized()?;

        let normalized = normalize_path(path);
        let changelist = self.containing_changelist(&normalized)?;

        self.tree
            .remove_file(&changelist, &normalized)
            .context(TreeSnafu)?;
        self.reinsert_placeholder_if_emptied(&changelist);
        self.restore_tracked(std::slice::from_ref(&normalized)).await;

        self.persist().await.map(|_| ())
    }

    /// Detaches every member of a changelist, restores tracked members'
    /// visibility, persists the emptied list, then force-adds all former
    /// members so previously-hidden files reach the staging area.
    pub async fn stage_changelist(&mut self, name: &str) -> Result<(), SessionError> {
        self.require_initialized()?;

        let paths = self.member_files(name);
        if !self.tree.contains(name) {
            return Err(TreeError::UnknownChangelist {
                name: strip_label_padding(name).to_string(),
            })
            .context(TreeSnafu);
        }

        for path in &paths {
            self.tree.remove_file(name, path).context(TreeSnafu)?;
        }
        self.tree.insert_placeholder(name);
        self.restore_tracked(&paths).await;
        self.persist().await?;

        if !paths.is_empty() {
            let _ = git::try_run(&self.root, &GitCommand::ForceAdd { paths }).await;
        }
        Ok(())
    }

    /// Single-file variant of [`Self::stage_changelist`].
    pub async fn stage_file(&mut self, path: &str) -> Result<(), SessionError> {
        self.require_initialized()?;

        let normalized = normalize_path(path);
        let changelist = self.containing_changelist(&normalized)?;

        self.tree
            .remove_file(&changelist, &normalized)
            .context(TreeSnafu)?;
        self.reinsert_placeholder_if_emptied(&changelist);
        self.restore_tracked(std::slice::from_ref(&normalized)).await;
        self.persist().await?;

        let _ = git::try_run(
            &self.root,
            &GitCommand::ForceAdd {
                paths: vec![normalized],
            },
        )
        .await;
        Ok(())
    }

    pub fn require_initialized(&self) -> Result<(), SessionError> {
        if self.initialized {
            Ok(())
        } else {
            NotInitializedSnafu.fail()
        }
    }

    fn member_files(&self, name: &str) -> Vec<String> {
        self.tree
            .members(name)
            .map(|members| members.files().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn containing_changelist(&self, normalized: &str) -> Result<String, SessionError> {
        self.tree
            .changelist_of(normalized)
            .map(str::to_string)
            .ok_or_else(|| SessionError::FileNotInChangelist {
                path: normalized.to_string(),
            })
    }

    fn reinsert_placeholder_if_emptied(&mut self, name: &str) {
        if self.tree.members(name).is_some_and(MemberSet::is_empty) {
            self.tree.insert_placeholder(name);
        }
    }

    /// Marks tracked paths assume-unchanged, in parallel, best-effort.
    async fn hide_tracked(&self, paths: &[String]) {
        self.batch_visibility(paths, |path| GitCommand::AssumeUnchanged { path })
            .await;
    }

    /// Clears the assume-unchanged bit of tracked paths, in parallel,
    /// best-effort.
    async fn restore_tracked(&self, paths: &[String]) {
        self.batch_visibility(paths, |path| GitCommand::NoAssumeUnchanged { path })
            .await;
    }

    async fn batch_visibility(&self, paths: &[String], command: impl Fn(String) -> GitCommand) {
        if paths.is_empty() {
            return;
        }

        // One status capture covers the whole batch; untracked paths have no
        // index entry to flag
        let status = git::query_status(&self.root).await;
        let items: Vec<BatchItem> = paths
            .iter()
            .filter(|path| !git::is_untracked(path, &status))
            .map(|path| BatchItem {
                path: path.clone(),
                command: command(path.clone()),
            })
            .collect();

        if !items.is_empty() {
            self.batch.run(items).await;
        }
    }
}

#[derive(Debug, Snafu)]
pub enum SessionError {
    #[snafu(display("Changelists are not initialized here, run 'init' first"))]
    NotInitialized,
    #[snafu(display("File '{}' is not in any changelist", path))]
    FileNotInChangelist { path: String },
    #[snafu(display("Changelist operation failed"))]
    TreeError { source: TreeError },
    #[snafu(display("Exclude file operation failed"))]
    WorkzoneError { source: WorkzoneError },
    #[snafu(display("Changelist config operation failed"))]
    SidecarError { source: SidecarError },
    #[snafu(display("Failed to set up the git command dispatcher"))]
    BatchCreationError { source: GitBatchCreationError },
}
