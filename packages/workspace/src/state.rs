//! Editing session over files read and written through a [`SourceIo`]
//!
//! ```text
//! load_file ──▶ SourceIo::load_text ──▶ parse ──▶ Workspace::load_file_ast
//!
//! store change ──▶ mark file dirty, push save deadline
//!
//! run_pending_save ──▶ sleep until the latest deadline
//!                  ──▶ reconstruct + print
//!                  ──▶ SourceIo::save_text
//!                  ──▶ publish ExternalEdit
//!                  ──▶ renumber correlation indices
//! ```
//!
//! Changes made while a file is being built or torn down are not edits and
//! never schedule a save.

use crate::config::EditorConfig;
use crate::error::{StateError, StateResult};
use crate::io::SourceIo;
use indexmap::IndexSet;
use reshaper_editor::{
    EditorError, Node, NodeData, Store, StoreChange, Subscription, Workspace, FILE_ROOT_PREFIX,
};
use reshaper_syntax::{annotate, parse, parse_tag, print};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

/// Capacity of the external edit channel
const EDIT_CHANNEL_CAPACITY: usize = 64;

/// Printed source of a file, published once it is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalEdit {
    pub file_path: String,
    pub source: String,
}

/// Files waiting to be written and when
struct SaveQueue {
    debounce: Duration,
    deadline: Cell<Option<Instant>>,
    dirty: RefCell<IndexSet<String>>,
    suspended: Cell<usize>,
}

impl SaveQueue {
    fn schedule(&self, path: String) {
        self.dirty.borrow_mut().insert(path);
        self.deadline.set(Some(Instant::now() + self.debounce));
    }

    fn take(&self) -> Vec<String> {
        self.dirty.borrow_mut().drain(..).collect()
    }

    fn restore(&self, paths: &[String]) {
        self.dirty.borrow_mut().extend(paths.iter().cloned());
    }

    fn forget(&self, path: &str) {
        self.dirty.borrow_mut().shift_remove(path);
    }

    fn suspend(queue: &Rc<Self>) -> Suspended {
        queue.suspended.set(queue.suspended.get() + 1);
        Suspended(queue.clone())
    }
}

struct Suspended(Rc<SaveQueue>);

impl Drop for Suspended {
    fn drop(&mut self) {
        self.0.suspended.set(self.0.suspended.get().saturating_sub(1));
    }
}

/// Path of the file whose subtree a change touched
fn owning_file(store: &Store<NodeData>, change: &StoreChange<NodeData>) -> Option<String> {
    let mut id = change.id().to_string();
    let mut record = change.new_value().or(change.old())?.clone();
    while let Some(parent) = record.parent.clone() {
        record = store.get(&parent)?;
        id = parent;
    }
    if !record.is_file() {
        return None;
    }
    id.strip_prefix(FILE_ROOT_PREFIX).map(str::to_string)
}

pub struct EditorState<S> {
    io: S,
    config: EditorConfig,
    workspace: Workspace,
    active_file: Option<String>,
    saves: Rc<SaveQueue>,
    edits: broadcast::Sender<ExternalEdit>,
    _subscription: Subscription,
}

impl<S: SourceIo> EditorState<S> {
    pub fn new(io: S, config: EditorConfig) -> Self {
        let workspace = Workspace::with_options(config.workspace_options());
        let saves = Rc::new(SaveQueue {
            debounce: config.save_debounce(),
            deadline: Cell::new(None),
            dirty: RefCell::new(IndexSet::new()),
            suspended: Cell::new(0),
        });

        let queue = Rc::downgrade(&saves);
        let store = workspace.store().downgrade();
        let subscription = workspace.store().observe(move |change| {
            let (Some(queue), Some(store)) = (queue.upgrade(), store.upgrade()) else {
                return;
            };
            if queue.suspended.get() > 0 {
                return;
            }
            if let Some(path) = owning_file(&store, change) {
                queue.schedule(path);
            }
        });

        let (edits, _) = broadcast::channel(EDIT_CHANNEL_CAPACITY);

        Self {
            io,
            config,
            workspace,
            active_file: None,
            saves,
            edits,
            _subscription: subscription,
        }
    }

    pub fn io(&self) -> &S {
        &self.io
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    // ---- Files ----

    /// Open a file and make it active. Opening an open file only activates it.
    pub async fn load_file(&mut self, path: &str) -> StateResult<()> {
        if self.workspace.is_loaded(path) {
            self.active_file = Some(path.to_string());
            return Ok(());
        }

        let text = self.io.load_text(path).await?;
        let tree = parse(&text)?;
        {
            let _suspended = SaveQueue::suspend(&self.saves);
            self.workspace.load_file_ast(path, tree)?;
        }

        self.active_file = Some(path.to_string());
        tracing::info!(path, bytes = text.len(), "loaded file");
        Ok(())
    }

    /// Re-read and re-parse an open file, discarding unsaved edits to it
    ///
    /// On a syntax error the current nodes are kept.
    pub async fn reload_file(&mut self, path: &str) -> StateResult<()> {
        if !self.workspace.is_loaded(path) {
            return Err(EditorError::file_not_loaded(path).into());
        }

        let text = self.io.load_text(path).await?;
        let tree = match parse(&text) {
            Ok(tree) => tree,
            Err(err) => {
                tracing::warn!(path, error = %err, "reload failed, keeping previous tree");
                return Err(err.into());
            }
        };

        {
            let _suspended = SaveQueue::suspend(&self.saves);
            self.workspace.reload_file_ast(path, tree)?;
        }
        self.saves.forget(path);
        tracing::info!(path, "reloaded file");
        Ok(())
    }

    pub fn close_file(&mut self, path: &str) -> StateResult<()> {
        {
            let _suspended = SaveQueue::suspend(&self.saves);
            self.workspace.close_file(path)?;
        }
        self.saves.forget(path);
        if self.active_file.as_deref() == Some(path) {
            self.active_file = None;
        }
        Ok(())
    }

    pub fn active_file(&self) -> Option<&str> {
        self.active_file.as_deref()
    }

    pub fn set_active_file(&mut self, path: &str) -> StateResult<()> {
        if !self.workspace.is_loaded(path) {
            return Err(EditorError::file_not_loaded(path).into());
        }
        self.active_file = Some(path.to_string());
        Ok(())
    }

    /// Root node of the active file
    pub fn active_root(&self) -> StateResult<Node<'_>> {
        let path = self.active_file.as_deref().ok_or(StateError::NoActiveFile)?;
        self.workspace
            .file_root(path)
            .ok_or_else(|| EditorError::file_not_loaded(path).into())
    }

    /// Open `path` if needed, then select the element numbered `index` and
    /// expand everything above it
    pub async fn reveal_location(&mut self, path: &str, index: usize) -> StateResult<Node<'_>> {
        self.load_file(path).await?;

        let node = self.workspace.node_for_location(path, index)?;
        self.workspace.clear_selection();
        node.select();
        node.expand_all_ancestors();
        Ok(node)
    }

    /// [`reveal_location`](Self::reveal_location) for a preview tag
    pub async fn reveal_tag(&mut self, tag: &str) -> StateResult<Node<'_>> {
        let (path, index) = parse_tag(tag).ok_or_else(|| EditorError::InvalidTag {
            tag: tag.to_string(),
        })?;
        let path = path.to_string();
        self.reveal_location(&path, index).await
    }

    /// Current source of `path` with every element tagged for the preview
    pub fn preview_source(&self, path: &str) -> StateResult<String> {
        let tree = self.workspace.to_modified_syntax_tree(path)?;
        Ok(print(&annotate(&tree, path, &self.config.tag_attribute)))
    }

    // ---- Saving ----

    /// Subscribe to the sources published by saves
    ///
    /// An edit is sent only after its file was written, so a failed save
    /// publishes nothing.
    pub fn on_external_edit(&self) -> broadcast::Receiver<ExternalEdit> {
        self.edits.subscribe()
    }

    /// Whether some file has edits that were not written yet
    pub fn has_pending_save(&self) -> bool {
        !self.saves.dirty.borrow().is_empty()
    }

    pub fn pending_files(&self) -> Vec<String> {
        self.saves.dirty.borrow().iter().cloned().collect()
    }

    /// Wait for the edits to settle, then write every dirty file once
    ///
    /// Returns the paths written. Nothing happens unless an edit was made
    /// since the last run. When a write fails the remaining files stay dirty
    /// and are retried after the next edit.
    pub async fn run_pending_save(&mut self) -> StateResult<Vec<String>> {
        loop {
            let Some(deadline) = self.saves.deadline.get() else {
                return Ok(Vec::new());
            };
            tokio::time::sleep_until(deadline).await;
            if self.saves.deadline.get() == Some(deadline) {
                break;
            }
        }
        self.saves.deadline.set(None);

        let paths = self.saves.take();
        let mut saved = Vec::with_capacity(paths.len());
        for (i, path) in paths.iter().enumerate() {
            if !self.workspace.is_loaded(path) {
                continue;
            }
            if let Err(err) = self.save_file(path).await {
                tracing::warn!(path = %path, error = %err, "save failed, retrying after the next edit");
                self.saves.restore(&paths[i..]);
                return Err(err);
            }
            saved.push(path.clone());
        }
        Ok(saved)
    }

    async fn save_file(&self, path: &str) -> StateResult<()> {
        let tree = self.workspace.to_modified_syntax_tree(path)?;
        let source = print(&tree);
        self.io.save_text(path, &source).await?;
        let bytes = source.len();

        let edit = ExternalEdit {
            file_path: path.to_string(),
            source,
        };
        if self.edits.send(edit).is_err() {
            tracing::debug!(path, "no edit listeners");
        }

        self.workspace.update_correlation_indices(path)?;
        tracing::info!(path, bytes, "saved file");
        Ok(())
    }
}
