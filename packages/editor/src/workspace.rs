//! # Workspace
//!
//! Owns the node store and everything derived from it, and keeps each open
//! file's subtree in step with its syntax tree.
//!
//! ```text
//!  SyntaxTree ──build──▶ Store<NodeData> ──▶ Parenting / InstanceManager
//!      ▲                      │                   │
//!      │                      ▼                   ▼
//!  reconstruct ◀──────── UndoManager         Node facades
//! ```
//!
//! Building a file always runs with undo recording paused and clears the
//! history afterwards: node ids are minted per build, so older commands
//! would refer to entries that no longer exist.

use crate::build::TreeBuilder;
use crate::data::NodeData;
use crate::errors::{EditorError, EditorResult};
use crate::file::{File, IdGenerator, FILE_ROOT_PREFIX};
use crate::instances::InstanceManager;
use crate::node::{Node, NodeInstance};
use crate::parenting::Parenting;
use crate::reconstruct::Reconstructor;
use crate::selection::Selection;
use crate::store::Store;
use crate::undo_manager::{UndoManager, DEFAULT_MAX_LEVELS, DEFAULT_UNDO_WINDOW};
use indexmap::IndexMap;
use reshaper_syntax::{format_tag, parse_tag, ElementCollector, Location, SyntaxKind, SyntaxTree};
use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Attribute holding an element's classes unless configured otherwise
pub const DEFAULT_CLASS_ATTRIBUTE: &str = "className";

#[derive(Debug, Clone)]
pub struct WorkspaceOptions {
    pub undo_window: Duration,
    pub undo_max_levels: usize,
    pub class_attribute: String,
}

impl Default for WorkspaceOptions {
    fn default() -> Self {
        Self {
            undo_window: DEFAULT_UNDO_WINDOW,
            undo_max_levels: DEFAULT_MAX_LEVELS,
            class_attribute: DEFAULT_CLASS_ATTRIBUTE.to_string(),
        }
    }
}

/// Index paths of selected and expanded nodes below a file root
#[derive(Default)]
struct ViewSnapshot {
    selected: Vec<Vec<usize>>,
    expanded: Vec<Vec<usize>>,
}

pub struct Workspace {
    store: Store<NodeData>,
    parenting: Parenting<NodeData>,
    instances: InstanceManager<NodeData, NodeInstance>,
    selection: Selection,
    undo: UndoManager,
    files: RefCell<IndexMap<String, File>>,
    hovered: RefCell<Option<String>>,
    options: WorkspaceOptions,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_options(WorkspaceOptions::default())
    }

    pub fn with_options(options: WorkspaceOptions) -> Self {
        let store = Store::new();
        let parenting = Parenting::new(&store);
        let instances = InstanceManager::new(&store, NodeInstance::new);
        let undo = UndoManager::with_options(options.undo_window, options.undo_max_levels);
        undo.track(&store);

        Self {
            store,
            parenting,
            instances,
            selection: Selection::new(),
            undo,
            files: RefCell::new(IndexMap::new()),
            hovered: RefCell::new(None),
            options,
        }
    }

    pub fn store(&self) -> &Store<NodeData> {
        &self.store
    }

    pub fn parenting(&self) -> &Parenting<NodeData> {
        &self.parenting
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn undo(&self) -> &UndoManager {
        &self.undo
    }

    pub fn options(&self) -> &WorkspaceOptions {
        &self.options
    }

    // ---- Nodes ----

    pub fn node(&self, id: &str) -> EditorResult<Node<'_>> {
        let instance = self.instances.get(id)?;
        Ok(Node::new(self, instance))
    }

    pub fn safe_node(&self, id: &str) -> Option<Node<'_>> {
        let instance = self.instances.safe_get(id)?;
        Some(Node::new(self, instance))
    }

    /// Parentless entries, which are the file roots
    pub fn roots(&self) -> Vec<Node<'_>> {
        self.parenting
            .get_roots()
            .items
            .iter()
            .filter_map(|id| self.safe_node(id))
            .collect()
    }

    /// Selected nodes in selection order
    pub fn selected_nodes(&self) -> Vec<Node<'_>> {
        self.selection
            .ids()
            .iter()
            .filter_map(|id| self.safe_node(id))
            .collect()
    }

    pub fn clear_selection(&self) {
        self.selection.clear();
    }

    pub fn select_between(&self, nodes: &[Node<'_>]) {
        Node::select_between(nodes);
    }

    pub fn hovered(&self) -> Option<Node<'_>> {
        let id = self.hovered.borrow().clone()?;
        self.safe_node(&id)
    }

    pub fn set_hovered(&self, id: Option<&str>) {
        *self.hovered.borrow_mut() = id.map(str::to_string);
    }

    pub(crate) fn clear_hovered_if(&self, id: &str) {
        let mut hovered = self.hovered.borrow_mut();
        if hovered.as_deref() == Some(id) {
            *hovered = None;
        }
    }

    // ---- Files ----

    /// Build the nodes of a newly opened file and return its root
    ///
    /// Loading a path that is already open re-parses it in place.
    pub fn load_file_ast(&self, path: &str, tree: SyntaxTree) -> EditorResult<Node<'_>> {
        if self.is_loaded(path) {
            return self.reload_file_ast(path, tree);
        }
        self.build_file(path, Arc::new(tree), 0);
        self.node(&File::root_id_for(path))
    }

    /// Replace a file's nodes with ones built from `tree`
    ///
    /// Selected and expanded nodes are restored by index path.
    pub fn reload_file_ast(&self, path: &str, tree: SyntaxTree) -> EditorResult<Node<'_>> {
        let generation = self
            .file(path)
            .map(|file| file.generation() + 1)
            .ok_or_else(|| EditorError::file_not_loaded(path))?;
        let root = self.node(&File::root_id_for(path))?;

        let snapshot = Self::snapshot(&root);
        {
            let _paused = self.undo.pause();
            for child in root.children() {
                child.remove();
            }
        }

        self.build_file(path, Arc::new(tree), generation);

        for index_path in &snapshot.selected {
            if let Some(node) = root.descendant_at(index_path) {
                node.select();
            }
        }
        for index_path in &snapshot.expanded {
            if let Some(node) = root.descendant_at(index_path) {
                node.set_expanded(true);
            }
        }

        tracing::debug!(
            path,
            selected = snapshot.selected.len(),
            expanded = snapshot.expanded.len(),
            "restored view state"
        );
        Ok(root)
    }

    /// Remove a file and its nodes
    pub fn close_file(&self, path: &str) -> EditorResult<()> {
        let root = self.node(&File::root_id_for(path))?;
        {
            let _paused = self.undo.pause();
            root.remove();
        }
        self.files.borrow_mut().shift_remove(path);
        self.undo.clear();
        tracing::info!(path, "closed file");
        Ok(())
    }

    pub fn file(&self, path: &str) -> Option<Ref<'_, File>> {
        Ref::filter_map(self.files.borrow(), |files| files.get(path)).ok()
    }

    /// Paths of the open files in load order
    pub fn files(&self) -> Vec<String> {
        self.files.borrow().keys().cloned().collect()
    }

    pub fn is_loaded(&self, path: &str) -> bool {
        self.files.borrow().contains_key(path)
    }

    pub fn file_root(&self, path: &str) -> Option<Node<'_>> {
        self.safe_node(&File::root_id_for(path))
    }

    fn snapshot(root: &Node<'_>) -> ViewSnapshot {
        let mut snapshot = ViewSnapshot::default();
        for node in root.descendants() {
            if node.selected() {
                snapshot.selected.push(node.index_path());
            }
            if node.expanded() {
                snapshot.expanded.push(node.index_path());
            }
        }
        snapshot
    }

    fn build_file(&self, path: &str, tree: Arc<SyntaxTree>, generation: u32) {
        let _paused = self.undo.pause();
        let root_id = File::root_id_for(path);

        let order = match self.store.get(&root_id) {
            Some(existing) => existing.order.clone(),
            None => self.parenting.append_keys(None, 1).pop(),
        };
        self.store.set(
            root_id.clone(),
            NodeData {
                order,
                ..NodeData::file(tree.clone())
            },
        );

        let output = TreeBuilder::new(
            IdGenerator::new(path, generation),
            &self.options.class_attribute,
        )
        .build(&tree, &root_id);

        // Keys are computed up front: every parent is either new or emptied
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for entry in &output.entries {
            *counts.entry(entry.parent.clone()).or_default() += 1;
        }
        let mut keys: HashMap<String, std::vec::IntoIter<String>> = counts
            .into_iter()
            .map(|(parent, n)| {
                let keys = self.parenting.append_keys(Some(&parent), n);
                (parent, keys.into_iter())
            })
            .collect();

        let count = output.entries.len();
        for entry in output.entries {
            let order = keys.get_mut(&entry.parent).and_then(Iterator::next);
            self.store.set(
                entry.id,
                NodeData {
                    parent: Some(entry.parent),
                    order,
                    ..entry.data
                },
            );
        }

        let mut file = File::new(path, tree, generation);
        file.set_correlation(output.correlation);
        self.files.borrow_mut().insert(path.to_string(), file);
        self.undo.clear();

        tracing::info!(path, generation, nodes = count, "built file");
    }

    // ---- Synchronization ----

    /// Syntax tree of `path` with every store edit applied
    pub fn to_modified_syntax_tree(&self, path: &str) -> EditorResult<SyntaxTree> {
        let file = self
            .file(path)
            .ok_or_else(|| EditorError::file_not_loaded(path))?;
        let reconstructor = Reconstructor {
            store: &self.store,
            parenting: &self.parenting,
            class_attribute: &self.options.class_attribute,
        };
        Ok(reconstructor.tree(file.root_id(), file.tree()))
    }

    /// Renumber a file's elements to match the reconstructed source
    ///
    /// Call after writing the reconstruction back to disk, so the numbering
    /// agrees with the tags the preview build assigns to the new source.
    pub fn update_correlation_indices(&self, path: &str) -> EditorResult<()> {
        let tree = self.to_modified_syntax_tree(path)?;
        let root = self.node(&File::root_id_for(path))?;

        let by_source: HashMap<(Location, SyntaxKind), String> = root
            .descendants()
            .into_iter()
            .filter_map(|node| {
                let syntax = node.syntax()?;
                Some(((syntax.loc, syntax.kind()), node.id().to_string()))
            })
            .collect();

        let pairs: Vec<(usize, String)> = ElementCollector::collect(&tree)
            .into_iter()
            .enumerate()
            .filter_map(|(index, element)| {
                let id = by_source.get(&(element.loc, element.kind()))?;
                Some((index, id.clone()))
            })
            .collect();

        let mut files = self.files.borrow_mut();
        let file = files
            .get_mut(path)
            .ok_or_else(|| EditorError::file_not_loaded(path))?;
        tracing::debug!(path, elements = pairs.len(), "updated correlation indices");
        file.set_correlation(pairs);
        Ok(())
    }

    /// Node of the element numbered `index` in `path`
    pub fn node_for_location(&self, path: &str, index: usize) -> EditorResult<Node<'_>> {
        let id = self
            .file(path)
            .ok_or_else(|| EditorError::file_not_loaded(path))?
            .id_for_index(index)
            .map(str::to_string)
            .ok_or_else(|| EditorError::not_found(format_tag(path, index)))?;
        self.node(&id)
    }

    /// Node of a preview tag (`{path}:{index}`)
    pub fn node_for_tag(&self, tag: &str) -> EditorResult<Node<'_>> {
        let (path, index) = parse_tag(tag).ok_or_else(|| EditorError::InvalidTag {
            tag: tag.to_string(),
        })?;
        self.node_for_location(path, index)
    }

    pub fn correlation_index(&self, node: &Node<'_>) -> Option<usize> {
        let path = self.file_path_of(node)?;
        self.file(&path)?.index_for_id(node.id())
    }

    pub fn tag_for_node(&self, node: &Node<'_>) -> Option<String> {
        let index = self.correlation_index(node)?;
        Some(format_tag(&self.file_path_of(node)?, index))
    }

    /// Path of the file whose root `node` sits under
    pub fn file_path_of(&self, node: &Node<'_>) -> Option<String> {
        let root = node.root();
        if !root.data()?.is_file() {
            return None;
        }
        root.id()
            .strip_prefix(FILE_ROOT_PREFIX)
            .map(str::to_string)
    }
}
