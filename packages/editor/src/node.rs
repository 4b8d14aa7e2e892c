//! # Node Facade
//!
//! A [`Node`] is a cheap handle pairing a workspace with the single live
//! [`NodeInstance`] of a store id. Every structural question (parent,
//! children, position) is answered from the store and the order index at
//! call time, so a handle never goes stale; it only stops resolving once its
//! entry is deleted.
//!
//! The only state kept outside the store is whether the node is expanded in
//! the tree view.

use crate::data::{NodeData, OutlineNode};
use crate::order_key::n_keys_between;
use crate::workspace::Workspace;
use reshaper_syntax::{format_tag, NodeKind, SyntaxKind, SyntaxNode};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// UI state attached to one store entry for its lifetime
#[derive(Debug)]
pub struct NodeInstance {
    id: String,
    expanded: Cell<bool>,
}

impl NodeInstance {
    pub(crate) fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            expanded: Cell::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Handle to a node of a [`Workspace`]
#[derive(Clone)]
pub struct Node<'w> {
    workspace: &'w Workspace,
    instance: Rc<NodeInstance>,
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.instance, &other.instance)
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node").field(&self.instance.id).finish()
    }
}

impl<'w> Node<'w> {
    pub(crate) fn new(workspace: &'w Workspace, instance: Rc<NodeInstance>) -> Self {
        Self {
            workspace,
            instance,
        }
    }

    pub fn id(&self) -> &str {
        &self.instance.id
    }

    pub fn workspace(&self) -> &'w Workspace {
        self.workspace
    }

    /// Current record, `None` once the entry has been deleted
    pub fn data(&self) -> Option<Rc<NodeData>> {
        self.workspace.store().get(self.id())
    }

    pub fn exists(&self) -> bool {
        self.workspace.store().contains(self.id())
    }

    // ---- Structure ----

    pub fn parent(&self) -> Option<Node<'w>> {
        let data = self.data()?;
        self.workspace.safe_node(data.parent.as_deref()?)
    }

    pub fn children(&self) -> Vec<Node<'w>> {
        self.workspace
            .parenting()
            .get_children(self.id())
            .items
            .iter()
            .filter_map(|id| self.workspace.safe_node(id))
            .collect()
    }

    pub fn child_at(&self, index: usize) -> Option<Node<'w>> {
        let children = self.workspace.parenting().get_children(self.id());
        self.workspace.safe_node(children.get(index)?)
    }

    /// Topmost ancestor, or the node itself when it has no parent
    pub fn root(&self) -> Node<'w> {
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    /// Ancestors ordered from the root down to the parent
    pub fn ancestors(&self) -> Vec<Node<'w>> {
        let mut ancestors = Vec::new();
        let mut current = self.parent();
        while let Some(node) = current {
            current = node.parent();
            ancestors.push(node);
        }
        ancestors.reverse();
        ancestors
    }

    /// All descendants in pre-order
    pub fn descendants(&self) -> Vec<Node<'w>> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants(&self, out: &mut Vec<Node<'w>>) {
        for child in self.children() {
            out.push(child.clone());
            child.collect_descendants(out);
        }
    }

    /// Children of the parent, including this node
    pub fn siblings(&self) -> Vec<Node<'w>> {
        self.parent()
            .map(|parent| parent.children())
            .unwrap_or_default()
    }

    /// Position among the parent's children
    pub fn index(&self) -> Option<usize> {
        let parent = self.data()?.parent.clone()?;
        self.workspace
            .parenting()
            .get_children(&parent)
            .index_of(self.id())
    }

    /// Positions from the root down to this node; empty for a root
    pub fn index_path(&self) -> Vec<usize> {
        let Some(parent) = self.parent() else {
            return Vec::new();
        };
        let mut path = parent.index_path();
        if let Some(index) = self.index() {
            path.push(index);
        }
        path
    }

    pub fn previous_sibling(&self) -> Option<Node<'w>> {
        let index = self.index()?.checked_sub(1)?;
        self.parent()?.child_at(index)
    }

    pub fn next_sibling(&self) -> Option<Node<'w>> {
        let index = self.index()?;
        self.parent()?.child_at(index + 1)
    }

    /// Whether `other` is a descendant of this node
    pub fn includes(&self, other: &Node<'_>) -> bool {
        let mut current = other.parent();
        while let Some(node) = current {
            if node.id() == self.id() {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Descendant reached by following `path` from this node
    pub fn descendant_at(&self, path: &[usize]) -> Option<Node<'w>> {
        path.iter()
            .try_fold(self.clone(), |node, index| node.child_at(*index))
    }

    // ---- Selection ----

    pub fn selected(&self) -> bool {
        self.workspace.selection().contains(self.id())
    }

    /// Whether this node or any of its ancestors is selected
    pub fn ancestor_selected(&self) -> bool {
        self.selected() || self.ancestors().iter().any(Node::selected)
    }

    pub fn select(&self) {
        for child in self.children() {
            child.deselect();
        }
        self.workspace.selection().insert(self.id());
    }

    pub fn deselect(&self) {
        self.workspace.selection().remove(self.id());
        for child in self.children() {
            child.deselect();
        }
    }

    /// Select every node visible between the first and last of `nodes`
    ///
    /// Nodes are ordered by index path; the walk follows the tree view, so
    /// collapsed subtrees are skipped.
    pub fn select_between(nodes: &[Node<'w>]) {
        let mut sorted: Vec<(Vec<usize>, &Node<'w>)> =
            nodes.iter().map(|node| (node.index_path(), node)).collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let (Some((_, first)), Some((_, last))) = (sorted.first(), sorted.last()) else {
            return;
        };

        let mut visited = vec![(*first).clone()];
        let mut current = (*first).clone();
        while current != **last {
            match current.next_in_tree_view() {
                Some(next) => {
                    visited.push(next.clone());
                    current = next;
                }
                None => break,
            }
        }

        first.workspace.clear_selection();
        for node in &visited {
            node.select();
        }
    }

    // ---- Tree view ----

    pub fn expanded(&self) -> bool {
        self.instance.expanded.get()
    }

    pub fn set_expanded(&self, expanded: bool) {
        self.instance.expanded.set(expanded);
    }

    pub fn expand_all_ancestors(&self) {
        for ancestor in self.ancestors() {
            ancestor.set_expanded(true);
        }
    }

    /// Row above this one in the tree view
    pub fn prev_in_tree_view(&self) -> Option<Node<'w>> {
        let Some(mut node) = self.previous_sibling() else {
            return self.parent();
        };
        while node.expanded() {
            match node.children().pop() {
                Some(last) => node = last,
                None => break,
            }
        }
        Some(node)
    }

    /// Row below this one in the tree view
    pub fn next_in_tree_view(&self) -> Option<Node<'w>> {
        if self.expanded() {
            if let Some(first) = self.child_at(0) {
                return Some(first);
            }
        }

        let mut node = self.clone();
        loop {
            if let Some(next) = node.next_sibling() {
                return Some(next);
            }
            node = node.parent()?;
        }
    }

    // ---- Mutation ----

    /// Whether the node can be deleted or moved elsewhere
    ///
    /// Children of statements, expression containers and file roots sit at a
    /// fixed place in the surrounding code and stay where they are.
    pub fn movable(&self) -> bool {
        !self.parent().map_or(false, |parent| parent.pins_children())
    }

    fn pins_children(&self) -> bool {
        self.data().map_or(false, |data| data.splices_children())
    }

    /// Delete this node and its subtree. Returns false for nodes that are
    /// not [`movable`](Self::movable).
    pub fn delete(&self) -> bool {
        if !self.movable() {
            tracing::warn!(id = self.id(), "node is pinned by its parent, not deleting");
            return false;
        }
        self.remove();
        true
    }

    /// Delete this node and its subtree unconditionally
    pub(crate) fn remove(&self) {
        for child in self.children() {
            child.remove();
        }
        self.workspace.selection().remove(self.id());
        self.workspace.clear_hovered_if(self.id());
        self.workspace.store().delete(self.id());
    }

    /// Move `nodes` under this node, in order, directly before `next`
    ///
    /// `next` of `None` appends. Nodes that are this node, one of its
    /// ancestors, or not [`movable`](Self::movable) are skipped, and nothing
    /// can be moved into a node that pins its children. Returns the nodes
    /// that were moved.
    pub fn insert_before(&self, nodes: &[Node<'w>], next: Option<&Node<'_>>) -> Vec<Node<'w>> {
        if self.pins_children() {
            tracing::warn!(parent = self.id(), "children are pinned, not inserting");
            return Vec::new();
        }

        let moved: Vec<Node<'w>> = nodes
            .iter()
            .filter(|node| *node != self && !node.includes(self) && node.movable())
            .cloned()
            .collect();
        if moved.is_empty() {
            return moved;
        }

        let parenting = self.workspace.parenting();
        let children = parenting.get_children(self.id());

        let next_index = next.and_then(|next| {
            let index = children.index_of(next.id());
            if index.is_none() {
                tracing::warn!(parent = self.id(), next = next.id(), "insert target is not a child, appending");
            }
            index
        });

        let prev_key = next_index
            .unwrap_or(children.len())
            .checked_sub(1)
            .and_then(|index| children.get(index))
            .and_then(|id| parenting.order_key_of(id));
        let next_key = next_index
            .and_then(|index| children.get(index))
            .and_then(|id| parenting.order_key_of(id));

        let keys = n_keys_between(prev_key.as_deref(), next_key.as_deref(), moved.len());

        tracing::debug!(parent = self.id(), count = moved.len(), "insert_before");
        for (node, key) in moved.iter().zip(keys) {
            self.workspace
                .store()
                .update(node.id(), |data| data.with_position(self.id(), key));
        }

        moved
    }

    pub fn append(&self, nodes: &[Node<'w>]) -> Vec<Node<'w>> {
        self.insert_before(nodes, None)
    }

    // ---- Syntax ----

    pub fn syntax(&self) -> Option<Arc<SyntaxNode>> {
        self.data()?.syntax().cloned()
    }

    /// `None` for file roots
    pub fn kind(&self) -> Option<SyntaxKind> {
        self.data()?.kind()
    }

    /// Tag name of an element
    pub fn name(&self) -> Option<String> {
        match &self.syntax()?.kind {
            NodeKind::Element(element) => Some(element.name.clone()),
            _ => None,
        }
    }

    pub fn may_have_children(&self) -> bool {
        matches!(
            self.kind(),
            Some(SyntaxKind::Element) | Some(SyntaxKind::Fragment)
        )
    }

    /// Whether the node can be dragged to another position in markup
    pub fn draggable(&self) -> bool {
        self.parent()
            .map_or(false, |parent| parent.may_have_children())
    }

    /// Whether other nodes can be dropped into this one
    pub fn droppable(&self) -> bool {
        self.may_have_children()
    }

    pub fn class_name(&self) -> Option<String> {
        self.data()?.class_name.clone()
    }

    /// Set the class overlay; ignored for anything but elements
    pub fn set_class_name(&self, class_name: impl Into<String>) {
        if self.kind() != Some(SyntaxKind::Element) {
            return;
        }
        let class_name = class_name.into();
        self.workspace.store().update(self.id(), |data| NodeData {
            class_name: Some(class_name),
            ..data.clone()
        });
    }

    pub fn text(&self) -> Option<String> {
        self.data()?.text.clone()
    }

    /// Set the text overlay; ignored for anything but text
    pub fn set_text(&self, text: impl Into<String>) {
        if self.kind() != Some(SyntaxKind::Text) {
            return;
        }
        let text = text.into();
        self.workspace.store().update(self.id(), |data| NodeData {
            text: Some(text),
            ..data.clone()
        });
    }

    pub fn label(&self) -> String {
        self.data()
            .map(|data| data.label(self.id()))
            .unwrap_or_default()
    }

    pub fn to_outline(&self) -> OutlineNode {
        OutlineNode {
            id: self.id().to_string(),
            label: self.label(),
            children: self.children().iter().map(Node::to_outline).collect(),
        }
    }

    // ---- Files ----

    /// Path of the file this node belongs to
    pub fn file_path(&self) -> Option<String> {
        self.workspace.file_path_of(self)
    }

    /// Preview tag of an element
    pub fn tag(&self) -> Option<String> {
        let path = self.file_path()?;
        let index = self.workspace.correlation_index(self)?;
        Some(format_tag(&path, index))
    }
}
