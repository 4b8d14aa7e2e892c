use indexmap::IndexSet;
use std::cell::RefCell;
use std::rc::Rc;

/// Set of selected node ids, iterated in selection order
///
/// This is plain storage. The rule that a selected node has no selected
/// descendants is enforced by `Node::select`/`Node::deselect`.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: Rc<RefCell<IndexSet<String>>>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.borrow().contains(id)
    }

    /// Returns false if `id` was already selected
    pub fn insert(&self, id: &str) -> bool {
        self.ids.borrow_mut().insert(id.to_string())
    }

    /// Returns false if `id` was not selected
    pub fn remove(&self, id: &str) -> bool {
        self.ids.borrow_mut().shift_remove(id)
    }

    pub fn clear(&self) {
        self.ids.borrow_mut().clear();
    }

    pub fn ids(&self) -> Vec<String> {
        self.ids.borrow().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.borrow().is_empty()
    }
}
