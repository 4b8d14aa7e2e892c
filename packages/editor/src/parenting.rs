//! # Order Index
//!
//! Derives ordered child lists from a store whose records name their parent
//! and carry a fractional order key.
//!
//! Membership is maintained incrementally from store events. Sorting is
//! deferred: a group is only re-sorted on the first read after its
//! membership or one of its members' order keys changed.

use crate::order_key::{n_keys_between, DEFAULT_KEY};
use crate::store::{Store, StoreChange, Subscription};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Records that can be placed in an ordered tree
pub trait Parented {
    fn parent(&self) -> Option<&str>;
    fn order_key(&self) -> Option<&str>;
}

/// Parent key used for entries without a parent
const ROOTS: &str = "";

/// Sorted children of one parent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildList {
    pub items: Vec<String>,
    pub indices: HashMap<String, usize>,
}

impl ChildList {
    fn from_items(items: Vec<String>) -> Self {
        let indices = items
            .iter()
            .enumerate()
            .map(|(index, id)| (id.clone(), index))
            .collect();
        Self { items, indices }
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.indices.get(id).copied()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Default)]
struct Group {
    members: HashSet<String>,
    sorted: Option<Rc<ChildList>>,
}

#[derive(Default)]
struct ParentingState {
    groups: HashMap<String, Group>,
}

impl ParentingState {
    fn insert(&mut self, parent: &str, id: &str) {
        let group = self.groups.entry(parent.to_string()).or_default();
        group.members.insert(id.to_string());
        group.sorted = None;
    }

    fn remove(&mut self, parent: &str, id: &str) {
        if let Some(group) = self.groups.get_mut(parent) {
            group.members.remove(id);
            group.sorted = None;
            if group.members.is_empty() {
                self.groups.remove(parent);
            }
        }
    }

    fn invalidate(&mut self, parent: &str) {
        if let Some(group) = self.groups.get_mut(parent) {
            group.sorted = None;
        }
    }

    fn apply<T: Parented>(&mut self, change: &StoreChange<T>) {
        match change {
            StoreChange::Add { id, new } => self.insert(parent_key(new.as_ref()), id),
            StoreChange::Update { id, old, new } => {
                let old_parent = parent_key(old.as_ref());
                let new_parent = parent_key(new.as_ref());
                if old_parent != new_parent {
                    self.remove(old_parent, id);
                    self.insert(new_parent, id);
                } else if old.order_key() != new.order_key() {
                    self.invalidate(new_parent);
                }
            }
            StoreChange::Delete { id, old } => self.remove(parent_key(old.as_ref()), id),
        }
    }
}

fn parent_key<T: Parented>(record: &T) -> &str {
    record.parent().unwrap_or(ROOTS)
}

/// Ordered parent → children index over a store
pub struct Parenting<T> {
    store: Store<T>,
    state: Rc<RefCell<ParentingState>>,
    _subscription: Subscription,
}

impl<T: Parented + 'static> Parenting<T> {
    /// Index the store's current entries and follow its changes
    pub fn new(store: &Store<T>) -> Self {
        let state = Rc::new(RefCell::new(ParentingState::default()));

        {
            let mut state = state.borrow_mut();
            for (id, record) in store.entries() {
                state.insert(parent_key(record.as_ref()), &id);
            }
        }

        let observed = state.clone();
        let subscription = store.observe(move |change| observed.borrow_mut().apply(change));

        Self {
            store: store.clone(),
            state,
            _subscription: subscription,
        }
    }

    /// Children of `parent`, sorted by order key then id
    pub fn get_children(&self, parent: &str) -> Rc<ChildList> {
        if let Some(sorted) = self
            .state
            .borrow()
            .groups
            .get(parent)
            .and_then(|group| group.sorted.clone())
        {
            return sorted;
        }

        let members: Vec<String> = match self.state.borrow().groups.get(parent) {
            Some(group) => group.members.iter().cloned().collect(),
            None => return Rc::new(ChildList::default()),
        };

        let mut keyed: Vec<(String, String)> = members
            .into_iter()
            .map(|id| {
                let key = self
                    .store
                    .get(&id)
                    .and_then(|record| record.order_key().map(str::to_string))
                    .unwrap_or_else(|| DEFAULT_KEY.to_string());
                (key, id)
            })
            .collect();
        keyed.sort();

        let sorted = Rc::new(ChildList::from_items(
            keyed.into_iter().map(|(_, id)| id).collect(),
        ));

        if let Some(group) = self.state.borrow_mut().groups.get_mut(parent) {
            group.sorted = Some(sorted.clone());
        }

        sorted
    }

    /// Entries without a parent
    pub fn get_roots(&self) -> Rc<ChildList> {
        self.get_children(ROOTS)
    }

    /// Keys for `n` entries appended after the current last child of `parent`
    pub fn append_keys(&self, parent: Option<&str>, n: usize) -> Vec<String> {
        let children = self.get_children(parent.unwrap_or(ROOTS));
        let last_key = children
            .items
            .last()
            .and_then(|id| self.store.get(id))
            .map(|record| record.order_key().unwrap_or(DEFAULT_KEY).to_string());
        n_keys_between(last_key.as_deref(), None, n)
    }

    /// Order key of an entry, with the default applied
    pub fn order_key_of(&self, id: &str) -> Option<String> {
        self.store
            .get(id)
            .map(|record| record.order_key().unwrap_or(DEFAULT_KEY).to_string())
    }
}
