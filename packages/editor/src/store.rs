//! # Observable Store
//!
//! Maps stable string ids to immutable, reference-counted records.
//!
//! Records are never mutated in place: `set` replaces the record wholesale,
//! so any `Rc<T>` handed out earlier is a consistent snapshot. Every mutation
//! is published synchronously to the subscribed observers, after the data
//! borrow has been released, so observers may read the store or mutate it
//! again.

use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// A single store mutation
#[derive(Debug)]
pub enum StoreChange<T> {
    Add { id: String, new: Rc<T> },
    Update { id: String, old: Rc<T>, new: Rc<T> },
    Delete { id: String, old: Rc<T> },
}

impl<T> StoreChange<T> {
    pub fn id(&self) -> &str {
        match self {
            StoreChange::Add { id, .. }
            | StoreChange::Update { id, .. }
            | StoreChange::Delete { id, .. } => id,
        }
    }

    /// Record before the change (`None` for additions)
    pub fn old(&self) -> Option<&Rc<T>> {
        match self {
            StoreChange::Add { .. } => None,
            StoreChange::Update { old, .. } | StoreChange::Delete { old, .. } => Some(old),
        }
    }

    /// Record after the change (`None` for deletions)
    pub fn new_value(&self) -> Option<&Rc<T>> {
        match self {
            StoreChange::Add { new, .. } | StoreChange::Update { new, .. } => Some(new),
            StoreChange::Delete { .. } => None,
        }
    }
}

type Observer<T> = Rc<dyn Fn(&StoreChange<T>)>;

struct StoreInner<T> {
    data: RefCell<IndexMap<String, Rc<T>>>,
    observers: RefCell<Vec<(u64, Observer<T>)>>,
    next_observer: Cell<u64>,
}

/// Shared handle to an observable id → record map
pub struct Store<T> {
    inner: Rc<StoreInner<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("len", &self.inner.data.borrow().len())
            .field("observers", &self.inner.observers.borrow().len())
            .finish()
    }
}

impl<T: 'static> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Store<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(StoreInner {
                data: RefCell::new(IndexMap::new()),
                observers: RefCell::new(Vec::new()),
                next_observer: Cell::new(0),
            }),
        }
    }

    pub fn get(&self, id: &str) -> Option<Rc<T>> {
        self.inner.data.borrow().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.data.borrow().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.data.borrow().is_empty()
    }

    /// Ids in insertion order
    pub fn ids(&self) -> Vec<String> {
        self.inner.data.borrow().keys().cloned().collect()
    }

    /// Snapshot of all entries in insertion order
    pub fn entries(&self) -> Vec<(String, Rc<T>)> {
        self.inner
            .data
            .borrow()
            .iter()
            .map(|(id, value)| (id.clone(), value.clone()))
            .collect()
    }

    /// Insert or replace a record
    pub fn set(&self, id: impl Into<String>, value: T) -> Rc<T> {
        let value = Rc::new(value);
        self.set_rc(id, value.clone());
        value
    }

    /// Insert or replace a record with an already shared value
    pub fn set_rc(&self, id: impl Into<String>, value: Rc<T>) {
        let id = id.into();
        let old = self.inner.data.borrow_mut().insert(id.clone(), value.clone());
        let change = match old {
            Some(old) => StoreChange::Update { id, old, new: value },
            None => StoreChange::Add { id, new: value },
        };
        self.notify(&change);
    }

    /// Replace a record with `f(current)`. Returns `None` if the id is absent.
    pub fn update(&self, id: &str, f: impl FnOnce(&T) -> T) -> Option<Rc<T>> {
        let current = self.get(id)?;
        Some(self.set(id, f(&current)))
    }

    /// Remove a record. Deleting an absent id is a no-op.
    pub fn delete(&self, id: &str) -> Option<Rc<T>> {
        let old = self.inner.data.borrow_mut().shift_remove(id)?;
        self.notify(&StoreChange::Delete {
            id: id.to_string(),
            old: old.clone(),
        });
        Some(old)
    }

    /// Subscribe to changes. The observer stays registered until the
    /// returned [`Subscription`] is dropped.
    pub fn observe(&self, observer: impl Fn(&StoreChange<T>) + 'static) -> Subscription {
        let key = self.inner.next_observer.get();
        self.inner.next_observer.set(key + 1);
        let observer: Observer<T> = Rc::new(observer);
        self.inner.observers.borrow_mut().push((key, observer));

        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.observers.borrow_mut().retain(|(k, _)| *k != key);
            }
        })
    }

    pub fn downgrade(&self) -> WeakStore<T> {
        WeakStore {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Store<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Address identifying this store across type-erased handles
    pub(crate) fn key(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }

    fn notify(&self, change: &StoreChange<T>) {
        let observers: Vec<Observer<T>> = self
            .inner
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();

        for observer in observers {
            observer(change);
        }
    }
}

/// Non-owning store handle, used by observers that must not keep the store alive
pub struct WeakStore<T> {
    inner: Weak<StoreInner<T>>,
}

impl<T> WeakStore<T> {
    pub fn upgrade(&self) -> Option<Store<T>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

/// Unsubscribes its observer when dropped
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}
