use crate::errors::{EditorError, EditorResult};
use crate::store::{Store, StoreChange, Subscription};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Keeps exactly one live instance per store entry
///
/// Instances are built by the factory when an entry is added and dropped
/// when it is deleted, so they can hold state that is not part of the
/// record (such as whether a tree row is expanded) and be compared by
/// reference.
pub struct InstanceManager<T, I> {
    store: Store<T>,
    instances: Rc<RefCell<HashMap<String, Rc<I>>>>,
    _subscription: Subscription,
}

impl<T: 'static, I: 'static> InstanceManager<T, I> {
    pub fn new(store: &Store<T>, factory: impl Fn(&str) -> I + 'static) -> Self {
        let instances: HashMap<String, Rc<I>> = store
            .ids()
            .into_iter()
            .map(|id| {
                let instance = Rc::new(factory(&id));
                (id, instance)
            })
            .collect();
        let instances = Rc::new(RefCell::new(instances));

        let observed = instances.clone();
        let subscription = store.observe(move |change| match change {
            StoreChange::Add { id, .. } | StoreChange::Update { id, .. } => {
                let mut instances = observed.borrow_mut();
                if !instances.contains_key(id) {
                    instances.insert(id.clone(), Rc::new(factory(id)));
                }
            }
            StoreChange::Delete { id, .. } => {
                observed.borrow_mut().remove(id);
            }
        });

        Self {
            store: store.clone(),
            instances,
            _subscription: subscription,
        }
    }

    /// Instance for `id`, failing if the entry does not exist
    pub fn get(&self, id: &str) -> EditorResult<Rc<I>> {
        self.safe_get(id).ok_or_else(|| EditorError::not_found(id))
    }

    pub fn safe_get(&self, id: &str) -> Option<Rc<I>> {
        self.instances.borrow().get(id).cloned()
    }

    /// Write `data` to the store and return the entry's instance
    pub fn add(&self, id: &str, data: T) -> EditorResult<Rc<I>> {
        self.store.set(id, data);
        self.get(id)
    }

    pub fn len(&self) -> usize {
        self.instances.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.borrow().is_empty()
    }
}
