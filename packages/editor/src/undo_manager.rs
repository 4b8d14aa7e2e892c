//! # Undo Manager
//!
//! Records store mutations into time-coalesced commands and replays them.
//!
//! ```text
//! store.set / store.delete
//!         │ (observer)
//!         ▼
//!   recording? ──no──▶ ignored (replaying or paused)
//!         │ yes
//!         ▼
//!   current command older than the window? ──yes──▶ push new command
//!         │ no
//!         ▼
//!   stage (id, old, new): first old wins, latest new wins
//! ```
//!
//! One command can span several stores. Undo writes each staged `old` back
//! (deleting where there was none), redo writes each `new`.

use crate::store::{Store, StoreChange, Subscription};
use crate::undo_stack::UndoStack;
use indexmap::IndexMap;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Default coalescing window
pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_millis(1000);

/// Default number of commands kept
pub const DEFAULT_MAX_LEVELS: usize = 100;

struct Delta<T> {
    old: Option<Rc<T>>,
    new: Option<Rc<T>>,
}

/// Staged changes for one store within a command
struct StoreChanges<T> {
    store: Store<T>,
    deltas: IndexMap<String, Delta<T>>,
}

impl<T: 'static> StoreChanges<T> {
    fn stage(&mut self, change: &StoreChange<T>) {
        match self.deltas.get_mut(change.id()) {
            Some(delta) => delta.new = change.new_value().cloned(),
            None => {
                self.deltas.insert(
                    change.id().to_string(),
                    Delta {
                        old: change.old().cloned(),
                        new: change.new_value().cloned(),
                    },
                );
            }
        }
    }

    fn write(&self, id: &str, value: &Option<Rc<T>>) {
        match value {
            Some(value) => self.store.set_rc(id, value.clone()),
            None => {
                self.store.delete(id);
            }
        }
    }
}

/// Type-erased view of [`StoreChanges`] so one command can hold several stores
trait StagedStore {
    fn store_key(&self) -> usize;
    fn revert(&self);
    fn reapply(&self);
    fn len(&self) -> usize;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> StagedStore for StoreChanges<T> {
    fn store_key(&self) -> usize {
        self.store.key()
    }

    fn revert(&self) {
        for (id, delta) in self.deltas.iter().rev() {
            self.write(id, &delta.old);
        }
    }

    fn reapply(&self) {
        for (id, delta) in &self.deltas {
            self.write(id, &delta.new);
        }
    }

    fn len(&self) -> usize {
        self.deltas.len()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// One undoable step
#[derive(Default)]
pub struct Command {
    stores: RefCell<Vec<Box<dyn StagedStore>>>,
}

impl Command {
    fn stage<T: 'static>(&self, store: &Store<T>, change: &StoreChange<T>) {
        let mut stores = self.stores.borrow_mut();
        let key = store.key();
        let index = match stores.iter().position(|staged| staged.store_key() == key) {
            Some(index) => index,
            None => {
                stores.push(Box::new(StoreChanges {
                    store: store.clone(),
                    deltas: IndexMap::new(),
                }));
                stores.len() - 1
            }
        };

        if let Some(staged) = stores[index].as_any_mut().downcast_mut::<StoreChanges<T>>() {
            staged.stage(change);
        }
    }

    fn revert(&self) {
        for staged in self.stores.borrow().iter().rev() {
            staged.revert();
        }
    }

    fn reapply(&self) {
        for staged in self.stores.borrow().iter() {
            staged.reapply();
        }
    }

    /// Number of distinct entries touched
    pub fn len(&self) -> usize {
        self.stores.borrow().iter().map(|staged| staged.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct UndoState {
    stack: RefCell<UndoStack<Command>>,
    current: RefCell<Option<Rc<Command>>>,
    last_staged: Cell<Option<Instant>>,
    window: Duration,
    replaying: Cell<bool>,
    paused: Cell<usize>,
}

impl UndoState {
    fn recording(&self) -> bool {
        !self.replaying.get() && self.paused.get() == 0
    }

    fn stage<T: 'static>(&self, store: &Store<T>, change: &StoreChange<T>) {
        if !self.recording() {
            return;
        }

        let now = Instant::now();
        let expired = self
            .last_staged
            .get()
            .map_or(true, |last| now.duration_since(last) > self.window);

        let current = self.current.borrow().clone();
        let command = match current {
            Some(command) if !expired => command,
            _ => {
                let command = Rc::new(Command::default());
                self.stack.borrow_mut().push(command.clone());
                *self.current.borrow_mut() = Some(command.clone());
                tracing::debug!("undo: new command");
                command
            }
        };

        self.last_staged.set(Some(now));
        command.stage(store, change);
    }

    /// Close the current command so the next change starts a new one
    fn close(&self) {
        *self.current.borrow_mut() = None;
        self.last_staged.set(None);
    }
}

/// Resets the replaying flag when dropped
struct ReplayGuard<'a>(&'a Cell<bool>);

impl<'a> ReplayGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for ReplayGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Suspends recording until dropped
#[must_use = "recording resumes as soon as the guard is dropped"]
pub struct PauseGuard {
    state: Rc<UndoState>,
}

impl Drop for PauseGuard {
    fn drop(&mut self) {
        self.state.paused.set(self.state.paused.get().saturating_sub(1));
    }
}

/// Undo/redo over one or more observed stores
pub struct UndoManager {
    state: Rc<UndoState>,
    subscriptions: RefCell<Vec<Subscription>>,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoManager {
    pub fn new() -> Self {
        Self::with_options(DEFAULT_UNDO_WINDOW, DEFAULT_MAX_LEVELS)
    }

    /// `window` is the coalescing window, `max_levels` of 0 keeps everything
    pub fn with_options(window: Duration, max_levels: usize) -> Self {
        Self {
            state: Rc::new(UndoState {
                stack: RefCell::new(UndoStack::with_max_levels(max_levels)),
                current: RefCell::new(None),
                last_staged: Cell::new(None),
                window,
                replaying: Cell::new(false),
                paused: Cell::new(0),
            }),
            subscriptions: RefCell::new(Vec::new()),
        }
    }

    /// Record mutations of `store`
    pub fn track<T: 'static>(&self, store: &Store<T>) {
        let state = Rc::downgrade(&self.state);
        let target = store.downgrade();
        let subscription = store.observe(move |change| {
            let (Some(state), Some(store)) = (state.upgrade(), target.upgrade()) else {
                return;
            };
            state.stage(&store, change);
        });
        self.subscriptions.borrow_mut().push(subscription);
    }

    /// Revert the most recent command. Returns whether anything was reverted.
    pub fn undo(&self) -> bool {
        let command = self.state.stack.borrow_mut().undo();
        self.state.close();

        let Some(command) = command else {
            return false;
        };

        tracing::debug!(entries = command.len(), "undo");
        let _replaying = ReplayGuard::enter(&self.state.replaying);
        command.revert();
        true
    }

    /// Reapply the most recently reverted command
    pub fn redo(&self) -> bool {
        let command = self.state.stack.borrow_mut().redo();
        self.state.close();

        let Some(command) = command else {
            return false;
        };

        tracing::debug!(entries = command.len(), "redo");
        let _replaying = ReplayGuard::enter(&self.state.replaying);
        command.reapply();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.state.stack.borrow().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.stack.borrow().can_redo()
    }

    pub fn undo_levels(&self) -> usize {
        self.state.stack.borrow().undo_levels()
    }

    pub fn redo_levels(&self) -> usize {
        self.state.stack.borrow().redo_levels()
    }

    /// End the current command; the next change starts a new one
    pub fn commit(&self) {
        self.state.close();
    }

    /// Drop all history
    pub fn clear(&self) {
        self.state.stack.borrow_mut().clear();
        self.state.close();
    }

    /// Stop recording until the returned guard is dropped
    pub fn pause(&self) -> PauseGuard {
        self.state.paused.set(self.state.paused.get() + 1);
        PauseGuard {
            state: self.state.clone(),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.state.recording()
    }

    /// Title the most recent command
    pub fn set_title(&self, title: impl Into<String>) {
        self.state.stack.borrow_mut().set_title(title);
    }

    pub fn undo_title(&self) -> Option<String> {
        self.state.stack.borrow().undo_title().map(str::to_string)
    }

    pub fn redo_title(&self) -> Option<String> {
        self.state.stack.borrow().redo_title().map(str::to_string)
    }
}
