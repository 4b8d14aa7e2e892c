//! # Undo/Redo Stack
//!
//! Two-pointer history of commands.
//!
//! ## Design
//!
//! - Commands are kept in one list with a done-count pointer
//! - Undo moves the pointer back, redo moves it forward
//! - Pushing a new command discards everything past the pointer
//! - An optional level limit drops the oldest commands
//!
//! The stack only stores commands; replaying them is up to the owner.

use std::rc::Rc;

#[derive(Debug)]
struct Entry<C> {
    command: Rc<C>,
    title: Option<String>,
}

/// Undo/redo history
#[derive(Debug)]
pub struct UndoStack<C> {
    entries: Vec<Entry<C>>,

    /// Number of entries that are currently applied
    done_count: usize,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl<C> UndoStack<C> {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            entries: Vec::new(),
            done_count: 0,
            max_levels,
        }
    }

    /// Push a command, discarding the redo tail
    pub fn push(&mut self, command: Rc<C>) {
        self.entries.truncate(self.done_count);
        self.entries.push(Entry {
            command,
            title: None,
        });
        self.done_count += 1;

        if self.max_levels > 0 && self.entries.len() > self.max_levels {
            self.entries.remove(0);
            self.done_count -= 1;
        }
    }

    /// Step back, returning the command to revert
    pub fn undo(&mut self) -> Option<Rc<C>> {
        if self.done_count == 0 {
            return None;
        }
        self.done_count -= 1;
        Some(self.entries[self.done_count].command.clone())
    }

    /// Step forward, returning the command to reapply
    pub fn redo(&mut self) -> Option<Rc<C>> {
        let entry = self.entries.get(self.done_count)?;
        let command = entry.command.clone();
        self.done_count += 1;
        Some(command)
    }

    pub fn can_undo(&self) -> bool {
        self.done_count > 0
    }

    pub fn can_redo(&self) -> bool {
        self.done_count < self.entries.len()
    }

    pub fn undo_levels(&self) -> usize {
        self.done_count
    }

    pub fn redo_levels(&self) -> usize {
        self.entries.len() - self.done_count
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.done_count = 0;
    }

    /// Title the most recently applied command
    pub fn set_title(&mut self, title: impl Into<String>) {
        if let Some(index) = self.done_count.checked_sub(1) {
            if let Some(entry) = self.entries.get_mut(index) {
                entry.title = Some(title.into());
            }
        }
    }

    /// Title of the command `undo` would revert
    pub fn undo_title(&self) -> Option<&str> {
        self.done_count
            .checked_sub(1)
            .and_then(|index| self.entries.get(index))
            .and_then(|entry| entry.title.as_deref())
    }

    /// Title of the command `redo` would reapply
    pub fn redo_title(&self) -> Option<&str> {
        self.entries
            .get(self.done_count)
            .and_then(|entry| entry.title.as_deref())
    }
}

impl<C> Default for UndoStack<C> {
    fn default() -> Self {
        Self::new()
    }
}
