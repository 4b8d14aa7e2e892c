//! # Reshaper Editor
//!
//! Document tree engine for the Reshaper visual editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ syntax: source text → SyntaxTree            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Workspace                           │
//! │  - Store: id → immutable NodeData           │
//! │  - Parenting: ordered children per parent   │
//! │  - InstanceManager: one Node per id         │
//! │  - Selection + expansion                    │
//! │  - UndoManager: coalesced store commands    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ reconstruct: store → SyntaxTree → print     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Store is the source of truth** while a file is open; the syntax tree
//!    is rebuilt from it on save
//! 2. **Ids, not pointers**: parents and children are id lookups, never
//!    object references
//! 3. **Order keys**: moving a node rewrites only that node's record
//! 4. **Explicit invalidation**: derived views recompute lazily after a
//!    recorded change
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reshaper_editor::Workspace;
//!
//! let workspace = Workspace::new();
//! let tree = reshaper_syntax::parse(source)?;
//! let root = workspace.load_file_ast("src/App.jsx", tree)?;
//!
//! // Move the last element of the first statement to the front
//! let statement = root.child_at(0).unwrap();
//! let div = statement.child_at(0).unwrap();
//! let children = div.children();
//! div.insert_before(&children[children.len() - 1..], children.first());
//!
//! // Write back
//! let tree = workspace.to_modified_syntax_tree("src/App.jsx")?;
//! let source = reshaper_syntax::print(&tree);
//!
//! workspace.undo().undo();
//! ```

mod build;
mod data;
mod errors;
mod file;
mod instances;
mod node;
mod order_key;
mod parenting;
mod reconstruct;
mod selection;
mod store;
mod undo_manager;
mod undo_stack;
mod workspace;

pub use data::{NodeData, NodeSource, OutlineNode};
pub use errors::{EditorError, EditorResult};
pub use file::{document_seed, File, IdGenerator, FILE_ROOT_PREFIX};
pub use instances::InstanceManager;
pub use node::{Node, NodeInstance};
pub use order_key::{key_between, n_keys_between, DEFAULT_KEY};
pub use parenting::{ChildList, Parented, Parenting};
pub use selection::Selection;
pub use store::{Store, StoreChange, Subscription, WeakStore};
pub use undo_manager::{Command, PauseGuard, UndoManager, DEFAULT_MAX_LEVELS, DEFAULT_UNDO_WINDOW};
pub use undo_stack::UndoStack;
pub use workspace::{Workspace, WorkspaceOptions, DEFAULT_CLASS_ATTRIBUTE};
