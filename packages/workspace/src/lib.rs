//! File-backed editing sessions for the Reshaper visual editor
//!
//! Wraps a [`reshaper_editor::Workspace`] with source I/O, debounced
//! write-back, an edit channel for the live preview, and preview hit
//! testing.

pub mod config;
pub mod error;
pub mod io;
pub mod preview;
pub mod state;
pub mod watcher;

pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use error::{StateError, StateResult};
pub use io::{DiskIo, MemoryIo, SourceIo};
pub use preview::{Located, PreviewSurface, Rect, Viewport};
pub use state::{EditorState, ExternalEdit};
pub use watcher::{is_source_file, FileWatcher, WatcherError, WatcherResult, SOURCE_EXTENSIONS};
