//! Error types for the editor

use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("Node not found: {id}")]
    NotFound { id: String },

    #[error("File is not loaded: {path}")]
    FileNotLoaded { path: String },

    #[error("Invalid preview tag: {tag}")]
    InvalidTag { tag: String },
}

impl EditorError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn file_not_loaded(path: impl Into<String>) -> Self {
        Self::FileNotLoaded { path: path.into() }
    }
}
