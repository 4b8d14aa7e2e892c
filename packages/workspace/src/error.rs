use reshaper_editor::EditorError;
use reshaper_syntax::ParseError;
use thiserror::Error;

pub type StateResult<T> = Result<T, StateError>;

#[derive(Debug, Error)]
pub enum StateError {
    /// The source could not be parsed; the previous tree is kept
    #[error("Syntax error: {0}")]
    Syntax(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("No file is active")]
    NoActiveFile,

    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

impl StateError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }
}
