//! Source text I/O

use crate::error::{StateError, StateResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Reads and writes the source text of editor files
#[async_trait]
pub trait SourceIo: Send + Sync {
    async fn load_text(&self, path: &str) -> StateResult<String>;
    async fn save_text(&self, path: &str, text: &str) -> StateResult<()>;
}

/// Files on disk, resolved against a project root
#[derive(Debug, Clone)]
pub struct DiskIo {
    root: PathBuf,
}

impl DiskIo {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait]
impl SourceIo for DiskIo {
    async fn load_text(&self, path: &str) -> StateResult<String> {
        match tokio::fs::read_to_string(self.resolve(path)).await {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StateError::not_found(path)),
            Err(err) => Err(err.into()),
        }
    }

    async fn save_text(&self, path: &str, text: &str) -> StateResult<()> {
        let target = self.resolve(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(target, text).await?;
        Ok(())
    }
}

/// In-memory files, shared between clones
///
/// Counts saves and can be told to fail them, which makes it useful for
/// exercising the save path.
#[derive(Debug, Clone, Default)]
pub struct MemoryIo {
    inner: Arc<Mutex<MemoryFiles>>,
}

#[derive(Debug, Default)]
struct MemoryFiles {
    files: HashMap<String, String>,
    saves: usize,
    fail_saves: bool,
}

impl MemoryIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, text: &str) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&self, path: &str, text: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.files.insert(path.to_string(), text.to_string());
        }
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.inner.lock().ok()?.files.get(path).cloned()
    }

    /// Number of successful saves so far
    pub fn saves(&self) -> usize {
        self.inner.lock().map(|inner| inner.saves).unwrap_or_default()
    }

    pub fn set_fail_saves(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_saves = fail;
        }
    }

    fn poisoned() -> StateError {
        StateError::Io(std::io::Error::new(ErrorKind::Other, "memory io lock poisoned"))
    }
}

#[async_trait]
impl SourceIo for MemoryIo {
    async fn load_text(&self, path: &str) -> StateResult<String> {
        let inner = self.inner.lock().map_err(|_| Self::poisoned())?;
        inner
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| StateError::not_found(path))
    }

    async fn save_text(&self, path: &str, text: &str) -> StateResult<()> {
        let mut inner = self.inner.lock().map_err(|_| Self::poisoned())?;
        if inner.fail_saves {
            return Err(StateError::Io(std::io::Error::new(
                ErrorKind::PermissionDenied,
                format!("save rejected: {}", path),
            )));
        }
        inner.files.insert(path.to_string(), text.to_string());
        inner.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disk_io_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let io = DiskIo::new(dir.path());

        io.save_text("src/App.jsx", "x = <div />;").await.unwrap();
        assert_eq!(io.load_text("src/App.jsx").await.unwrap(), "x = <div />;");
        assert!(dir.path().join("src/App.jsx").exists());
    }

    #[tokio::test]
    async fn test_disk_io_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let io = DiskIo::new(dir.path());

        let err = io.load_text("nope.jsx").await.unwrap_err();
        assert!(matches!(err, StateError::NotFound { path } if path == "nope.jsx"));
    }

    #[tokio::test]
    async fn test_memory_io_failing_saves() {
        let io = MemoryIo::new().with_file("a.jsx", "a");
        io.set_fail_saves(true);
        assert!(matches!(
            io.save_text("a.jsx", "b").await,
            Err(StateError::Io(_))
        ));
        assert_eq!(io.get("a.jsx").as_deref(), Some("a"));

        io.set_fail_saves(false);
        io.save_text("a.jsx", "b").await.unwrap();
        assert_eq!(io.saves(), 1);
    }
}
