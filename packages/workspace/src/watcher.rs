use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::Duration;
use thiserror::Error;

/// Extensions of files the editor can open
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("Failed to create watcher: {0}")]
    CreateError(#[from] notify::Error),

    #[error("Watcher disconnected")]
    Disconnected,
}

pub type WatcherResult<T> = Result<T, WatcherError>;

pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Reports source files created or modified under a directory
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<notify::Result<Event>>,
}

impl FileWatcher {
    pub fn new(path: impl AsRef<Path>) -> WatcherResult<Self> {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        watcher.watch(path.as_ref(), RecursiveMode::Recursive)?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }

    /// Block until source files change
    pub fn next_change(&self) -> WatcherResult<Vec<PathBuf>> {
        loop {
            let event = self.receiver.recv().map_err(|_| WatcherError::Disconnected)?;
            if let Some(paths) = Self::source_changes(event) {
                return Ok(paths);
            }
        }
    }

    /// Like [`next_change`](Self::next_change), giving up after `timeout`
    pub fn next_change_timeout(&self, timeout: Duration) -> WatcherResult<Option<Vec<PathBuf>>> {
        loop {
            match self.receiver.recv_timeout(timeout) {
                Ok(event) => {
                    if let Some(paths) = Self::source_changes(event) {
                        return Ok(Some(paths));
                    }
                }
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => return Err(WatcherError::Disconnected),
            }
        }
    }

    fn source_changes(event: notify::Result<Event>) -> Option<Vec<PathBuf>> {
        let event = match event {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(error = %err, "watch error");
                return None;
            }
        };
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            return None;
        }

        let paths: Vec<PathBuf> = event
            .paths
            .into_iter()
            .filter(|path| is_source_file(path))
            .collect();
        (!paths.is_empty()).then_some(paths)
    }
}
