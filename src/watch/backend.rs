// src/watch/backend.rs

//! The OS notification facility behind a small trait.

use std::path::Path;
use std::sync::mpsc::{self, Receiver};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::errors::WatchError;

/// What the facility delivers: an event or an error report.
pub type RawEvent = notify::Result<Event>;

/// Registers single directories (non-recursively) with the OS.
///
/// Events are delivered out of band, on the receiver handed out when the
/// backend was built.
pub trait WatchBackend: Send {
    fn watch(&mut self, dir: &Path) -> Result<(), WatchError>;
    fn unwatch(&mut self, dir: &Path) -> Result<(), WatchError>;
}

/// `notify::RecommendedWatcher` feeding a std channel.
pub struct NotifyBackend {
    inner: RecommendedWatcher,
}

impl std::fmt::Debug for NotifyBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyBackend").finish()
    }
}

impl NotifyBackend {
    pub fn new() -> Result<(Self, Receiver<RawEvent>), WatchError> {
        let (tx, rx) = mpsc::channel();
        let inner = RecommendedWatcher::new(tx, Config::default()).map_err(|e| {
            WatchError::Unavailable {
                path: Default::default(),
                reason: format!("file watch facility unavailable: {e}"),
            }
        })?;
        Ok((Self { inner }, rx))
    }
}

impl WatchBackend for NotifyBackend {
    fn watch(&mut self, dir: &Path) -> Result<(), WatchError> {
        self.inner
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::Unavailable {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn unwatch(&mut self, dir: &Path) -> Result<(), WatchError> {
        self.inner.unwatch(dir).map_err(|e| WatchError::Unavailable {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
