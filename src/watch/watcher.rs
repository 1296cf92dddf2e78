// src/watch/watcher.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use notify::event::{ModifyKind, RenameMode};
use notify::{ErrorKind, Event, EventKind};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::WatchError;
use crate::watch::backend::{NotifyBackend, RawEvent, WatchBackend};
use crate::watch::event::FileEvent;
use crate::watch::registry::Registry;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// How often the worker wakes up to check for cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

type StreamItem = Result<FileEvent, WatchError>;

/// Watches a set of directories, one OS registration per directory.
///
/// Build it, `register_all` the root, then hand it to
/// [`DirectoryWatcher::process_events`] which moves it onto a worker thread.
pub struct DirectoryWatcher {
    backend: Box<dyn WatchBackend>,
    raw_rx: Receiver<RawEvent>,
    registry: Registry,
}

impl std::fmt::Debug for DirectoryWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryWatcher")
            .field("registry", &self.registry)
            .finish()
    }
}

impl DirectoryWatcher {
    /// Watcher backed by the platform's notification facility.
    pub fn new() -> Result<Self, WatchError> {
        let (backend, raw_rx) = NotifyBackend::new()?;
        Ok(Self::with_backend(Box::new(backend), raw_rx))
    }

    /// Watcher over an arbitrary backend. `raw_rx` must receive whatever the
    /// backend reports.
    pub fn with_backend(backend: Box<dyn WatchBackend>, raw_rx: Receiver<RawEvent>) -> Self {
        Self {
            backend,
            raw_rx,
            registry: Registry::new(),
        }
    }

    /// Start watching `dir`. Returns `false` if it was already watched.
    pub fn register(&mut self, dir: impl AsRef<Path>) -> Result<bool, WatchError> {
        let dir = dir.as_ref();
        let canonical = dir.canonicalize().map_err(|e| WatchError::Unavailable {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        if self.registry.contains(&canonical) {
            debug!(dir = ?canonical, "directory already registered");
            return Ok(false);
        }
        if !canonical.is_dir() {
            return Err(WatchError::Unavailable {
                path: canonical,
                reason: "not a directory".to_string(),
            });
        }

        self.backend.watch(&canonical)?;
        let key = self.registry.insert(canonical.clone());
        debug!(dir = ?canonical, ?key, "registered directory");
        Ok(true)
    }

    /// Register `root` and every directory below it. Symlinks are not
    /// followed.
    ///
    /// Only a failure on `root` itself is an error; unreadable or vanished
    /// subdirectories are skipped. Returns the number of new registrations.
    pub fn register_all(&mut self, root: impl AsRef<Path>) -> Result<usize, WatchError> {
        let root = root.as_ref();
        let mut added = usize::from(self.register(root)?);

        let mut pending = vec![root.canonicalize().map_err(|e| WatchError::Unavailable {
            path: root.to_path_buf(),
            reason: e.to_string(),
        })?];

        while let Some(dir) = pending.pop() {
            for sub in subdirectories(&dir) {
                match self.register(&sub) {
                    Ok(new) => {
                        added += usize::from(new);
                        pending.push(sub);
                    }
                    Err(e) => warn!(dir = ?sub, error = %e, "skipping subdirectory"),
                }
            }
        }

        info!(root = ?root, added, total = self.registry.len(), "watching directory tree");
        Ok(added)
    }

    pub fn unregister(&mut self, dir: &Path) -> bool {
        if self.registry.remove(dir).is_none() {
            return false;
        }
        if let Err(e) = self.backend.unwatch(dir) {
            debug!(dir = ?dir, error = %e, "unwatch failed");
        }
        true
    }

    /// Release every registration.
    pub fn unregister_all(&mut self) {
        for dir in self.registry.clear() {
            if let Err(e) = self.backend.unwatch(&dir) {
                debug!(dir = ?dir, error = %e, "unwatch failed");
            }
        }
    }

    /// Currently watched directories, sorted.
    pub fn watched_dirs(&self) -> Vec<PathBuf> {
        self.registry.paths()
    }

    /// Move the watcher onto a worker thread and stream its events.
    ///
    /// Fails immediately when nothing is registered.
    pub fn process_events(self, capacity: usize) -> Result<EventStream, WatchError> {
        if self.registry.is_empty() {
            return Err(WatchError::NoActiveRegistrations);
        }

        let (tx, rx) = mpsc::channel(capacity.max(1));
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);

        let worker = thread::Builder::new()
            .name("dir-watcher".to_string())
            .spawn(move || self.run(tx, worker_cancel))
            .map_err(|e| WatchError::Unavailable {
                path: PathBuf::new(),
                reason: format!("cannot start watcher thread: {e}"),
            })?;

        Ok(EventStream {
            rx,
            cancel,
            worker: Some(worker),
        })
    }

    fn run(mut self, tx: mpsc::Sender<StreamItem>, cancel: Arc<AtomicBool>) -> Self {
        debug!(dirs = self.registry.len(), "watcher worker started");

        if let Err(err) = self.pump(&tx, &cancel) {
            info!(error = %err, "watcher stopped");
            let _ = tx.blocking_send(Err(err));
        }

        self.unregister_all();
        debug!("watcher worker finished");
        self
    }

    fn pump(
        &mut self,
        tx: &mpsc::Sender<StreamItem>,
        cancel: &AtomicBool,
    ) -> Result<(), WatchError> {
        loop {
            if cancel.load(Ordering::Acquire) || tx.is_closed() {
                return Ok(());
            }

            let raw = match self.raw_rx.recv_timeout(POLL_INTERVAL) {
                Ok(raw) => raw,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Err(WatchError::Closed),
            };

            let events = match raw {
                Ok(event) => self.translate(event),
                Err(err) => {
                    self.backend_error(err)?;
                    Vec::new()
                }
            };

            for event in events {
                debug!(?event, "file event");
                if tx.blocking_send(Ok(event)).is_err() {
                    return Ok(());
                }
            }

            if self.registry.is_empty() {
                return Err(WatchError::NoActiveRegistrations);
            }
        }
    }

    /// Turn one raw event into zero or more `FileEvent`s, keeping the
    /// registry in step with directory creation and removal.
    fn translate(&mut self, event: Event) -> Vec<FileEvent> {
        if event.need_rescan() {
            warn!("event queue overflowed");
            return vec![FileEvent::Overflow];
        }

        let mut out = Vec::new();
        match event.kind {
            EventKind::Create(_) => {
                for path in event.paths {
                    self.created(path, &mut out);
                }
            }
            EventKind::Modify(ModifyKind::Name(mode)) => match mode {
                RenameMode::From => {
                    for path in event.paths {
                        self.deleted(path, &mut out);
                    }
                }
                RenameMode::To => {
                    for path in event.paths {
                        self.created(path, &mut out);
                    }
                }
                // The separate From and To halves were already reported.
                RenameMode::Both => {}
                RenameMode::Any | RenameMode::Other => {
                    for path in event.paths {
                        if fs::symlink_metadata(&path).is_ok() {
                            self.created(path, &mut out);
                        } else {
                            self.deleted(path, &mut out);
                        }
                    }
                }
            },
            EventKind::Modify(_) => {
                out.extend(event.paths.into_iter().map(FileEvent::Modified));
            }
            EventKind::Remove(_) => {
                for path in event.paths {
                    self.deleted(path, &mut out);
                }
            }
            EventKind::Access(_) | EventKind::Any | EventKind::Other => {}
        }
        out
    }

    fn created(&mut self, path: PathBuf, out: &mut Vec<FileEvent>) {
        let is_dir = fs::symlink_metadata(&path)
            .map(|m| m.is_dir())
            .unwrap_or(false);

        if is_dir {
            match self.register(&path) {
                Ok(true) => {
                    out.push(FileEvent::Created(path.clone()));
                    self.catch_up(&path, out);
                    return;
                }
                // Already reported when it was registered.
                Ok(false) => return,
                Err(e) => warn!(dir = ?path, error = %e, "cannot watch new directory"),
            }
        }
        out.push(FileEvent::Created(path));
    }

    /// Report entries that appeared in a new directory before its
    /// registration took effect.
    fn catch_up(&mut self, dir: &Path, out: &mut Vec<FileEvent>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = ?dir, error = %e, "cannot scan new directory");
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                match self.register(&path) {
                    Ok(true) => {
                        out.push(FileEvent::Created(path.clone()));
                        self.catch_up(&path, out);
                    }
                    Ok(false) => {}
                    Err(e) => warn!(dir = ?path, error = %e, "cannot watch new directory"),
                }
            } else {
                out.push(FileEvent::Created(path));
            }
        }
    }

    fn deleted(&mut self, path: PathBuf, out: &mut Vec<FileEvent>) {
        self.purge(&path);
        out.push(FileEvent::Deleted(path));
    }

    fn purge(&mut self, path: &Path) {
        for dir in self.registry.remove_tree(path) {
            debug!(dir = ?dir, "directory gone; unregistered");
            // The OS usually dropped the watch already.
            let _ = self.backend.unwatch(&dir);
        }
    }

    fn backend_error(&mut self, err: notify::Error) -> Result<(), WatchError> {
        match &err.kind {
            ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::Interrupted => {
                Err(WatchError::Interrupted(err.to_string()))
            }
            ErrorKind::WatchNotFound | ErrorKind::PathNotFound => {
                for path in &err.paths {
                    self.purge(path);
                }
                Ok(())
            }
            _ => {
                warn!(error = %err, "file watch error");
                Ok(())
            }
        }
    }
}

fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| e.path())
            .collect(),
        Err(e) => {
            warn!(dir = ?dir, error = %e, "cannot list directory");
            Vec::new()
        }
    }
}

/// Stream of events produced by a running watcher.
///
/// Yields `Err` once when the watcher stops on its own, then `None`.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<StreamItem>,
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<DirectoryWatcher>>,
}

impl EventStream {
    pub async fn next(&mut self) -> Option<StreamItem> {
        self.rx.recv().await
    }

    /// Stop the worker and take the watcher back, with every registration
    /// released.
    ///
    /// Blocks the calling thread until the worker has exited, which takes up
    /// to one poll interval plus any scan in progress. From async code, call
    /// it through `tokio::task::spawn_blocking`. Returns `None` if the worker
    /// panicked.
    pub fn cancel(mut self) -> Option<DirectoryWatcher> {
        self.signal();
        let worker = self.worker.take()?;
        match worker.join() {
            Ok(watcher) => Some(watcher),
            Err(_) => {
                warn!("watcher worker panicked");
                None
            }
        }
    }

    fn signal(&mut self) {
        self.cancel.store(true, Ordering::Release);
        self.rx.close();
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.signal();
    }
}
