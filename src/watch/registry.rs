// src/watch/registry.rs

//! Bookkeeping of live watch registrations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Opaque identifier of one registered directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchKey(u64);

/// Two-way index between watch keys and directory paths.
///
/// Every watched directory has exactly one key. Removing a path drops its
/// key immediately.
#[derive(Debug, Default)]
pub struct Registry {
    next: u64,
    by_key: HashMap<WatchKey, PathBuf>,
    by_path: HashMap<PathBuf, WatchKey>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the new key, or `None` if `path` was already registered.
    pub fn insert(&mut self, path: PathBuf) -> Option<WatchKey> {
        if self.by_path.contains_key(&path) {
            return None;
        }
        let key = WatchKey(self.next);
        self.next += 1;
        self.by_key.insert(key, path.clone());
        self.by_path.insert(path, key);
        Some(key)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.by_path.contains_key(path)
    }

    pub fn key_of(&self, path: &Path) -> Option<WatchKey> {
        self.by_path.get(path).copied()
    }

    pub fn path_of(&self, key: WatchKey) -> Option<&Path> {
        self.by_key.get(&key).map(PathBuf::as_path)
    }

    pub fn remove(&mut self, path: &Path) -> Option<WatchKey> {
        let key = self.by_path.remove(path)?;
        self.by_key.remove(&key);
        Some(key)
    }

    /// Remove `path` and every registered directory below it.
    pub fn remove_tree(&mut self, path: &Path) -> Vec<PathBuf> {
        let doomed: Vec<PathBuf> = self
            .by_path
            .keys()
            .filter(|p| p.starts_with(path))
            .cloned()
            .collect();
        for p in &doomed {
            self.remove(p);
        }
        doomed
    }

    /// Drop everything, returning the paths that were registered.
    pub fn clear(&mut self) -> Vec<PathBuf> {
        self.by_key.clear();
        self.by_path.drain().map(|(path, _)| path).collect()
    }

    /// Registered paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.by_path.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
