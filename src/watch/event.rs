// src/watch/event.rs

use std::path::{Path, PathBuf};

/// A filesystem change under a watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Deleted(PathBuf),
    /// The OS dropped events; anything may have changed.
    Overflow,
}

impl FileEvent {
    pub fn path(&self) -> Option<&Path> {
        match self {
            FileEvent::Created(p) | FileEvent::Modified(p) | FileEvent::Deleted(p) => Some(p),
            FileEvent::Overflow => None,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, FileEvent::Created(_))
    }
}
