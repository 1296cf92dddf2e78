// src/watch/path_utils.rs

//! Path helpers for marker detection.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// `true` if the last component of `path` is exactly `marker`.
pub fn is_marker(path: &Path, marker: &str) -> bool {
    path.file_name() == Some(OsStr::new(marker))
}

/// The run directory a marker file belongs to.
pub fn run_dir_of(marker_path: &Path) -> Option<&Path> {
    marker_path.parent()
}

/// Every marker file currently present under `root`, sorted. Symlinks are
/// not followed.
pub fn find_markers(root: &Path, marker: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = ?dir, error = %e, "skipping unreadable directory");
                continue;
            }
        };
        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            if file_type.is_dir() {
                pending.push(path);
            } else if is_marker(&path, marker) {
                found.push(path);
            }
        }
    }

    found.sort();
    found
}

/// Scan for markers on both sides of `register`.
///
/// Returns the run directories that were complete before `register` ran,
/// and the markers that showed up while it was running. Those may or may not
/// produce a file event, so the caller handles them itself.
pub fn markers_around<E>(
    root: &Path,
    marker: &str,
    register: impl FnOnce() -> Result<(), E>,
) -> Result<(HashSet<PathBuf>, Vec<PathBuf>), E> {
    let complete: HashSet<PathBuf> = find_markers(root, marker)
        .iter()
        .filter_map(|m| run_dir_of(m).map(Path::to_path_buf))
        .collect();

    register()?;

    let appeared = find_markers(root, marker)
        .into_iter()
        .filter(|m| run_dir_of(m).is_some_and(|dir| !complete.contains(dir)))
        .collect();
    Ok((complete, appeared))
}
