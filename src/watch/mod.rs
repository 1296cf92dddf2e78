// src/watch/mod.rs

//! Directory watching.
//!
//! This module is responsible for:
//! - Registering a directory tree with the OS notification facility
//!   (`notify`), one non-recursive registration per directory.
//! - Following the tree as it grows: new subdirectories are registered
//!   before their creation event is forwarded.
//! - Delivering typed [`FileEvent`]s over a bounded channel from a
//!   dedicated worker thread, with explicit cancellation.
//!
//! It knows nothing about markers or uploads beyond the helpers in
//! [`path_utils`].

pub mod backend;
pub mod event;
pub mod path_utils;
pub mod registry;
pub mod watcher;

pub use backend::{NotifyBackend, RawEvent, WatchBackend};
pub use event::FileEvent;
pub use path_utils::{find_markers, is_marker, markers_around, run_dir_of};
pub use registry::{Registry, WatchKey};
pub use watcher::{DirectoryWatcher, EventStream, DEFAULT_CHANNEL_CAPACITY};
