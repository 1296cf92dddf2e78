// src/settings/mod.rs

//! User settings: the watched path, the logged-in user, the imported token
//! card and the pipeline table.
//!
//! [`SettingsStore`] is the contract the rest of the crate consumes.
//! [`MemorySettings`] backs tests; [`FileSettings`] persists to TOML for the
//! CLI.

pub mod file;
pub mod pipelines;
pub mod store;

pub use file::FileSettings;
pub use pipelines::{pipeline_key, PipelineMap};
pub use store::{MemorySettings, SettingsData, SettingsStore, UserInfo};
