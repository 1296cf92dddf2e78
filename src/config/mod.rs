// src/config/mod.rs

//! Configuration loading and validation for seqwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it into a `ConfigFile` (`validate.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{default_config_path, load_and_validate, load_from_path, resolve_paths};
pub use model::{
    ConfigFile, IdentitySource, RawConfigFile, ToolConfig, UploadConfig, WatchConfig,
};
pub use validate::{DEFAULT_IDENTITY_FILE, MAX_TIMEOUT};
