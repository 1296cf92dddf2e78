// src/errors.rs

//! Crate-wide error types.
//!
//! Each layer has its own small enum so callers can match on exactly the
//! failures that layer produces. `SeqwatchError` is the umbrella used by
//! config loading and the CLI entry points.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures of the directory watcher.
///
/// Everything except `Unavailable` is fatal to a running event stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    #[error("cannot watch {path:?}: {reason}")]
    Unavailable { path: PathBuf, reason: String },

    #[error("waiting for file events was interrupted: {0}")]
    Interrupted(String),

    #[error("the file watch facility was closed")]
    Closed,

    #[error("no directories are registered; the watcher can never produce events")]
    NoActiveRegistrations,
}

/// Failures while running a child process.
///
/// These never escape the executor as `Err`: they are rendered into a
/// `CommandResult::FailedCommand`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("failed to spawn `{program}`: {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("command timed out after {after:?}")]
    Timeout { after: Duration },
}

/// Failures decoding text produced by an external source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed token card: {0}")]
    MalformedCard(String),

    #[error("no coordinate prompt observed: {0}")]
    NoPromptObserved(String),
}

/// Coordinate validation failures. The messages are matched verbatim by
/// callers and tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("coordinate length should be equal to 2 but was: {0}")]
    BadLength(usize),

    #[error("coordinate not in range 1 to 8. Was {0}")]
    ColumnOutOfRange(String),

    #[error("coordinate not in range A to H. Was {0}")]
    RowOutOfRange(char),
}

/// Failures that end a login session before a `CommandResult` exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("no token card has been imported")]
    NoTokenCard,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Error, Debug)]
pub enum SeqwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML encoding error: {0}")]
    TomlEncodeError(#[from] toml::ser::Error),

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Login(#[from] LoginError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SeqwatchError>;
