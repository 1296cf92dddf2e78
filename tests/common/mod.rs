#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub use seqwatch_test_utils::builders;
pub use seqwatch_test_utils::{init_tracing, with_timeout, FakeExecutor};

/// Directory with the checked-in demo config and fixtures.
pub fn demos_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos")
}
