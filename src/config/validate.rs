// src/config/validate.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{
    ConfigFile, IdentitySource, RawConfigFile, ToolConfig, ToolSection, UploadConfig, WatchConfig,
    WatchSection,
};
use crate::errors::{Result, SeqwatchError};

/// Identity file used when the config names no identity at all.
pub const DEFAULT_IDENTITY_FILE: &str = "user.txt";

/// Upper bound for any configured timeout.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SeqwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let tool = validate_tool(raw.tool)?;
        let watch = validate_watch(raw.watch)?;
        let upload = UploadConfig {
            ade_json: raw.upload.ade_json,
            default_pipeline: raw.upload.default_pipeline,
        };
        Ok(ConfigFile::new_unchecked(tool, watch, upload, raw.settings.file))
    }
}

fn validate_tool(tool: ToolSection) -> Result<ToolConfig> {
    if let Some(python) = &tool.python {
        if python.trim().is_empty() {
            return Err(SeqwatchError::ConfigError(
                "[tool].python must not be empty".to_string(),
            ));
        }
    }

    let identity = match (tool.identity, tool.identity_file) {
        (Some(_), Some(_)) => {
            return Err(SeqwatchError::ConfigError(
                "[tool] sets both `identity` and `identity_file`; pick one".to_string(),
            ));
        }
        (Some(id), None) => {
            let id = id.trim().to_string();
            if id.is_empty() {
                return Err(SeqwatchError::ConfigError(
                    "[tool].identity must not be empty".to_string(),
                ));
            }
            IdentitySource::Inline(id)
        }
        (None, Some(file)) => IdentitySource::File(file),
        (None, None) => IdentitySource::File(PathBuf::from(DEFAULT_IDENTITY_FILE)),
    };

    Ok(ToolConfig {
        python: tool.python,
        script: tool.script,
        adegen: tool.adegen,
        password_file: tool.password_file,
        identity,
        timeout: positive_duration("[tool].timeout", &tool.timeout)?,
        prompt_timeout: positive_duration("[tool].prompt_timeout", &tool.prompt_timeout)?,
    })
}

fn validate_watch(watch: WatchSection) -> Result<WatchConfig> {
    if watch.marker.is_empty() {
        return Err(SeqwatchError::ConfigError(
            "[watch].marker must not be empty".to_string(),
        ));
    }
    if watch.marker.contains(['/', '\\']) {
        return Err(SeqwatchError::ConfigError(format!(
            "[watch].marker must be a file name, not a path (got '{}')",
            watch.marker
        )));
    }
    if watch.channel_capacity == 0 {
        return Err(SeqwatchError::ConfigError(
            "[watch].channel_capacity must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(WatchConfig {
        root: watch.root,
        marker: watch.marker,
        channel_capacity: watch.channel_capacity,
    })
}

fn positive_duration(field: &str, value: &str) -> Result<Duration> {
    let duration = parse_duration(value)
        .map_err(|e| SeqwatchError::ConfigError(format!("{field}: {e}")))?;
    if duration.is_zero() {
        return Err(SeqwatchError::ConfigError(format!(
            "{field} must be greater than zero"
        )));
    }
    if duration > MAX_TIMEOUT {
        return Err(SeqwatchError::ConfigError(format!(
            "{field} must be at most {MAX_TIMEOUT:?} (got {duration:?})"
        )));
    }
    Ok(duration)
}
