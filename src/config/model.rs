// src/config/model.rs

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::{Result, SeqwatchError};
use crate::exec::{ExecOptions, Platform, ToolCommands};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [tool]
/// script = "sg-upload-v2-wrapper.py"
/// adegen = "adegen.py"
/// password_file = "pw.txt"
/// identity_file = "user.txt"
/// timeout = "5s"
///
/// [watch]
/// root = "/data/runs"
/// marker = "CopyComplete.txt"
///
/// [upload]
/// ade_json = "ade.json"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub tool: ToolSection,

    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub upload: UploadSection,

    #[serde(default)]
    pub settings: SettingsSection,
}

/// `[tool]` section: where the external upload tool lives.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolSection {
    /// Interpreter override. Defaults to the platform's Python executable.
    #[serde(default)]
    pub python: Option<String>,

    #[serde(default = "default_script")]
    pub script: PathBuf,

    #[serde(default = "default_adegen")]
    pub adegen: PathBuf,

    #[serde(default = "default_password_file")]
    pub password_file: PathBuf,

    /// Login identity given inline.
    #[serde(default)]
    pub identity: Option<String>,

    /// File holding the login identity. Used when `identity` is not set.
    #[serde(default)]
    pub identity_file: Option<PathBuf>,

    #[serde(default = "default_timeout")]
    pub timeout: String,

    #[serde(default = "default_prompt_timeout")]
    pub prompt_timeout: String,
}

fn default_script() -> PathBuf {
    PathBuf::from("sg-upload-v2-wrapper.py")
}

fn default_adegen() -> PathBuf {
    PathBuf::from("adegen.py")
}

fn default_password_file() -> PathBuf {
    PathBuf::from("pw.txt")
}

fn default_timeout() -> String {
    "5s".to_string()
}

fn default_prompt_timeout() -> String {
    "30s".to_string()
}

impl Default for ToolSection {
    fn default() -> Self {
        Self {
            python: None,
            script: default_script(),
            adegen: default_adegen(),
            password_file: default_password_file(),
            identity: None,
            identity_file: None,
            timeout: default_timeout(),
            prompt_timeout: default_prompt_timeout(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Directory to watch. When unset the path comes from the settings
    /// store.
    #[serde(default)]
    pub root: Option<PathBuf>,

    #[serde(default = "default_marker")]
    pub marker: String,

    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_marker() -> String {
    "CopyComplete.txt".to_string()
}

fn default_channel_capacity() -> usize {
    crate::watch::DEFAULT_CHANNEL_CAPACITY
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            root: None,
            marker: default_marker(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// `[upload]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSection {
    #[serde(default = "default_ade_json")]
    pub ade_json: PathBuf,

    /// Pipeline id used when a run name matches no known pipeline.
    #[serde(default)]
    pub default_pipeline: Option<u32>,
}

fn default_ade_json() -> PathBuf {
    PathBuf::from("ade.json")
}

impl Default for UploadSection {
    fn default() -> Self {
        Self {
            ade_json: default_ade_json(),
            default_pipeline: None,
        }
    }
}

/// `[settings]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsSection {
    #[serde(default = "default_settings_file")]
    pub file: PathBuf,
}

fn default_settings_file() -> PathBuf {
    PathBuf::from(".seqwatch/settings.toml")
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            file: default_settings_file(),
        }
    }
}

/// Where the login identity comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentitySource {
    Inline(String),
    File(PathBuf),
}

/// Validated `[tool]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub python: Option<String>,
    pub script: PathBuf,
    pub adegen: PathBuf,
    pub password_file: PathBuf,
    pub identity: IdentitySource,
    pub timeout: Duration,
    pub prompt_timeout: Duration,
}

/// Validated `[watch]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub root: Option<PathBuf>,
    pub marker: String,
    pub channel_capacity: usize,
}

/// Validated `[upload]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub ade_json: PathBuf,
    pub default_pipeline: Option<u32>,
}

/// Validated configuration. Only built through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub tool: ToolConfig,
    pub watch: WatchConfig,
    pub upload: UploadConfig,
    pub settings_file: PathBuf,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        tool: ToolConfig,
        watch: WatchConfig,
        upload: UploadConfig,
        settings_file: PathBuf,
    ) -> Self {
        Self {
            tool,
            watch,
            upload,
            settings_file,
        }
    }
}

impl ConfigFile {
    /// Command lines for the configured tool on `platform`.
    ///
    /// Reads the identity file when the identity is not given inline.
    pub fn tool_commands(&self, platform: Platform) -> Result<ToolCommands> {
        let identity = match &self.tool.identity {
            IdentitySource::Inline(id) => id.clone(),
            IdentitySource::File(path) => {
                let text = fs::read_to_string(path).map_err(|e| {
                    SeqwatchError::ConfigError(format!(
                        "cannot read [tool].identity_file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                let id = text.trim();
                if id.is_empty() {
                    return Err(SeqwatchError::ConfigError(format!(
                        "[tool].identity_file {} is empty",
                        path.display()
                    )));
                }
                id.to_string()
            }
        };

        let python = self
            .tool
            .python
            .clone()
            .unwrap_or_else(|| platform.python_executable().to_string());

        Ok(ToolCommands::new(
            python,
            &self.tool.script,
            &self.tool.adegen,
            &self.tool.password_file,
            identity,
        ))
    }

    pub fn exec_options(&self) -> ExecOptions {
        ExecOptions {
            timeout: self.tool.timeout,
            prompt_timeout: self.tool.prompt_timeout,
        }
    }
}
