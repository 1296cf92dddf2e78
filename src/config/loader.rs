// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, IdentitySource, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** validate. Use
/// [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file, validate it and resolve relative paths
/// against the directory the file lives in.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let raw_config = load_from_path(path)?;
    let config = ConfigFile::try_from(raw_config)?;

    let base = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    debug!(config = ?path, base = ?base, "loaded configuration");
    Ok(resolve_paths(config, base))
}

/// Make every relative path in `config` relative to `base` instead.
pub fn resolve_paths(mut config: ConfigFile, base: &Path) -> ConfigFile {
    let resolve = |p: &mut PathBuf| {
        if p.is_relative() {
            *p = base.join(&*p);
        }
    };

    resolve(&mut config.tool.script);
    resolve(&mut config.tool.adegen);
    resolve(&mut config.tool.password_file);
    if let IdentitySource::File(file) = &mut config.tool.identity {
        resolve(file);
    }
    if let Some(root) = &mut config.watch.root {
        resolve(root);
    }
    resolve(&mut config.upload.ade_json);
    resolve(&mut config.settings_file);
    config
}

/// Config file used when `--config` is not given: `Seqwatch.toml` in the
/// current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Seqwatch.toml")
}
