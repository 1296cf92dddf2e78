// src/settings/file.rs

use std::fs;
use std::path::{Path, PathBuf};

use tokio::sync::watch;
use tracing::debug;

use crate::card::TokenCard;
use crate::errors::Result;
use crate::settings::pipelines::PipelineMap;
use crate::settings::store::{SettingsCell, SettingsData, SettingsStore, UserInfo};

/// Settings persisted as TOML, rewritten after every change.
#[derive(Debug)]
pub struct FileSettings {
    file: PathBuf,
    cell: SettingsCell,
}

impl FileSettings {
    /// Load `file`, or start empty if it does not exist yet.
    pub fn open(file: impl Into<PathBuf>) -> Result<Self> {
        let file = file.into();
        let data = if file.exists() {
            let contents = fs::read_to_string(&file)?;
            toml::from_str(&contents)?
        } else {
            debug!(file = ?file, "no settings file yet; starting empty");
            SettingsData::default()
        };

        Ok(Self {
            file,
            cell: SettingsCell::new(data),
        })
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    fn save(&self, data: &SettingsData) -> Result<()> {
        if let Some(parent) = self.file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = toml::to_string(data)?;
        fs::write(&self.file, text)?;
        debug!(file = ?self.file, "settings saved");
        Ok(())
    }
}

impl SettingsStore for FileSettings {
    fn observe_path(&self) -> watch::Receiver<String> {
        self.cell.subscribe()
    }

    fn path(&self) -> Option<String> {
        self.cell.read().path.clone()
    }

    fn set_path(&self, path: Option<String>) -> Result<()> {
        let data = self.cell.update(|d| d.path = path);
        self.save(&data)
    }

    fn user_info(&self) -> Option<UserInfo> {
        self.cell.read().user_info.clone()
    }

    fn set_user_info(&self, info: Option<UserInfo>) -> Result<()> {
        let data = self.cell.update(|d| d.user_info = info);
        self.save(&data)
    }

    fn token_card(&self) -> Option<TokenCard> {
        self.cell.read().token_card.clone()
    }

    fn set_token_card(&self, card: Option<TokenCard>) -> Result<()> {
        let data = self.cell.update(|d| d.token_card = card);
        self.save(&data)
    }

    fn pipelines(&self) -> PipelineMap {
        self.cell.read().pipelines.clone()
    }

    fn set_pipelines(&self, pipelines: PipelineMap) -> Result<()> {
        let data = self.cell.update(|d| d.pipelines = pipelines);
        self.save(&data)
    }

    fn reset(&self) -> Result<()> {
        let data = self.cell.update(|d| *d = SettingsData::default());
        self.save(&data)
    }
}
