// src/settings/store.rs

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::card::TokenCard;
use crate::errors::Result;
use crate::settings::pipelines::PipelineMap;

/// Abstraction over persisted user settings.
///
/// Methods take `&self`; implementations synchronise internally so one
/// store can be shared between the CLI and the upload trigger.
pub trait SettingsStore: Send + Sync {
    /// The watched path: current value first, then every change. An empty
    /// string means no path is configured.
    fn observe_path(&self) -> watch::Receiver<String>;

    fn path(&self) -> Option<String>;

    fn set_path(&self, path: Option<String>) -> Result<()>;

    fn user_info(&self) -> Option<UserInfo>;

    fn set_user_info(&self, info: Option<UserInfo>) -> Result<()>;

    fn token_card(&self) -> Option<TokenCard>;

    fn set_token_card(&self, card: Option<TokenCard>) -> Result<()>;

    fn pipelines(&self) -> PipelineMap;

    fn set_pipelines(&self, pipelines: PipelineMap) -> Result<()>;

    /// Forget everything.
    fn reset(&self) -> Result<()>;
}

/// The account the upload tool is logged in as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: u32,
    pub username: String,
    pub client_id: u32,
}

/// Everything a settings store holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,

    #[serde(default)]
    pub pipelines: PipelineMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_card: Option<TokenCard>,
}

impl SettingsData {
    fn observed_path(&self) -> String {
        self.path.clone().unwrap_or_default()
    }
}

/// Settings state plus the path broadcast, shared by both stores.
#[derive(Debug)]
pub(crate) struct SettingsCell {
    data: Mutex<SettingsData>,
    path_tx: watch::Sender<String>,
}

impl SettingsCell {
    pub(crate) fn new(data: SettingsData) -> Self {
        let (path_tx, _) = watch::channel(data.observed_path());
        Self {
            data: Mutex::new(data),
            path_tx,
        }
    }

    pub(crate) fn read(&self) -> MutexGuard<'_, SettingsData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` and return a snapshot of the result. Observers are only
    /// woken when the path actually changed.
    pub(crate) fn update(&self, f: impl FnOnce(&mut SettingsData)) -> SettingsData {
        let snapshot = {
            let mut data = self.read();
            f(&mut data);
            data.clone()
        };

        let observed = snapshot.observed_path();
        self.path_tx.send_if_modified(|current| {
            if *current == observed {
                false
            } else {
                *current = observed;
                true
            }
        });
        snapshot
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<String> {
        self.path_tx.subscribe()
    }
}

/// Settings kept in memory only.
#[derive(Debug)]
pub struct MemorySettings {
    cell: SettingsCell,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::with_data(SettingsData::default())
    }

    pub fn with_data(data: SettingsData) -> Self {
        Self {
            cell: SettingsCell::new(data),
        }
    }
}

impl SettingsStore for MemorySettings {
    fn observe_path(&self) -> watch::Receiver<String> {
        self.cell.subscribe()
    }

    fn path(&self) -> Option<String> {
        self.cell.read().path.clone()
    }

    fn set_path(&self, path: Option<String>) -> Result<()> {
        self.cell.update(|d| d.path = path);
        Ok(())
    }

    fn user_info(&self) -> Option<UserInfo> {
        self.cell.read().user_info.clone()
    }

    fn set_user_info(&self, info: Option<UserInfo>) -> Result<()> {
        self.cell.update(|d| d.user_info = info);
        Ok(())
    }

    fn token_card(&self) -> Option<TokenCard> {
        self.cell.read().token_card.clone()
    }

    fn set_token_card(&self, card: Option<TokenCard>) -> Result<()> {
        self.cell.update(|d| d.token_card = card);
        Ok(())
    }

    fn pipelines(&self) -> PipelineMap {
        self.cell.read().pipelines.clone()
    }

    fn set_pipelines(&self, pipelines: PipelineMap) -> Result<()> {
        self.cell.update(|d| d.pipelines = pipelines);
        Ok(())
    }

    fn reset(&self) -> Result<()> {
        self.cell.update(|d| *d = SettingsData::default());
        Ok(())
    }
}
