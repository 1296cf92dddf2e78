// src/upload/client.rs

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::errors::LoginError;
use crate::exec::{CommandExecutor, CommandResult, ToolCommands};
use crate::settings::SettingsStore;

/// Typed facade over the external upload tool.
pub struct UploadClient {
    executor: Arc<dyn CommandExecutor>,
    commands: ToolCommands,
    settings: Arc<dyn SettingsStore>,
}

impl std::fmt::Debug for UploadClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadClient")
            .field("commands", &self.commands)
            .finish()
    }
}

impl UploadClient {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        commands: ToolCommands,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            executor,
            commands,
            settings,
        }
    }

    pub fn commands(&self) -> &ToolCommands {
        &self.commands
    }

    /// Check that the Python interpreter can be started.
    pub async fn dependency_check(&self) -> CommandResult {
        info!(python = %self.commands.python(), "checking that Python is installed");
        self.executor.execute(&self.commands.version()).await
    }

    /// Log in, answering the coordinate prompt from the stored token card.
    pub async fn login(&self) -> Result<CommandResult, LoginError> {
        let card = self.settings.token_card().ok_or(LoginError::NoTokenCard)?;
        info!(identity = %self.commands.identity(), "login started");
        let argv = self.commands.login();
        Ok(self.executor.login(&argv, &card).await?)
    }

    pub async fn logout(&self) -> CommandResult {
        info!("logout started");
        self.executor.execute(&self.commands.logout()).await
    }

    pub async fn user_info(&self) -> CommandResult {
        info!("fetching user info");
        self.executor.execute(&self.commands.user_info()).await
    }

    pub async fn pipelines(&self) -> CommandResult {
        info!("fetching pipelines");
        self.executor.execute(&self.commands.pipeline_list()).await
    }

    /// Generate the run description for `run_dir` into `ade_json`.
    pub async fn prepare_run(&self, run_dir: &Path, ade_json: &Path, pipeline: u32) -> CommandResult {
        info!(run_dir = ?run_dir, pipeline, "preparing run");
        self.executor
            .execute(&self.commands.prepare_run(run_dir, ade_json, pipeline))
            .await
    }

    /// Create the run described by `ade_json`.
    pub async fn create_run(&self, ade_json: &Path) -> CommandResult {
        info!(ade_json = ?ade_json, "creating run");
        self.executor.execute(&self.commands.create_run(ade_json)).await
    }
}
