// src/upload/trigger.rs

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::errors::{Result, WatchError};
use crate::exec::CommandResult;
use crate::settings::{pipeline_key, SettingsStore};
use crate::upload::client::UploadClient;
use crate::watch::{
    find_markers, is_marker, markers_around, run_dir_of, DirectoryWatcher, EventStream, FileEvent,
};

/// Step of an upload a report refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Login,
    Prepare,
    Create,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadStage::Login => "login",
            UploadStage::Prepare => "prepare",
            UploadStage::Create => "create",
        };
        f.write_str(name)
    }
}

/// Outcome of one stage for one run directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub run_dir: PathBuf,
    pub stage: UploadStage,
    pub result: CommandResult,
}

#[derive(Debug, Clone)]
pub struct TriggerOptions {
    /// Watched root. When `None` the path is taken from the settings store
    /// and followed as it changes.
    pub root: Option<PathBuf>,
    pub marker: String,
    pub channel_capacity: usize,
    pub ade_json: PathBuf,
    pub default_pipeline: Option<u32>,
}

enum Next {
    Restart,
    Stop,
}

/// Watches for completion markers and uploads each run once.
pub struct UploadTrigger {
    client: UploadClient,
    settings: Arc<dyn SettingsStore>,
    options: TriggerOptions,
    reports: mpsc::Sender<UploadReport>,
}

impl UploadTrigger {
    pub fn new(
        client: UploadClient,
        settings: Arc<dyn SettingsStore>,
        options: TriggerOptions,
        reports: mpsc::Sender<UploadReport>,
    ) -> Self {
        Self {
            client,
            settings,
            options,
            reports,
        }
    }

    /// Run until `shutdown` resolves or the watcher fails.
    ///
    /// With no fixed root and an empty settings path, waits for a path to be
    /// configured. A path change restarts the watcher on the new root.
    pub async fn run<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut path_rx = self.settings.observe_path();

        loop {
            let root = match &self.options.root {
                Some(root) => root.clone(),
                None => {
                    let path = path_rx.borrow_and_update().clone();
                    if path.is_empty() {
                        info!("no watch path configured; waiting for one");
                        tokio::select! {
                            changed = path_rx.changed() => {
                                if changed.is_err() {
                                    return Ok(());
                                }
                                continue;
                            }
                            _ = shutdown.as_mut() => return Ok(()),
                        }
                    }
                    PathBuf::from(path)
                }
            };

            match self.watch_root(&root, &mut path_rx, shutdown.as_mut()).await? {
                Next::Restart => continue,
                Next::Stop => return Ok(()),
            }
        }
    }

    async fn watch_root<F>(
        &self,
        root: &Path,
        path_rx: &mut watch::Receiver<String>,
        mut shutdown: Pin<&mut F>,
    ) -> Result<Next>
    where
        F: Future<Output = ()>,
    {
        let root = root.canonicalize().map_err(|e| WatchError::Unavailable {
            path: root.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut watcher = DirectoryWatcher::new()?;

        // Runs that were already complete before we started are not ours.
        let (mut handled, appeared) = markers_around(&root, &self.options.marker, || {
            watcher.register_all(&root).map(|_| ())
        })?;
        if !handled.is_empty() {
            info!(count = handled.len(), "ignoring runs that were complete at startup");
        }

        let mut stream = watcher.process_events(self.options.channel_capacity)?;
        let mut follow_path = self.options.root.is_none();
        info!(root = ?root, marker = %self.options.marker, "waiting for completed runs");

        for marker in appeared {
            self.on_marker(&marker, &mut handled).await;
        }

        loop {
            tokio::select! {
                _ = shutdown.as_mut() => {
                    info!("shutting down upload trigger");
                    stop_stream(stream).await;
                    return Ok(Next::Stop);
                }
                changed = path_rx.changed(), if follow_path => {
                    if changed.is_ok() {
                        info!(path = %*path_rx.borrow(), "watch path changed; restarting watcher");
                        stop_stream(stream).await;
                        return Ok(Next::Restart);
                    }
                    follow_path = false;
                }
                item = stream.next() => match item {
                    Some(Ok(event)) => self.on_event(event, &root, &mut handled).await,
                    Some(Err(err)) => return Err(err.into()),
                    None => return Err(WatchError::Closed.into()),
                },
            }
        }
    }

    async fn on_event(&self, event: FileEvent, root: &Path, handled: &mut HashSet<PathBuf>) {
        match event {
            FileEvent::Created(path) if is_marker(&path, &self.options.marker) => {
                self.on_marker(&path, handled).await;
            }
            FileEvent::Deleted(path) => {
                if is_marker(&path, &self.options.marker) {
                    if let Some(run_dir) = run_dir_of(&path) {
                        handled.remove(run_dir);
                    }
                } else {
                    handled.retain(|dir| !dir.starts_with(&path));
                }
            }
            FileEvent::Overflow => {
                warn!("events were lost; rescanning for markers");
                for marker in find_markers(root, &self.options.marker) {
                    self.on_marker(&marker, handled).await;
                }
            }
            FileEvent::Created(_) | FileEvent::Modified(_) => {}
        }
    }

    async fn on_marker(&self, marker: &Path, handled: &mut HashSet<PathBuf>) {
        let Some(run_dir) = run_dir_of(marker).map(Path::to_path_buf) else {
            return;
        };
        if !handled.insert(run_dir.clone()) {
            debug!(run_dir = ?run_dir, "run already handled");
            return;
        }
        info!(run_dir = ?run_dir, "run copy complete; starting upload");
        self.upload(run_dir).await;
    }

    /// Login, prepare, create. Stops at the first stage that does not
    /// succeed; every attempted stage is reported.
    pub async fn upload(&self, run_dir: PathBuf) {
        let login = match self.client.login().await {
            Ok(result) => result,
            Err(err) => CommandResult::FailedCommand(err.to_string()),
        };
        if !self.report(&run_dir, UploadStage::Login, login).await {
            return;
        }

        let prepared = match self.resolve_pipeline(&run_dir) {
            Some(pipeline) => {
                self.client
                    .prepare_run(&run_dir, &self.options.ade_json, pipeline)
                    .await
            }
            None => CommandResult::FailedCommand(format!(
                "no pipeline configured for run {}",
                run_dir.display()
            )),
        };
        if !self.report(&run_dir, UploadStage::Prepare, prepared).await {
            return;
        }

        let created = self.client.create_run(&self.options.ade_json).await;
        self.report(&run_dir, UploadStage::Create, created).await;
    }

    /// Pipeline id for a run: looked up by the run name's short-name, else
    /// the configured default.
    pub fn resolve_pipeline(&self, run_dir: &Path) -> Option<u32> {
        let from_settings = run_dir
            .file_name()
            .and_then(|name| pipeline_key(&name.to_string_lossy()))
            .and_then(|key| self.settings.pipelines().get(&key));
        from_settings.or(self.options.default_pipeline)
    }

    /// Publish a report; returns whether the stage succeeded.
    async fn report(&self, run_dir: &Path, stage: UploadStage, result: CommandResult) -> bool {
        let success = result.is_success();
        if success {
            info!(run_dir = ?run_dir, %stage, "upload stage succeeded");
        } else {
            warn!(run_dir = ?run_dir, %stage, result = %result, "upload stage failed");
        }

        let report = UploadReport {
            run_dir: run_dir.to_path_buf(),
            stage,
            result,
        };
        if self.reports.send(report).await.is_err() {
            debug!("report receiver dropped");
        }
        success
    }
}

/// Cancel `stream` off the async workers; joining the watcher thread blocks.
async fn stop_stream(stream: EventStream) {
    if let Err(e) = tokio::task::spawn_blocking(move || stream.cancel()).await {
        warn!(error = %e, "watcher shutdown failed");
    }
}
