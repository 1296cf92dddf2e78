// src/lib.rs

pub mod card;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod settings;
pub mod upload;
pub mod watch;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::card::{extract_token_card, TokenCard, ROWS};
use crate::cli::{CardCommand, CliArgs, Command, PathCommand, PipelineCommand};
use crate::config::{
    default_config_path, load_and_validate, ConfigFile, IdentitySource, RawConfigFile,
};
use crate::errors::LoginError;
use crate::exec::{CommandResult, Platform, ProcessExecutor};
use crate::settings::{FileSettings, SettingsStore};
use crate::upload::{TriggerOptions, UploadClient, UploadReport, UploadTrigger};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the settings store
/// - the process executor and upload client
/// - (for `watch`) the upload trigger and Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(args.config.as_deref())?;

    if let Command::DryRun = args.command {
        print_dry_run(&cfg);
        return Ok(());
    }

    let settings: Arc<dyn SettingsStore> = Arc::new(
        FileSettings::open(&cfg.settings_file)
            .with_context(|| format!("opening settings {}", cfg.settings_file.display()))?,
    );
    let client = || build_client(&cfg, Arc::clone(&settings));

    match args.command {
        Command::Watch => run_watch(&cfg, client()?, Arc::clone(&settings)).await,
        Command::Check => print_result("dependency check", &client()?.dependency_check().await),
        Command::Login => {
            let result = client()?.login().await?;
            print_result("login", &result)
        }
        Command::Logout => print_result("logout", &client()?.logout().await),
        Command::UserInfo => print_result("user info", &client()?.user_info().await),
        Command::Pipelines => print_result("pipelines", &client()?.pipelines().await),
        Command::Card(cmd) => card_command(cmd, settings.as_ref()),
        Command::Pipeline(PipelineCommand::Set { name, id }) => {
            let mut pipelines = settings.pipelines();
            pipelines.insert(name.to_ascii_uppercase(), id);
            settings.set_pipelines(pipelines)?;
            println!("pipeline {} -> {id}", name.to_ascii_uppercase());
            Ok(())
        }
        Command::Path(PathCommand::Set { dir }) => {
            let dir = dir
                .canonicalize()
                .with_context(|| format!("resolving {}", dir.display()))?;
            if !dir.is_dir() {
                bail!("{} is not a directory", dir.display());
            }
            settings.set_path(Some(dir.to_string_lossy().into_owned()))?;
            println!("watching {}", dir.display());
            Ok(())
        }
        Command::Reset => {
            settings.reset()?;
            println!("settings cleared");
            Ok(())
        }
        Command::DryRun => Ok(()),
    }
}

/// Load `path`, or `Seqwatch.toml` when no path was given. A missing default
/// file means built-in defaults.
fn load_config(path: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = path {
        return load_and_validate(path)
            .with_context(|| format!("loading config {}", path.display()));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        return Ok(load_and_validate(&default_path)?);
    }
    debug!(path = ?default_path, "no config file; using defaults");
    Ok(ConfigFile::try_from(RawConfigFile::default())?)
}

fn build_client(cfg: &ConfigFile, settings: Arc<dyn SettingsStore>) -> Result<UploadClient> {
    let commands = cfg.tool_commands(Platform::current())?;
    let executor = Arc::new(ProcessExecutor::new(cfg.exec_options()));
    Ok(UploadClient::new(executor, commands, settings))
}

fn print_result(what: &str, result: &CommandResult) -> Result<()> {
    println!("{what}: {result}");
    if !result.is_success() {
        bail!("{what} did not succeed");
    }
    Ok(())
}

fn card_command(cmd: CardCommand, settings: &dyn SettingsStore) -> Result<()> {
    match cmd {
        CardCommand::Import { file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let card = extract_token_card(&text)?;
            println!(
                "imported token card for {} ({}), expires {}",
                card.username(),
                card.user_id(),
                card.expires()
            );
            settings.set_token_card(Some(card))?;
            Ok(())
        }
        CardCommand::Show => {
            let card = stored_card(settings)?;
            print_card(&card);
            Ok(())
        }
        CardCommand::Token { coordinate } => {
            let card = stored_card(settings)?;
            println!("{}", card.get_token(&coordinate)?);
            Ok(())
        }
    }
}

fn stored_card(settings: &dyn SettingsStore) -> Result<TokenCard> {
    settings
        .token_card()
        .ok_or_else(|| anyhow::Error::from(LoginError::NoTokenCard))
}

fn print_card(card: &TokenCard) {
    println!(
        "{} ({}) | Expires: {}",
        card.username(),
        card.user_id(),
        card.expires()
    );
    println!("   {}", (1..=8).map(|c| format!("{c:<5}")).collect::<String>());
    for letter in ROWS {
        if let Some(row) = card.row(letter) {
            let tokens: String = row.iter().map(|t| format!("{t:<5}")).collect();
            println!("{letter}  {tokens}");
        }
    }
}

async fn run_watch(
    cfg: &ConfigFile,
    client: UploadClient,
    settings: Arc<dyn SettingsStore>,
) -> Result<()> {
    let (report_tx, mut report_rx) = mpsc::channel::<UploadReport>(cfg.watch.channel_capacity);

    let options = TriggerOptions {
        root: cfg.watch.root.clone(),
        marker: cfg.watch.marker.clone(),
        channel_capacity: cfg.watch.channel_capacity,
        ade_json: cfg.upload.ade_json.clone(),
        default_pipeline: cfg.upload.default_pipeline,
    };
    let trigger = UploadTrigger::new(client, settings, options, report_tx);

    let printer = tokio::spawn(async move {
        while let Some(report) = report_rx.recv().await {
            println!(
                "{} [{}] {}",
                report.run_dir.display(),
                report.stage,
                report.result
            );
        }
    });

    // Ctrl-C stops the trigger.
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C; running until killed");
            std::future::pending::<()>().await;
        }
    };

    info!("seqwatch started");
    let outcome = trigger.run(shutdown).await;
    drop(trigger);
    if let Err(e) = printer.await {
        warn!(error = %e, "report printer failed");
    }
    outcome?;
    info!("seqwatch stopped");
    Ok(())
}

/// Simple dry-run output: print the resolved configuration.
fn print_dry_run(cfg: &ConfigFile) {
    let python = cfg
        .tool
        .python
        .clone()
        .unwrap_or_else(|| Platform::current().python_executable().to_string());

    println!("seqwatch dry-run");
    println!("  tool.python = {python}");
    println!("  tool.script = {}", cfg.tool.script.display());
    println!("  tool.adegen = {}", cfg.tool.adegen.display());
    println!("  tool.password_file = {}", cfg.tool.password_file.display());
    match &cfg.tool.identity {
        IdentitySource::Inline(id) => println!("  tool.identity = {id}"),
        IdentitySource::File(file) => println!("  tool.identity_file = {}", file.display()),
    }
    println!("  tool.timeout = {:?}", cfg.tool.timeout);
    println!("  tool.prompt_timeout = {:?}", cfg.tool.prompt_timeout);
    match &cfg.watch.root {
        Some(root) => println!("  watch.root = {}", root.display()),
        None => println!("  watch.root = (from settings)"),
    }
    println!("  watch.marker = {}", cfg.watch.marker);
    println!("  watch.channel_capacity = {}", cfg.watch.channel_capacity);
    println!("  upload.ade_json = {}", cfg.upload.ade_json.display());
    if let Some(id) = cfg.upload.default_pipeline {
        println!("  upload.default_pipeline = {id}");
    }
    println!("  settings.file = {}", cfg.settings_file.display());

    debug!("dry-run complete (no execution)");
}
