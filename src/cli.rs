// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `seqwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "seqwatch",
    version,
    about = "Watch sequencer run folders and upload completed runs.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Seqwatch.toml` in the current working directory. Built-in
    /// defaults are used if that file does not exist.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SEQWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Watch for completed runs and upload them until Ctrl-C.
    Watch,
    /// Check that the Python interpreter can be started.
    Check,
    /// Log in to the upload service using the stored token card.
    Login,
    /// Log out of the upload service.
    Logout,
    /// Show the logged-in user.
    UserInfo,
    /// List the pipelines available to the logged-in user.
    Pipelines,
    /// Manage the stored token card.
    #[command(subcommand)]
    Card(CardCommand),
    /// Manage pipeline short-names.
    #[command(subcommand)]
    Pipeline(PipelineCommand),
    /// Manage the watched directory.
    #[command(subcommand)]
    Path(PathCommand),
    /// Forget every stored setting.
    Reset,
    /// Print the resolved configuration and exit.
    DryRun,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CardCommand {
    /// Decode a token card from extracted text and store it.
    Import {
        #[arg(value_name = "TEXT_FILE")]
        file: PathBuf,
    },
    /// Print the stored token card.
    Show,
    /// Look up one token, e.g. `7G`.
    Token { coordinate: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum PipelineCommand {
    /// Map a run-name prefix to a pipeline id.
    Set { name: String, id: u32 },
}

#[derive(Debug, Clone, Subcommand)]
pub enum PathCommand {
    /// Set the directory to watch.
    Set { dir: PathBuf },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
