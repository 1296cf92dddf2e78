// src/exec/backend.rs

//! Pluggable executor abstraction.
//!
//! The upload client talks to a `CommandExecutor` instead of spawning
//! processes itself. Production code uses [`ProcessExecutor`]; tests provide
//! a fake that records command lines and returns scripted results.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::card::TokenCard;
use crate::errors::ValidationError;
use crate::exec::login::LoginSession;
use crate::exec::outcome::CommandResult;
use crate::exec::process::run_command;

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_PROMPT_TIMEOUT: Duration = Duration::from_secs(30);

pub type ExecFuture<'a> = Pin<Box<dyn Future<Output = CommandResult> + Send + 'a>>;
pub type LoginFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CommandResult, ValidationError>> + Send + 'a>>;

/// Trait abstracting how external commands are run.
pub trait CommandExecutor: Send + Sync {
    /// Run a non-interactive command to completion.
    fn execute<'a>(&'a self, argv: &'a [String]) -> ExecFuture<'a>;

    /// Run the interactive login command, answering its coordinate prompt
    /// from `card`.
    fn login<'a>(&'a self, argv: &'a [String], card: &'a TokenCard) -> LoginFuture<'a>;
}

/// Timeouts applied by [`ProcessExecutor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOptions {
    /// Bound on waiting for a command (or the tail of a login) to exit.
    pub timeout: Duration,
    /// Bound on waiting for the login prompt to appear.
    pub prompt_timeout: Duration,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_COMMAND_TIMEOUT,
            prompt_timeout: DEFAULT_PROMPT_TIMEOUT,
        }
    }
}

/// Executor that spawns real OS processes via `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    options: ExecOptions,
}

impl ProcessExecutor {
    pub fn new(options: ExecOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ExecOptions {
        self.options
    }
}

impl CommandExecutor for ProcessExecutor {
    fn execute<'a>(&'a self, argv: &'a [String]) -> ExecFuture<'a> {
        Box::pin(run_command(argv, self.options.timeout))
    }

    fn login<'a>(&'a self, argv: &'a [String], card: &'a TokenCard) -> LoginFuture<'a> {
        let options = self.options;
        Box::pin(async move {
            LoginSession::new(card, options.timeout, options.prompt_timeout)
                .run(argv)
                .await
        })
    }
}
