// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for running the external upload tool with
//! `tokio::process::Command` and classifying what it did.
//!
//! - [`outcome`] defines `CommandResult` and the classification rule.
//! - [`process`] spawns, drains and reaps one child process.
//! - [`login`] conducts the interactive prompt/response login.
//! - [`commands`] builds the tool's command lines for the host platform.
//! - [`backend`] provides the `CommandExecutor` trait and the production
//!   `ProcessExecutor`, which tests can replace with a fake.

pub mod backend;
pub mod commands;
pub mod login;
pub mod outcome;
pub mod process;

pub use backend::{CommandExecutor, ExecOptions, ProcessExecutor};
pub use commands::{Platform, ToolCommands};
pub use login::{extract_coordinate, LoginSession, LoginState, PROMPT_MARKER};
pub use outcome::{classify, CommandResult};
pub use process::run_command;
