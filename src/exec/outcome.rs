// src/exec/outcome.rs

use std::fmt;

/// Classified result of running one external command.
///
/// - `Success`: clean exit, nothing on stderr. Carries the first non-empty
///   stdout line.
/// - `Error`: clean exit but the tool complained on stderr (for example
///   `Unauthorized`). Recoverable at the application level.
/// - `FailedCommand`: the tool itself failed (non-zero exit, no output,
///   spawn failure, timeout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Success(String),
    Error(String),
    FailedCommand(String),
}

impl CommandResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandResult::Success(_))
    }

    /// The message or detail carried by any variant.
    pub fn message(&self) -> &str {
        match self {
            CommandResult::Success(msg)
            | CommandResult::Error(msg)
            | CommandResult::FailedCommand(msg) => msg,
        }
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Success(msg) => write!(f, "success: {msg}"),
            CommandResult::Error(msg) => write!(f, "error: {msg}"),
            CommandResult::FailedCommand(msg) => write!(f, "command failed: {msg}"),
        }
    }
}

/// Apply the three-way classification to a finished process.
///
/// When the command failed and printed nothing on stdout, the stderr text is
/// used as the detail instead so the caller still sees why.
pub fn classify(exit_success: bool, stdout: &str, stderr: &str) -> CommandResult {
    let stderr = stderr.trim();

    if exit_success && stderr.is_empty() {
        if let Some(first) = stdout.lines().map(str::trim).find(|line| !line.is_empty()) {
            return CommandResult::Success(first.to_string());
        }
    } else if exit_success {
        return CommandResult::Error(stderr.to_string());
    }

    let stdout = stdout.trim();
    if stdout.is_empty() {
        CommandResult::FailedCommand(stderr.to_string())
    } else {
        CommandResult::FailedCommand(stdout.to_string())
    }
}
