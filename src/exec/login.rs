// src/exec/login.rs

//! Interactive login against the upload tool.
//!
//! The tool asks for one token from the user's token card:
//!
//! ```text
//! Provide token for coordinate [7, G]:
//! ```
//!
//! We read its stdout until that prompt shows up, look the coordinate up on
//! the card, type the token back on stdin, then drain and classify the rest
//! of the session like any other command.

use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, ChildStdout};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::card::TokenCard;
use crate::errors::{ParseError, ValidationError};
use crate::exec::outcome::{classify, CommandResult};
use crate::exec::process::{join_reader, kill_and_reap, spawn, spawn_reader};

/// Every prompt line starts with this text.
pub const PROMPT_MARKER: &str = "Provide token for coordinate";

/// Upper bound on a single stdout read while waiting for the prompt.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn coordinate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[\s*([^,\]\s]+)\s*,\s*([^\]\s]+)\s*\]").expect("coordinate regex is valid")
    })
}

/// Pull the coordinate out of a prompt line.
///
/// `"Provide token for coordinate [7, G]:"` becomes `"7G"`. The result is
/// not validated; that is the token card's job.
pub fn extract_coordinate(text: &str) -> Option<String> {
    coordinate_regex()
        .captures(text)
        .map(|caps| format!("{}{}", &caps[1], &caps[2]))
}

/// Scan accumulated output for a complete prompt line.
fn find_prompt(output: &str) -> Option<String> {
    output
        .split('\n')
        .map(str::trim_start)
        .filter(|line| line.starts_with(PROMPT_MARKER))
        .find_map(extract_coordinate)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    AwaitingPrompt,
    AnsweringPrompt,
    Draining,
    Done,
}

/// One login attempt. Owns the child process for its whole lifetime.
#[derive(Debug)]
pub struct LoginSession<'a> {
    card: &'a TokenCard,
    timeout: Duration,
    prompt_timeout: Duration,
    state: LoginState,
}

impl<'a> LoginSession<'a> {
    /// - `timeout` bounds the final wait for the process after the token was
    ///   sent.
    /// - `prompt_timeout` bounds the wait for the coordinate prompt.
    pub fn new(card: &'a TokenCard, timeout: Duration, prompt_timeout: Duration) -> Self {
        Self {
            card,
            timeout,
            prompt_timeout,
            state: LoginState::Idle,
        }
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    fn transition(&mut self, next: LoginState) {
        debug!(from = ?self.state, to = ?next, "login state change");
        self.state = next;
    }

    /// Drive the session to completion.
    ///
    /// Returns `Err` only when the prompt asked for a coordinate the card
    /// cannot answer. Every other failure is a `FailedCommand`.
    pub async fn run(&mut self, argv: &[String]) -> Result<CommandResult, ValidationError> {
        info!(program = ?argv.first(), "starting login");

        let mut child = match spawn(argv, Stdio::piped()) {
            Ok(child) => child,
            Err(err) => {
                warn!(error = %err, "login process did not start");
                self.transition(LoginState::Done);
                return Ok(CommandResult::FailedCommand(err.to_string()));
            }
        };
        self.transition(LoginState::AwaitingPrompt);

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        // Drain stderr from the start so a chatty tool never blocks on it.
        let stderr = spawn_reader(child.stderr.take());

        let (Some(stdin), Some(mut stdout)) = (stdin, stdout) else {
            kill_and_reap(&mut child).await;
            self.transition(LoginState::Done);
            return Ok(CommandResult::FailedCommand(
                "login process has no stdin/stdout pipes".to_string(),
            ));
        };

        let coordinate = match self.await_prompt(&mut stdout).await {
            Ok(coordinate) => coordinate,
            Err(err) => {
                warn!(error = %err, "login prompt never appeared");
                kill_and_reap(&mut child).await;
                let stderr = join_reader(stderr).await;
                if !stderr.trim().is_empty() {
                    debug!(stderr = %stderr.trim(), "login stderr");
                }
                self.transition(LoginState::Done);
                return Ok(CommandResult::FailedCommand(err.to_string()));
            }
        };
        self.transition(LoginState::AnsweringPrompt);

        let card = self.card;
        let token = match card.get_token(&coordinate) {
            Ok(token) => token,
            Err(err) => {
                error!(coordinate = %coordinate, error = %err, "token card cannot answer prompt");
                kill_and_reap(&mut child).await;
                self.transition(LoginState::Done);
                return Err(err);
            }
        };
        debug!(coordinate = %coordinate, "answering login prompt");

        if let Err(e) = answer(stdin, token).await {
            warn!(error = %e, "could not send token to login process");
            kill_and_reap(&mut child).await;
            self.transition(LoginState::Done);
            return Ok(CommandResult::FailedCommand(format!(
                "writing token to login process: {e}"
            )));
        }
        self.transition(LoginState::Draining);

        let drained = tokio::time::timeout(self.timeout, async {
            let mut rest = Vec::new();
            if let Err(e) = stdout.read_to_end(&mut rest).await {
                debug!(error = %e, "stdout read ended with error");
            }
            child.wait().await.map(|status| (rest, status))
        })
        .await;

        let result = match drained {
            Ok(Ok((rest, status))) => {
                let stdout = String::from_utf8_lossy(&rest);
                let stderr = join_reader(stderr).await;
                info!(
                    exit_code = status.code().unwrap_or(-1),
                    success = status.success(),
                    "login process exited"
                );
                classify(status.success(), &stdout, &stderr)
            }
            Ok(Err(e)) => {
                kill_and_reap(&mut child).await;
                CommandResult::FailedCommand(format!("waiting for login process: {e}"))
            }
            Err(_) => {
                warn!(after = ?self.timeout, "login process did not exit; killing it");
                kill_and_reap(&mut child).await;
                stderr.abort();
                CommandResult::FailedCommand(format!(
                    "login timed out after {:?}",
                    self.timeout
                ))
            }
        };

        self.transition(LoginState::Done);
        Ok(result)
    }

    /// Accumulate stdout until a prompt line with a coordinate appears.
    async fn await_prompt(&self, stdout: &mut ChildStdout) -> Result<String, ParseError> {
        // `None` when the timeout is too large to represent: wait forever.
        let deadline = Instant::now().checked_add(self.prompt_timeout);
        let mut seen = String::new();
        let mut buf = [0u8; 4096];

        loop {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(ParseError::NoPromptObserved(format!(
                    "waited {:?}",
                    self.prompt_timeout
                )));
            }

            match tokio::time::timeout(POLL_INTERVAL, stdout.read(&mut buf)).await {
                Err(_) => continue,
                Ok(Ok(0)) => {
                    return Err(ParseError::NoPromptObserved(
                        "process closed its output".to_string(),
                    ));
                }
                Ok(Ok(n)) => {
                    seen.push_str(&String::from_utf8_lossy(&buf[..n]));
                    if let Some(coordinate) = find_prompt(&seen) {
                        return Ok(coordinate);
                    }
                }
                Ok(Err(e)) => {
                    return Err(ParseError::NoPromptObserved(format!(
                        "reading process output: {e}"
                    )));
                }
            }
        }
    }
}

async fn answer(mut stdin: ChildStdin, token: &str) -> std::io::Result<()> {
    stdin.write_all(token.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await?;
    // Dropping stdin closes the pipe so the tool sees EOF after the token.
    Ok(())
}
