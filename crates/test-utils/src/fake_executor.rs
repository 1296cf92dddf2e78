use std::sync::Mutex;

use seqwatch::card::TokenCard;
use seqwatch::exec::backend::{ExecFuture, LoginFuture};
use seqwatch::exec::{CommandExecutor, CommandResult};

/// A fake executor that:
/// - records every command line it is asked to run
/// - answers with scripted results (`Success("ok")` unless told otherwise)
/// - for login, looks up the prompted coordinate on the card like the real
///   session would.
pub struct FakeExecutor {
    calls: Mutex<Vec<Vec<String>>>,
    responses: Vec<(String, CommandResult)>,
    login_prompt: String,
    answered: Mutex<Vec<String>>,
}

impl Default for FakeExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responses: Vec::new(),
            login_prompt: "1A".to_string(),
            answered: Mutex::new(Vec::new()),
        }
    }

    /// Answer any command line containing `arg` with `result`. The first
    /// matching rule wins.
    pub fn with_response(mut self, arg: &str, result: CommandResult) -> Self {
        self.responses.push((arg.to_string(), result));
        self
    }

    /// Coordinate the simulated login prompt asks for.
    pub fn with_login_prompt(mut self, coordinate: &str) -> Self {
        self.login_prompt = coordinate.to_string();
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Tokens typed into simulated login prompts.
    pub fn answered_tokens(&self) -> Vec<String> {
        self.answered.lock().unwrap().clone()
    }

    fn record(&self, argv: &[String]) -> CommandResult {
        self.calls.lock().unwrap().push(argv.to_vec());
        self.responses
            .iter()
            .find(|(arg, _)| argv.iter().any(|a| a == arg))
            .map(|(_, result)| result.clone())
            .unwrap_or_else(|| CommandResult::Success("ok".to_string()))
    }
}

impl CommandExecutor for FakeExecutor {
    fn execute<'a>(&'a self, argv: &'a [String]) -> ExecFuture<'a> {
        Box::pin(async move { self.record(argv) })
    }

    fn login<'a>(&'a self, argv: &'a [String], card: &'a TokenCard) -> LoginFuture<'a> {
        Box::pin(async move {
            let result = self.record(argv);
            let token = card.get_token(&self.login_prompt)?;
            self.answered.lock().unwrap().push(token.to_string());
            Ok(result)
        })
    }
}
