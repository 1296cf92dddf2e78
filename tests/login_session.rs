// tests/login_session.rs

#![cfg(unix)]

mod common;
use crate::common::builders::sample_card;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::time::Duration;

use seqwatch::errors::ValidationError;
use seqwatch::exec::{CommandExecutor, CommandResult, ExecOptions, LoginSession, LoginState, ProcessExecutor};

type TestResult = Result<(), Box<dyn Error>>;

const TIMEOUT: Duration = Duration::from_secs(3);
const PROMPT_TIMEOUT: Duration = Duration::from_secs(3);

fn sh(script: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script.to_string()]
}

/// A stand-in for the upload tool: prints a banner and the prompt, checks
/// the answer, then runs `after`.
fn fake_tool(coordinate: &str, expected: &str, after: &str) -> Vec<String> {
    sh(&format!(
        "echo 'Connecting...'; \
         printf 'Provide token for coordinate {coordinate}: '; \
         read tok; \
         if [ \"$tok\" != \"{expected}\" ]; then echo \"wrong token $tok\"; exit 9; fi; \
         {after}"
    ))
}

#[tokio::test]
async fn correct_token_and_clean_exit_is_success() -> TestResult {
    init_tracing();
    let card = sample_card();
    let argv = fake_tool("[3, E]", "vv87", "echo 'Login successful'");

    let mut session = LoginSession::new(&card, TIMEOUT, PROMPT_TIMEOUT);
    assert_eq!(session.state(), LoginState::Idle);

    let result = with_timeout(session.run(&argv)).await?;
    assert_eq!(result, CommandResult::Success("Login successful".to_string()));
    assert_eq!(session.state(), LoginState::Done);
    Ok(())
}

#[tokio::test]
async fn stderr_after_answer_is_error() -> TestResult {
    init_tracing();
    let card = sample_card();
    let argv = fake_tool("[7, G]", "l93w", "echo 'Unauthorized' >&2");

    let mut session = LoginSession::new(&card, TIMEOUT, PROMPT_TIMEOUT);
    let result = with_timeout(session.run(&argv)).await?;
    assert_eq!(result, CommandResult::Error("Unauthorized".to_string()));
    Ok(())
}

#[tokio::test]
async fn non_zero_exit_after_answer_is_failed_command() -> TestResult {
    init_tracing();
    let card = sample_card();
    let argv = fake_tool("[1, A]", "iuh7", "echo 'server said no'; exit 3");

    let mut session = LoginSession::new(&card, TIMEOUT, PROMPT_TIMEOUT);
    let result = with_timeout(session.run(&argv)).await?;
    assert_eq!(result, CommandResult::FailedCommand("server said no".to_string()));
    Ok(())
}

#[tokio::test]
async fn prompt_split_across_writes_is_found() -> TestResult {
    init_tracing();
    let card = sample_card();
    let argv = sh(
        "printf 'Provide token for '; sleep 0.2; printf 'coordinate [8, H]:\\n'; \
         read tok; echo \"got $tok\"",
    );

    let mut session = LoginSession::new(&card, TIMEOUT, PROMPT_TIMEOUT);
    let result = with_timeout(session.run(&argv)).await?;
    assert_eq!(result, CommandResult::Success("got si82".to_string()));
    Ok(())
}

#[tokio::test]
async fn exit_without_prompt_is_failed_command() -> TestResult {
    init_tracing();
    let card = sample_card();

    let mut session = LoginSession::new(&card, TIMEOUT, PROMPT_TIMEOUT);
    let result = with_timeout(session.run(&sh("echo 'nothing to see'"))).await?;
    match result {
        CommandResult::FailedCommand(msg) => {
            assert!(msg.contains("no coordinate prompt observed"), "message: {msg}")
        }
        other => panic!("expected FailedCommand, got {other:?}"),
    }
    assert_eq!(session.state(), LoginState::Done);
    Ok(())
}

#[tokio::test]
async fn silent_process_hits_prompt_timeout() -> TestResult {
    init_tracing();
    let card = sample_card();

    let mut session = LoginSession::new(&card, TIMEOUT, Duration::from_millis(300));
    let result = with_timeout(session.run(&sh("sleep 10"))).await?;
    assert!(matches!(result, CommandResult::FailedCommand(_)), "got {result:?}");
    Ok(())
}

#[tokio::test]
async fn unbounded_timeouts_do_not_break_the_session() -> TestResult {
    init_tracing();
    let card = sample_card();
    let argv = fake_tool("[1, A]", "iuh7", "echo 'Login successful'");

    let mut session = LoginSession::new(&card, Duration::MAX, Duration::MAX);
    let result = with_timeout(session.run(&argv)).await?;
    assert_eq!(result, CommandResult::Success("Login successful".to_string()));
    Ok(())
}

#[tokio::test]
async fn unanswerable_coordinate_ends_the_session_with_validation_error() {
    init_tracing();
    let card = sample_card();
    let argv = sh("echo 'Provide token for coordinate [9, A]:'; read tok; echo done");

    let mut session = LoginSession::new(&card, TIMEOUT, PROMPT_TIMEOUT);
    let err = with_timeout(session.run(&argv)).await.unwrap_err();
    assert_eq!(err, ValidationError::ColumnOutOfRange("9".to_string()));
    assert_eq!(err.to_string(), "coordinate not in range 1 to 8. Was 9");
    assert_eq!(session.state(), LoginState::Done);
}

#[tokio::test]
async fn missing_program_is_failed_command() -> TestResult {
    init_tracing();
    let card = sample_card();
    let argv = vec!["/definitely/not/a/login/tool".to_string()];

    let mut session = LoginSession::new(&card, TIMEOUT, PROMPT_TIMEOUT);
    let result = with_timeout(session.run(&argv)).await?;
    assert!(matches!(result, CommandResult::FailedCommand(_)));
    Ok(())
}

#[tokio::test]
async fn process_executor_login_answers_from_card() -> TestResult {
    init_tracing();
    let card = sample_card();
    let executor = ProcessExecutor::new(ExecOptions {
        timeout: TIMEOUT,
        prompt_timeout: PROMPT_TIMEOUT,
    });
    let argv = fake_tool("[5, C]", "smn6", "echo welcome");

    let result = with_timeout(executor.login(&argv, &card)).await?;
    assert_eq!(result, CommandResult::Success("welcome".to_string()));
    Ok(())
}
