// tests/tool_commands.rs

mod common;
use crate::common::builders::sample_commands;

use std::path::Path;

use seqwatch::exec::{Platform, ToolCommands};

fn argv(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[test]
fn python_executable_depends_on_platform() {
    assert_eq!(Platform::Windows.python_executable(), "python.exe");
    assert_eq!(Platform::Unix.python_executable(), "python3");
}

#[test]
fn current_platform_matches_target() {
    let expected = if cfg!(windows) {
        Platform::Windows
    } else {
        Platform::Unix
    };
    assert_eq!(Platform::current(), expected);
}

#[test]
fn simple_commands_have_exact_argument_order() {
    let commands = sample_commands();

    assert_eq!(commands.version(), argv(&["python3", "--version"]));
    assert_eq!(
        commands.logout(),
        argv(&["python3", "sg-upload-v2-wrapper.py", "logout"])
    );
    assert_eq!(
        commands.user_info(),
        argv(&["python3", "sg-upload-v2-wrapper.py", "userInfo"])
    );
    assert_eq!(
        commands.pipeline_list(),
        argv(&["python3", "sg-upload-v2-wrapper.py", "pipeline", "--list"])
    );
}

#[test]
fn login_passes_identity_and_password_file() {
    let commands = sample_commands();
    assert_eq!(
        commands.login(),
        argv(&[
            "python3",
            "sg-upload-v2-wrapper.py",
            "login",
            "-u",
            "user@example.org",
            "-pf",
            "pw.txt",
        ])
    );
}

#[test]
fn run_preparation_and_creation() {
    let commands = sample_commands();

    assert_eq!(
        commands.prepare_run(Path::new("runs/LRT_01"), Path::new("ade.json"), 1811),
        argv(&[
            "python3",
            "adegen.py",
            "runs/LRT_01",
            "-o",
            "ade.json",
            "-p",
            "1811",
            "-c",
        ])
    );
    assert_eq!(
        commands.create_run(Path::new("ade.json")),
        argv(&["python3", "sg-upload-v2-wrapper.py", "new", "-j", "ade.json"])
    );
}

#[test]
fn windows_interpreter_is_used_verbatim() {
    let commands = ToolCommands::new(
        Platform::Windows.python_executable(),
        "wrapper.py",
        "adegen.py",
        "pw.txt",
        "me",
    );
    assert_eq!(commands.version()[0], "python.exe");
    assert_eq!(commands.login()[0], "python.exe");
}
