// tests/command_outcome.rs

use seqwatch::exec::{classify, extract_coordinate, CommandResult, PROMPT_MARKER};

#[test]
fn clean_exit_takes_first_non_empty_stdout_line() {
    let result = classify(true, "\n\n  Logged in as test  \nsecond line\n", "");
    assert_eq!(result, CommandResult::Success("Logged in as test".to_string()));
    assert!(result.is_success());
}

#[test]
fn stderr_on_clean_exit_is_an_error() {
    let result = classify(true, "some output\n", "  Unauthorized\n");
    assert_eq!(result, CommandResult::Error("Unauthorized".to_string()));
}

#[test]
fn non_zero_exit_is_a_failed_command_with_stdout() {
    let result = classify(false, "  something broke \n", "trace\n");
    assert_eq!(result, CommandResult::FailedCommand("something broke".to_string()));
}

#[test]
fn non_zero_exit_without_stdout_falls_back_to_stderr() {
    let result = classify(false, "", "No such file\n");
    assert_eq!(result, CommandResult::FailedCommand("No such file".to_string()));
}

#[test]
fn clean_exit_without_output_is_a_failed_command() {
    let result = classify(true, "   \n", "");
    assert_eq!(result, CommandResult::FailedCommand(String::new()));
}

#[test]
fn message_and_display_cover_every_variant() {
    let cases = [
        (CommandResult::Success("a".into()), "success: a"),
        (CommandResult::Error("b".into()), "error: b"),
        (CommandResult::FailedCommand("c".into()), "command failed: c"),
    ];
    for (result, shown) in cases {
        assert_eq!(result.to_string(), shown);
        assert_eq!(result.message().len(), 1);
    }
}

#[test]
fn coordinates_are_read_from_prompt_lines() {
    assert_eq!(
        extract_coordinate("Provide token for coordinate [7, G]:").as_deref(),
        Some("7G")
    );
    assert_eq!(extract_coordinate("[3, E]:").as_deref(), Some("3E"));
    assert_eq!(extract_coordinate("[1, A]:").as_deref(), Some("1A"));
    assert_eq!(extract_coordinate("[1,A]").as_deref(), Some("1A"));
}

#[test]
fn prompt_without_brackets_has_no_coordinate() {
    assert_eq!(extract_coordinate(PROMPT_MARKER), None);
    assert_eq!(extract_coordinate("Provide token for coordinate 7G"), None);
}

#[test]
fn out_of_range_coordinates_are_passed_through_unvalidated() {
    assert_eq!(extract_coordinate("[9, A]").as_deref(), Some("9A"));
    assert_eq!(extract_coordinate("[10, A]").as_deref(), Some("10A"));
}
