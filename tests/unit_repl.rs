//! Unit tests for the interactive shell state and input sources

use std::io::{Cursor, Write};
use std::path::PathBuf;

use grepql::Outcome;
use grepql::error::ErrorKind;
use grepql::repl::{ExecuteError, InputResult, MetaCommand, ReplState};
use grepql::source;
use tempfile::NamedTempFile;

fn temp_input(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

// ============================================================================
// Input classification
// ============================================================================

#[test]
fn test_process_line_classifies_input() {
    let state = ReplState::new();
    assert_eq!(state.process_line("   "), InputResult::Empty);
    assert_eq!(
        state.process_line(r#"  FIND LINES THAT CONTAINS "x"  "#),
        InputResult::Query(r#"FIND LINES THAT CONTAINS "x""#.to_string())
    );
    assert_eq!(
        state.process_line(":quit"),
        InputResult::MetaCommand(MetaCommand::Quit)
    );
}

#[test]
fn test_meta_command_parse() {
    assert_eq!(MetaCommand::parse(":help"), MetaCommand::Help);
    assert_eq!(MetaCommand::parse(":q"), MetaCommand::Quit);
    assert_eq!(
        MetaCommand::parse(":file logs/app.log"),
        MetaCommand::File(PathBuf::from("logs/app.log"))
    );
    assert_eq!(
        MetaCommand::parse(r#":explain COUNT LINES THAT CONTAINS "a b""#),
        MetaCommand::Explain(r#"COUNT LINES THAT CONTAINS "a b""#.to_string())
    );
    assert!(matches!(MetaCommand::parse(":file"), MetaCommand::Unknown(_)));
    assert!(matches!(MetaCommand::parse(":frobnicate"), MetaCommand::Unknown(_)));
}

#[test]
fn test_set_input_dash_means_stdin() {
    let mut state = ReplState::with_input("data.txt");
    assert_eq!(state.input_name(), "data.txt");
    state.set_input(&PathBuf::from("-"));
    assert!(state.input.is_none());
    assert_eq!(state.input_name(), "<stdin>");
}

// ============================================================================
// Execution
// ============================================================================

#[test]
fn test_execute_against_file() {
    let file = temp_input("ID:1 keep\nID:2 drop\r\nID:3 keep\n");
    let state = ReplState::with_input(file.path());

    let outcome = state
        .execute(r#"EXTRACT REGEX "ID:(\d+)" FROM LINES THAT CONTAINS "keep""#)
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::Extractions(vec!["1".to_string(), "3".to_string()])
    );

    // Each query re-opens the input
    let outcome = state.execute(r#"COUNT LINES THAT ENDS WITH "drop""#).unwrap();
    assert_eq!(outcome, Outcome::Count(1));
}

#[test]
fn test_execute_reports_query_errors() {
    let file = temp_input("x\n");
    let state = ReplState::with_input(file.path());
    match state.execute(r#"FIND LINES THAT REGEX "(""#) {
        Err(ExecuteError::Query(e)) => assert_eq!(e.kind(), ErrorKind::Pattern),
        other => panic!("Expected pattern error, got {:?}", other),
    }
}

#[test]
fn test_execute_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let state = ReplState::with_input(dir.path().join("missing.txt"));
    assert!(matches!(
        state.execute("FIND LINES"),
        Err(ExecuteError::Io(_))
    ));
}

// ============================================================================
// Sources
// ============================================================================

#[test]
fn test_lines_strip_terminators() {
    let lines: Vec<String> = source::lines(Cursor::new("a\r\nb\n\nc"))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(lines, vec!["a", "b", "", "c"]);
}

#[test]
fn test_lines_replace_invalid_utf8() {
    let bytes: &[u8] = b"ok\n\xff\xfeabc\n";
    let lines: Vec<String> = source::lines(Cursor::new(bytes))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(lines[0], "ok");
    assert!(lines[1].ends_with("abc"));
}

#[test]
fn test_open_file() {
    let file = temp_input("one\ntwo\n");
    let reader = source::open(Some(file.path())).unwrap();
    assert_eq!(source::lines(reader).count(), 2);
}
