//! Statement loading from script files through a full run.

use super::inline_settings;
use cql_exec::error::CqlExecError;
use cql_exec::rpc::MockSessionFactory;
use cql_exec::runner::{run, RunOutcome};
use std::io::Write;

#[test]
fn test_script_file_overrides_inline_statement() {
    let mut script = tempfile::NamedTempFile::new().unwrap();
    write!(
        script,
        "CREATE COLUMNFAMILY users (KEY varchar PRIMARY KEY);\nINSERT INTO users (KEY) VALUES ('u1');\n"
    )
    .unwrap();
    let factory = MockSessionFactory::new();
    let mut settings = inline_settings("SELECT * FROM ignored");
    settings.script = Some(script.path().to_path_buf());
    let mut lines: Vec<String> = Vec::new();

    run(&settings, &factory, &mut lines).unwrap();

    assert_eq!(
        factory.executed_statements(),
        vec![
            "CREATE COLUMNFAMILY users (KEY varchar PRIMARY KEY)",
            "\nINSERT INTO users (KEY) VALUES ('u1')",
        ]
    );
}

#[test]
fn test_missing_script_falls_back_to_inline_statement() {
    let dir = tempfile::tempdir().unwrap();
    let factory = MockSessionFactory::new();
    let mut settings = inline_settings("SELECT * FROM t");
    settings.script = Some(dir.path().join("exec.cql"));
    let mut lines: Vec<String> = Vec::new();

    run(&settings, &factory, &mut lines).unwrap();

    assert_eq!(factory.executed_statements(), vec!["SELECT * FROM t"]);
}

#[test]
fn test_trailing_delimiter_sends_no_empty_statement() {
    let factory = MockSessionFactory::new();
    let mut lines: Vec<String> = Vec::new();

    run(&inline_settings("a;b;"), &factory, &mut lines).unwrap();

    assert_eq!(factory.executed_statements(), vec!["a", "b"]);
}

#[test]
fn test_empty_script_is_nothing_to_do() {
    let script = tempfile::NamedTempFile::new().unwrap();
    let factory = MockSessionFactory::new();
    let mut settings = inline_settings("SELECT * FROM t");
    settings.script = Some(script.path().to_path_buf());
    let mut lines: Vec<String> = Vec::new();

    let outcome = run(&settings, &factory, &mut lines).unwrap();

    assert_eq!(outcome, RunOutcome::NothingToDo);
    assert!(factory.calls().is_empty());
}

#[test]
fn test_no_statement_at_all_is_nothing_to_do() {
    let factory = MockSessionFactory::new();
    let mut settings = inline_settings("");
    settings.statement = None;
    let mut lines: Vec<String> = Vec::new();

    let outcome = run(&settings, &factory, &mut lines).unwrap();

    assert_eq!(outcome, RunOutcome::NothingToDo);
    assert!(factory.calls().is_empty());
}

#[test]
fn test_unreadable_script_fails_before_any_execution() {
    let mut script = tempfile::NamedTempFile::new().unwrap();
    script.write_all(&[0xc3, 0x28, b';']).unwrap();
    let factory = MockSessionFactory::new();
    let mut settings = inline_settings("SELECT * FROM t");
    settings.script = Some(script.path().to_path_buf());
    let mut lines: Vec<String> = Vec::new();

    let err = run(&settings, &factory, &mut lines).unwrap_err();

    assert!(matches!(err, CqlExecError::ScriptUnreadable { .. }));
    assert!(err.to_string().contains(&script.path().display().to_string()));
    assert!(factory.executed_statements().is_empty());
}
