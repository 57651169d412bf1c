//! Statement execution and printing through a full run.

use super::inline_settings;
use cql_exec::error::CqlExecError;
use cql_exec::query::SEPARATOR;
use cql_exec::rpc::{Column, CqlRow, MockSessionFactory, RpcCall};
use cql_exec::runner::{run, RunOutcome, RunSummary};
use pretty_assertions::assert_eq;

#[test]
fn test_single_select_prints_one_row() {
    let factory = MockSessionFactory::new().with_rows(
        "SELECT * FROM t",
        vec![CqlRow::new(vec![0x01], vec![Column::new(vec![0x41], vec![0x42])])],
    );
    let mut lines: Vec<String> = Vec::new();

    let outcome = run(&inline_settings("SELECT * FROM t"), &factory, &mut lines).unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Completed(RunSummary {
            statements: 1,
            rows: 1
        })
    );
    let key = lines.iter().position(|l| l == "Row key: 01").unwrap();
    let name = lines.iter().position(|l| l == " name: 41").unwrap();
    let value = lines.iter().position(|l| l == " value: 42").unwrap();
    assert!(key < name && name < value);
    assert_eq!(lines.iter().filter(|l| l.starts_with("Row key: ")).count(), 1);
}

#[test]
fn test_multiple_statements_execute_in_order() {
    let factory = MockSessionFactory::new()
        .with_rows("SELECT * FROM a", vec![CqlRow::new(b"a1", vec![]), CqlRow::new(b"a2", vec![])])
        .with_rows("SELECT * FROM b", vec![CqlRow::new(b"b1", vec![])]);
    let mut settings = inline_settings("INSERT INTO a (KEY) VALUES ('a1');SELECT * FROM a;SELECT * FROM b");
    settings.types.key_validator = "UTF8Type".to_string();
    let mut lines: Vec<String> = Vec::new();

    run(&settings, &factory, &mut lines).unwrap();

    assert_eq!(
        factory.executed_statements(),
        vec![
            "INSERT INTO a (KEY) VALUES ('a1')",
            "SELECT * FROM a",
            "SELECT * FROM b",
        ]
    );
    let keys: Vec<&str> = lines
        .iter()
        .filter_map(|l| l.strip_prefix("Row key: "))
        .collect();
    assert_eq!(keys, vec!["a1", "a2", "b1"]);
}

#[test]
fn test_each_statement_gets_its_own_session() {
    let factory = MockSessionFactory::new().with_keyspace("app");
    let mut settings = inline_settings("INSERT INTO t (KEY) VALUES (1);UPDATE t SET v = 2 WHERE KEY = 1");
    settings.keyspace = Some("app".to_string());
    let mut lines: Vec<String> = Vec::new();

    run(&settings, &factory, &mut lines).unwrap();

    assert_eq!(
        factory.calls(),
        vec![
            RpcCall::Open,
            RpcCall::SetKeyspace("app".to_string()),
            RpcCall::ExecuteQuery("INSERT INTO t (KEY) VALUES (1)".to_string()),
            RpcCall::Close,
            RpcCall::Open,
            RpcCall::SetKeyspace("app".to_string()),
            RpcCall::ExecuteQuery("UPDATE t SET v = 2 WHERE KEY = 1".to_string()),
            RpcCall::Close,
        ]
    );
    assert_eq!(lines, vec![SEPARATOR.to_string()]);
}

#[test]
fn test_blank_keyspace_is_not_selected() {
    let factory = MockSessionFactory::new();
    let mut settings = inline_settings("SELECT * FROM t");
    settings.keyspace = Some("  ".to_string());
    let mut lines: Vec<String> = Vec::new();

    run(&settings, &factory, &mut lines).unwrap();

    assert!(!factory
        .calls()
        .iter()
        .any(|call| matches!(call, RpcCall::SetKeyspace(_))));
}

#[test]
fn test_first_failure_stops_the_run() {
    let factory = MockSessionFactory::new()
        .with_rows("SELECT * FROM t", vec![CqlRow::new(vec![0x01], vec![])])
        .with_failing_statement("DROP TABLE x");
    let mut lines: Vec<String> = Vec::new();

    let err = run(
        &inline_settings("SELECT * FROM t;DROP TABLE x;SELECT * FROM t"),
        &factory,
        &mut lines,
    )
    .unwrap_err();

    assert!(matches!(err, CqlExecError::Execution(_)));
    assert!(err.to_string().contains("DROP TABLE x"));
    assert_eq!(factory.executed_statements(), vec!["SELECT * FROM t", "DROP TABLE x"]);
    assert_eq!(factory.open_sessions(), 0);
    assert!(lines.is_empty());
}

#[test]
fn test_decode_failure_fails_the_run() {
    let factory = MockSessionFactory::new().with_rows(
        "SELECT * FROM t",
        vec![CqlRow::new(vec![0xff, 0xfe], vec![])],
    );
    let mut settings = inline_settings("SELECT * FROM t");
    settings.types.key_validator = "UTF8Type".to_string();
    let mut lines: Vec<String> = Vec::new();

    let err = run(&settings, &factory, &mut lines).unwrap_err();

    assert!(matches!(err, CqlExecError::Decode(_)));
    assert_eq!(err.category(), "Decode Error");
}

#[test]
fn test_unreachable_node_is_a_connection_error() {
    let factory = MockSessionFactory::unreachable();
    let mut lines: Vec<String> = Vec::new();

    let err = run(&inline_settings("SELECT * FROM t"), &factory, &mut lines).unwrap_err();

    assert!(matches!(err, CqlExecError::Connection(_)));
}
