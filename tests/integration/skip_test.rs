//! Skip evaluation through a full run.

use super::inline_settings;
use cql_exec::error::CqlExecError;
use cql_exec::query::SkipReason;
use cql_exec::rpc::{MockSessionFactory, RpcCall};
use cql_exec::runner::{run, RunOutcome};

#[test]
fn test_skip_flag_makes_no_rpc_calls() {
    let factory = MockSessionFactory::new().with_keyspace("ks1");
    let mut settings = inline_settings("SELECT * FROM t");
    settings.skip = true;
    settings.skip_if_keyspace_is_present = Some("ks1".to_string());
    settings.types.comparator = "NotAType".to_string();
    let mut lines: Vec<String> = Vec::new();

    let outcome = run(&settings, &factory, &mut lines).unwrap();

    assert_eq!(outcome, RunOutcome::Skipped(SkipReason::Flag));
    assert!(factory.calls().is_empty());
    assert!(lines.is_empty());
}

#[test]
fn test_present_keyspace_skips_every_statement() {
    let factory = MockSessionFactory::new().with_keyspace("ks1");
    let mut settings = inline_settings("CREATE KEYSPACE ks1;USE ks1");
    settings.skip_if_keyspace_is_present = Some("ks1".to_string());
    let mut lines: Vec<String> = Vec::new();

    let outcome = run(&settings, &factory, &mut lines).unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Skipped(SkipReason::KeyspacePresent("ks1".to_string()))
    );
    assert_eq!(
        factory.calls(),
        vec![
            RpcCall::Open,
            RpcCall::DescribeKeyspace("ks1".to_string()),
            RpcCall::Close,
        ]
    );
}

#[test]
fn test_absent_keyspace_runs_statements() {
    let factory = MockSessionFactory::new();
    let mut settings = inline_settings("CREATE KEYSPACE ks1");
    settings.skip_if_keyspace_is_present = Some("ks1".to_string());
    let mut lines: Vec<String> = Vec::new();

    run(&settings, &factory, &mut lines).unwrap();

    assert_eq!(factory.executed_statements(), vec!["CREATE KEYSPACE ks1"]);
}

#[test]
fn test_failed_describe_runs_statements() {
    let factory = MockSessionFactory::new()
        .with_keyspace("ks1")
        .with_failing_describe();
    let mut settings = inline_settings("CREATE KEYSPACE ks1");
    settings.skip_if_keyspace_is_present = Some("ks1".to_string());
    let mut lines: Vec<String> = Vec::new();

    run(&settings, &factory, &mut lines).unwrap();

    assert_eq!(factory.executed_statements(), vec!["CREATE KEYSPACE ks1"]);
}

#[test]
fn test_blank_skip_keyspace_is_ignored() {
    let factory = MockSessionFactory::new();
    let mut settings = inline_settings("SELECT * FROM t");
    settings.skip_if_keyspace_is_present = Some(" ".to_string());
    let mut lines: Vec<String> = Vec::new();

    run(&settings, &factory, &mut lines).unwrap();

    assert!(!factory
        .calls()
        .iter()
        .any(|call| matches!(call, RpcCall::DescribeKeyspace(_))));
}

#[test]
fn test_unreachable_node_during_keyspace_check_is_fatal() {
    let factory = MockSessionFactory::unreachable();
    let mut settings = inline_settings("SELECT * FROM t");
    settings.skip_if_keyspace_is_present = Some("ks1".to_string());
    let mut lines: Vec<String> = Vec::new();

    let err = run(&settings, &factory, &mut lines).unwrap_err();

    assert!(matches!(err, CqlExecError::Connection(_)));
}
