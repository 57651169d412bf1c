//! Live tests against a real node.
//!
//! Skipped unless CQL_EXEC_TEST_RPC_ADDRESS is set.

use cql_exec::error::CqlExecError;
use cql_exec::query::keyspace_exists;
use cql_exec::rpc::{with_session, Compression, ThriftSessionFactory, DEFAULT_RPC_PORT};

/// Helper to build a factory for the test node from the environment.
fn get_test_factory() -> Option<ThriftSessionFactory> {
    let address = std::env::var("CQL_EXEC_TEST_RPC_ADDRESS").ok()?;
    let port = std::env::var("CQL_EXEC_TEST_RPC_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_RPC_PORT);
    Some(ThriftSessionFactory::new(address, port))
}

#[test]
fn test_system_keyspace_exists() {
    let Some(factory) = get_test_factory() else {
        eprintln!("Skipping test: CQL_EXEC_TEST_RPC_ADDRESS not set");
        return;
    };

    assert!(keyspace_exists(&factory, "system").unwrap());
    assert!(!keyspace_exists(&factory, "cql_exec_no_such_keyspace").unwrap());
}

#[test]
fn test_set_unknown_keyspace_fails() {
    let Some(factory) = get_test_factory() else {
        eprintln!("Skipping test: CQL_EXEC_TEST_RPC_ADDRESS not set");
        return;
    };

    let result = with_session(&factory, |session| {
        session.set_keyspace("cql_exec_no_such_keyspace")
    });

    assert!(matches!(result, Err(CqlExecError::Rpc(_))));
}

#[test]
fn test_invalid_query_is_rejected() {
    let Some(factory) = get_test_factory() else {
        eprintln!("Skipping test: CQL_EXEC_TEST_RPC_ADDRESS not set");
        return;
    };

    let result = with_session(&factory, |session| {
        session.execute_cql_query(b"THIS IS NOT CQL", Compression::None)
    });

    let err = result.unwrap_err();
    assert!(err.to_string().contains("InvalidRequestException"));
}
