//! Mock session factory for testing.
//!
//! Provides an in-memory node that records every call made against it.

use super::{Compression, CqlResult, CqlRow, RpcSession, SessionFactory};
use crate::error::{CqlExecError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// A call observed by the mock, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcCall {
    Open,
    DescribeKeyspace(String),
    SetKeyspace(String),
    ExecuteQuery(String),
    Close,
}

#[derive(Debug, Default)]
struct MockState {
    keyspaces: HashSet<String>,
    results: HashMap<String, CqlResult>,
    failing_statements: HashSet<String>,
    failing_describe: bool,
    unreachable: bool,
    calls: Vec<RpcCall>,
    open_sessions: usize,
}

/// A session factory backed by shared in-memory state.
///
/// Statements without canned rows return a VOID result.
#[derive(Debug, Clone, Default)]
pub struct MockSessionFactory {
    state: Arc<Mutex<MockState>>,
}

impl MockSessionFactory {
    /// Creates a mock node with no keyspaces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock node that refuses every connection.
    pub fn unreachable() -> Self {
        let factory = Self::new();
        factory.state().unreachable = true;
        factory
    }

    /// Adds an existing keyspace.
    pub fn with_keyspace(self, name: &str) -> Self {
        self.state().keyspaces.insert(name.to_string());
        self
    }

    /// Returns the given rows when exactly this statement text is executed.
    pub fn with_rows(self, statement: &str, rows: Vec<CqlRow>) -> Self {
        self.state()
            .results
            .insert(statement.to_string(), CqlResult::rows(rows));
        self
    }

    /// Makes execution of exactly this statement text fail.
    pub fn with_failing_statement(self, statement: &str) -> Self {
        self.state().failing_statements.insert(statement.to_string());
        self
    }

    /// Makes every describe call fail, as a node with a broken schema would.
    pub fn with_failing_describe(self) -> Self {
        self.state().failing_describe = true;
        self
    }

    /// Returns every call made so far.
    pub fn calls(&self) -> Vec<RpcCall> {
        self.state().calls.clone()
    }

    /// Returns the statements executed so far, in order.
    pub fn executed_statements(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                RpcCall::ExecuteQuery(statement) => Some(statement.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns the number of sessions opened but not yet closed.
    pub fn open_sessions(&self) -> usize {
        self.state().open_sessions
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionFactory for MockSessionFactory {
    fn open(&self) -> Result<Box<dyn RpcSession>> {
        let mut state = self.state();
        if state.unreachable {
            return Err(CqlExecError::connection(format!(
                "Cannot connect to {}: connection refused",
                self.endpoint()
            )));
        }
        state.calls.push(RpcCall::Open);
        state.open_sessions += 1;
        Ok(Box::new(MockSession {
            state: Arc::clone(&self.state),
        }))
    }

    fn endpoint(&self) -> String {
        "mock:9160".to_string()
    }
}

struct MockSession {
    state: Arc<Mutex<MockState>>,
}

impl MockSession {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RpcSession for MockSession {
    fn describe_keyspace(&mut self, name: &str) -> Result<()> {
        let mut state = self.state();
        state.calls.push(RpcCall::DescribeKeyspace(name.to_string()));
        if state.failing_describe {
            return Err(CqlExecError::rpc("TTransportException: connection reset"));
        }
        if state.keyspaces.contains(name) {
            Ok(())
        } else {
            Err(CqlExecError::rpc("NotFoundException"))
        }
    }

    fn set_keyspace(&mut self, name: &str) -> Result<()> {
        let mut state = self.state();
        state.calls.push(RpcCall::SetKeyspace(name.to_string()));
        if state.keyspaces.contains(name) {
            Ok(())
        } else {
            Err(CqlExecError::rpc(format!(
                "InvalidRequestException: Keyspace '{name}' does not exist"
            )))
        }
    }

    fn execute_cql_query(
        &mut self,
        query: &[u8],
        compression: Compression,
    ) -> Result<CqlResult> {
        let statement = String::from_utf8_lossy(query).into_owned();
        let mut state = self.state();
        state.calls.push(RpcCall::ExecuteQuery(statement.clone()));

        if compression != Compression::None {
            return Err(CqlExecError::rpc(
                "InvalidRequestException: mock only accepts uncompressed queries",
            ));
        }
        if state.failing_statements.contains(&statement) {
            return Err(CqlExecError::rpc(format!(
                "InvalidRequestException: line 1:0 no viable alternative at input '{statement}'"
            )));
        }
        Ok(state.results.get(&statement).cloned().unwrap_or_default())
    }

    fn close(&mut self) -> Result<()> {
        let mut state = self.state();
        state.calls.push(RpcCall::Close);
        state.open_sessions = state.open_sessions.saturating_sub(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::{Column, CqlResultType};

    #[test]
    fn test_mock_describe_keyspace() {
        let factory = MockSessionFactory::new().with_keyspace("ks1");
        let mut session = factory.open().unwrap();

        assert!(session.describe_keyspace("ks1").is_ok());
        assert!(session.describe_keyspace("ks2").is_err());
    }

    #[test]
    fn test_mock_canned_rows() {
        let row = CqlRow::new(vec![0x01], vec![Column::new(vec![0x41], vec![0x42])]);
        let factory = MockSessionFactory::new().with_rows("SELECT * FROM t", vec![row.clone()]);
        let mut session = factory.open().unwrap();

        let result = session
            .execute_cql_query(b"SELECT * FROM t", Compression::None)
            .unwrap();
        assert_eq!(result.result_type, CqlResultType::Rows);
        assert_eq!(result.rows, vec![row]);

        let other = session
            .execute_cql_query(b"INSERT INTO t (KEY) VALUES (1)", Compression::None)
            .unwrap();
        assert_eq!(other.result_type, CqlResultType::Void);
    }

    #[test]
    fn test_mock_records_calls() {
        let factory = MockSessionFactory::new().with_failing_statement("BAD");
        let mut session = factory.open().unwrap();

        assert!(session.execute_cql_query(b"BAD", Compression::None).is_err());
        session.close().unwrap();

        assert_eq!(
            factory.calls(),
            vec![
                RpcCall::Open,
                RpcCall::ExecuteQuery("BAD".to_string()),
                RpcCall::Close,
            ]
        );
        assert_eq!(factory.executed_statements(), vec!["BAD".to_string()]);
    }
}
