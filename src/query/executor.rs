//! Statement execution.
//!
//! Every statement runs in its own session; results are handed back as
//! forward-only row cursors.

use crate::error::{CqlExecError, Result};
use crate::query::script::Statement;
use crate::rpc::{with_session, Compression, CqlResultType, CqlRow, SessionFactory};
use tracing::{debug, info};

/// Executes statements against a node, optionally scoped to a keyspace.
pub struct StatementExecutor<'a> {
    factory: &'a dyn SessionFactory,
    keyspace: Option<&'a str>,
}

impl<'a> StatementExecutor<'a> {
    /// Creates a new statement executor.
    pub fn new(factory: &'a dyn SessionFactory, keyspace: Option<&'a str>) -> Self {
        Self { factory, keyspace }
    }

    /// Executes one statement in a fresh session.
    ///
    /// Keyspace selection and query failures are wrapped with the statement
    /// text so they can be diagnosed from the error alone.
    pub fn execute(&self, statement: &Statement) -> Result<ExecutionResult> {
        with_session(self.factory, |session| {
            if let Some(keyspace) = self.keyspace {
                info!("setting keyspace: {}", keyspace);
                session.set_keyspace(keyspace).map_err(|e| {
                    CqlExecError::execution(format!(
                        "could not set keyspace '{keyspace}' for statement '{statement}': {e}"
                    ))
                })?;
            }

            debug!("Executing: {}", statement);
            let result = session
                .execute_cql_query(statement.as_bytes(), Compression::None)
                .map_err(|e| {
                    CqlExecError::execution(format!(
                        "statement '{statement}' against {}: {e}",
                        self.factory.endpoint()
                    ))
                })?;

            Ok(ExecutionResult {
                statement: statement.clone(),
                result_type: result.result_type,
                num: result.num,
                rows: result.rows.into_iter(),
            })
        })
    }

    /// Executes statements in order, stopping at the first failure.
    pub fn execute_all(&self, statements: &[Statement]) -> Result<Vec<ExecutionResult>> {
        statements
            .iter()
            .map(|statement| self.execute(statement))
            .collect()
    }
}

/// Rows returned for one statement.
///
/// A single-pass cursor: once drained it stays empty.
#[derive(Debug)]
pub struct ExecutionResult {
    statement: Statement,
    result_type: CqlResultType,
    num: Option<i32>,
    rows: std::vec::IntoIter<CqlRow>,
}

impl ExecutionResult {
    /// Returns the statement that produced this result.
    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    /// Returns the kind of result the node reported.
    pub fn result_type(&self) -> CqlResultType {
        self.result_type
    }

    /// Returns the integer payload of an INT result.
    pub fn num(&self) -> Option<i32> {
        self.num
    }
}

impl Iterator for ExecutionResult {
    type Item = CqlRow;

    fn next(&mut self) -> Option<CqlRow> {
        self.rows.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}
