//! Remote session abstraction for cql-exec.
//!
//! Provides a trait-based interface over the node's legacy RPC calls, so the
//! Thrift transport and the in-memory mock can be used interchangeably.

mod mock;
mod transport;
mod types;

pub use mock::{MockSessionFactory, RpcCall};
pub use transport::{ThriftSession, ThriftSessionFactory, DEFAULT_RPC_PORT};
pub use types::{Column, Compression, CqlResult, CqlResultType, CqlRow};

use crate::error::Result;
use tracing::debug;

/// One open session with a remote node.
///
/// Each call is synchronous; a session is used by exactly one unit of work
/// and closed afterwards.
pub trait RpcSession {
    /// Looks up a keyspace definition. Fails if the keyspace does not exist
    /// or the call itself failed; the two cases are not distinguished.
    fn describe_keyspace(&mut self, name: &str) -> Result<()>;

    /// Scopes subsequent queries on this session to a keyspace.
    fn set_keyspace(&mut self, name: &str) -> Result<()>;

    /// Sends an encoded statement and returns its structured result.
    fn execute_cql_query(&mut self, query: &[u8], compression: Compression)
        -> Result<CqlResult>;

    /// Closes the session.
    fn close(&mut self) -> Result<()>;
}

/// Opens sessions against a fixed remote address and port.
pub trait SessionFactory {
    /// Opens a new session.
    fn open(&self) -> Result<Box<dyn RpcSession>>;

    /// Returns `address:port` for log and error messages.
    fn endpoint(&self) -> String;
}

/// Closes the wrapped session when dropped.
struct ScopedSession {
    session: Box<dyn RpcSession>,
}

impl Drop for ScopedSession {
    fn drop(&mut self) {
        if let Err(e) = self.session.close() {
            debug!("Ignoring error while closing session: {}", e);
        }
    }
}

/// Runs one unit of work inside a freshly opened session.
///
/// The session is closed before this returns, whether `operation` succeeds,
/// fails or panics. A failing close never replaces the operation's result.
pub fn with_session<T>(
    factory: &dyn SessionFactory,
    operation: impl FnOnce(&mut dyn RpcSession) -> Result<T>,
) -> Result<T> {
    let mut scoped = ScopedSession {
        session: factory.open()?,
    };
    operation(scoped.session.as_mut())
}
