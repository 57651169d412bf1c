//! Error types for cql-exec.
//!
//! Defines the main error enum used throughout the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cql-exec operations.
#[derive(Error, Debug)]
pub enum CqlExecError {
    /// Configuration errors (unknown type name, bad config file, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The script file existed when checked but was gone when read.
    #[error("Cql file '{}' was deleted before it could be read", .0.display())]
    ScriptVanished(PathBuf),

    /// Any other failure while loading the script file.
    #[error("Could not load cql file '{}': {source}", path.display())]
    ScriptUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Opening an RPC session failed (node unreachable, refused, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// A remote call failed (server exception, transport or protocol failure).
    #[error("RPC error: {0}")]
    Rpc(String),

    /// A statement could not be executed; carries the statement for context.
    #[error("Execution failed: {0}")]
    Execution(String),

    /// Raw bytes could not be rendered with the configured type.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl CqlExecError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates an RPC error with the given message.
    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    /// Creates an execution error with the given message.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Creates a decode error with the given message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::ScriptVanished(_) | Self::ScriptUnreadable { .. } => {
                "Configuration Error"
            }
            Self::Connection(_) => "Connection Error",
            Self::Rpc(_) | Self::Execution(_) => "Execution Error",
            Self::Decode(_) => "Decode Error",
        }
    }
}

/// Result type alias using CqlExecError.
pub type Result<T> = std::result::Result<T, CqlExecError>;
