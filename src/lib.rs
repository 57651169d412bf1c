//! cql-exec - run CQL statements against a Cassandra node over the legacy
//! Thrift RPC interface and print the returned rows.
//!
//! This library exposes the core modules for use by the binary and the
//! integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod marshal;
pub mod query;
pub mod rpc;
pub mod runner;
