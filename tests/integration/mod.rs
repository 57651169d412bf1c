//! Integration tests for cql-exec.

pub mod exec_test;
pub mod live_test;
pub mod script_test;
pub mod skip_test;

use cql_exec::config::ExecSettings;

/// Settings that run `statement` inline, with no script file.
pub fn inline_settings(statement: &str) -> ExecSettings {
    ExecSettings {
        script: None,
        statement: Some(statement.to_string()),
        ..Default::default()
    }
}
