//! Statement loading and splitting.
//!
//! Splitting is purely lexical: a `;` inside a quoted literal still splits
//! the statement.

use crate::error::{CqlExecError, Result};
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Character separating statements in a script.
pub const DELIMITER: char = ';';

/// One query to execute, exactly as it appeared in the loaded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement(String);

impl Statement {
    /// Creates a statement from its text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the statement text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the encoded form sent to the node.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Produces the statement text for a run.
///
/// When `script` names a regular file its whole contents win over `inline`;
/// otherwise `inline` is returned unchanged. Blank results are left for the
/// caller to treat as "nothing to do".
pub fn load_statement_text(script: Option<&Path>, inline: Option<&str>) -> Result<Option<String>> {
    if let Some(path) = script.filter(|path| path.is_file()) {
        debug!("Reading statements from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                CqlExecError::ScriptVanished(path.to_path_buf())
            } else {
                CqlExecError::ScriptUnreadable {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        if inline.is_some_and(|s| !s.trim().is_empty()) {
            debug!("Script file overrides the inline statement");
        }
        return Ok(Some(text));
    }

    Ok(inline.map(str::to_string))
}

/// Splits loaded text into statements, preserving order.
///
/// Text without a delimiter is a single statement. Otherwise the text is cut
/// at every delimiter and empty or whitespace-only fragments are dropped, so
/// `"a;b;"` yields `["a", "b"]`. Fragments are not trimmed.
pub fn split_statements(text: &str) -> Vec<Statement> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    if !text.contains(DELIMITER) {
        return vec![Statement::new(text)];
    }
    text.split(DELIMITER)
        .filter(|fragment| !fragment.trim().is_empty())
        .map(Statement::new)
        .collect()
}
