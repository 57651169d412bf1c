//! Plain line-oriented rendering of execution results.

use crate::config::TypeSettings;
use crate::error::{CqlExecError, Result};
use crate::marshal::MarshalType;
use crate::query::executor::ExecutionResult;
use tracing::info;

/// Separator emitted between rows and columns.
pub const SEPARATOR: &str = "-----------------------------------------------";

/// Receives rendered output lines.
pub trait LineSink {
    fn line(&mut self, line: String);
}

impl LineSink for Vec<String> {
    fn line(&mut self, line: String) {
        self.push(line);
    }
}

/// Forwards every line to the log at info level.
#[derive(Debug, Default)]
pub struct LogSink;

impl LineSink for LogSink {
    fn line(&mut self, line: String) {
        info!("{}", line);
    }
}

/// The three types used to render a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCodecs {
    pub key: MarshalType,
    pub comparator: MarshalType,
    pub default_validator: MarshalType,
}

impl RowCodecs {
    /// Resolves all three configured type names.
    ///
    /// Fails on the first name that does not resolve, naming the setting.
    pub fn resolve(types: &TypeSettings) -> Result<Self> {
        Ok(Self {
            key: resolve_one("key_validator", &types.key_validator)?,
            comparator: resolve_one("comparator", &types.comparator)?,
            default_validator: resolve_one("default_validator", &types.default_validator)?,
        })
    }
}

impl Default for RowCodecs {
    fn default() -> Self {
        Self {
            key: MarshalType::Bytes,
            comparator: MarshalType::Bytes,
            default_validator: MarshalType::Bytes,
        }
    }
}

fn resolve_one(setting: &str, value: &str) -> Result<MarshalType> {
    MarshalType::parse(value).map_err(|e| match e {
        CqlExecError::Config(reason) => CqlExecError::config(format!(
            "Could not parse {setting} value '{value}': {reason}"
        )),
        other => other,
    })
}

/// Renders rows with the resolved codecs.
pub struct ResultPrinter<'a> {
    codecs: &'a RowCodecs,
}

impl<'a> ResultPrinter<'a> {
    /// Creates a new result printer.
    pub fn new(codecs: &'a RowCodecs) -> Self {
        Self { codecs }
    }

    /// Drains each result in order and emits its rows.
    ///
    /// Returns the number of rows printed. A value that cannot be decoded
    /// with its configured type aborts printing.
    pub fn print(&self, results: Vec<ExecutionResult>, sink: &mut dyn LineSink) -> Result<usize> {
        let mut printed = 0;
        sink.line(SEPARATOR.to_string());

        for result in results {
            let statement = result.statement().clone();
            for row in result {
                let key = self
                    .codecs
                    .key
                    .get_string(&row.key)
                    .map_err(|e| decode_error("row key", &self.codecs.key, &statement, e))?;
                sink.line(format!("Row key: {key}"));
                sink.line(SEPARATOR.to_string());

                for column in &row.columns {
                    let name = self.codecs.comparator.get_string(&column.name).map_err(|e| {
                        decode_error("column name", &self.codecs.comparator, &statement, e)
                    })?;
                    sink.line(format!(" name: {name}"));

                    let value = self
                        .codecs
                        .default_validator
                        .get_string(&column.value)
                        .map_err(|e| {
                            decode_error(
                                &format!("value of column '{name}' in row '{key}'"),
                                &self.codecs.default_validator,
                                &statement,
                                e,
                            )
                        })?;
                    sink.line(format!(" value: {value}"));
                    sink.line(SEPARATOR.to_string());
                }
                printed += 1;
            }
        }

        Ok(printed)
    }
}

fn decode_error(
    what: &str,
    ty: &MarshalType,
    statement: &impl std::fmt::Display,
    e: CqlExecError,
) -> CqlExecError {
    let reason = match e {
        CqlExecError::Decode(reason) => reason,
        other => other.to_string(),
    };
    CqlExecError::decode(format!(
        "could not render {what} as {ty} (statement '{statement}'): {reason}"
    ))
}
