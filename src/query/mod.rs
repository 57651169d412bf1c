//! Statement loading, execution and result printing.
//!
//! Each step is isolated so it can be tested against the mock node without
//! the full runner.

pub mod executor;
pub mod printer;
pub mod script;
pub mod skip;

pub use executor::{ExecutionResult, StatementExecutor};
pub use printer::{LineSink, LogSink, ResultPrinter, RowCodecs, SEPARATOR};
pub use script::{load_statement_text, split_statements, Statement, DELIMITER};
pub use skip::{keyspace_exists, SkipEvaluator, SkipReason};
