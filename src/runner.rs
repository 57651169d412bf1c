//! End-to-end run: skip check, load, split, execute, print.

use crate::config::ExecSettings;
use crate::error::Result;
use crate::query::{
    load_statement_text, split_statements, LineSink, ResultPrinter, RowCodecs, SkipEvaluator,
    SkipReason, StatementExecutor,
};
use crate::rpc::SessionFactory;
use tracing::{debug, info, warn};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing was executed because of the skip settings.
    Skipped(SkipReason),
    /// No statement text was provided.
    NothingToDo,
    /// Every statement was executed and its rows printed.
    Completed(RunSummary),
}

/// Counts for a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub statements: usize,
    pub rows: usize,
}

/// Runs the configured statements against the node behind `factory`.
///
/// Statements execute strictly in order, one session each; the first
/// failure aborts the run. Rows are printed only after every statement ran.
pub fn run(
    settings: &ExecSettings,
    factory: &dyn SessionFactory,
    sink: &mut dyn LineSink,
) -> Result<RunOutcome> {
    let evaluator = SkipEvaluator::new(
        factory,
        settings.skip,
        settings.skip_if_keyspace_is_present(),
    );
    if let Some(reason) = evaluator.skip_reason()? {
        match &reason {
            SkipReason::Flag => info!("Skipping cql-exec: skip==true"),
            SkipReason::KeyspacePresent(keyspace) => {
                info!("Skipping cql-exec: keyspace '{}' is present", keyspace)
            }
        }
        return Ok(RunOutcome::Skipped(reason));
    }

    let codecs = RowCodecs::resolve(&settings.types)?;
    let text = load_statement_text(settings.script.as_deref(), settings.statement.as_deref())?;

    let statements = text.as_deref().map(split_statements).unwrap_or_default();
    if statements.is_empty() {
        warn!("No CQL provided. Nothing to do.");
        return Ok(RunOutcome::NothingToDo);
    }
    debug!("Executing {} statement(s) against {}", statements.len(), factory.endpoint());

    let executor = StatementExecutor::new(factory, settings.keyspace());
    let results = executor.execute_all(&statements)?;
    let rows = ResultPrinter::new(&codecs).print(results, sink)?;

    Ok(RunOutcome::Completed(RunSummary {
        statements: statements.len(),
        rows,
    }))
}
