//! cql-exec - run CQL statements against a Cassandra node.

use cql_exec::cli::Cli;
use cql_exec::config::Config;
use cql_exec::error::Result;
use cql_exec::logging;
use cql_exec::query::LogSink;
use cql_exec::rpc::ThriftSessionFactory;
use cql_exec::runner::{self, RunOutcome};
use tracing::{error, info};

fn main() {
    logging::init_stderr_logging();

    if let Err(e) = run() {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;
    let settings = cli.to_settings(&config);

    info!("Node: {}", settings.endpoint());
    let factory = ThriftSessionFactory::new(settings.rpc_address.clone(), settings.rpc_port);

    match runner::run(&settings, &factory, &mut LogSink)? {
        RunOutcome::Completed(summary) => info!(
            "Executed {} statement(s), printed {} row(s)",
            summary.statements, summary.rows
        ),
        RunOutcome::Skipped(_) | RunOutcome::NothingToDo => {}
    }

    Ok(())
}
