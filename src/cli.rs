//! Command-line argument parsing for cql-exec.
//!
//! Every flag can also come from an environment variable; both override the
//! config file.

use crate::config::{Config, ExecSettings};
use clap::Parser;
use std::path::PathBuf;

/// Run CQL statements against a Cassandra node over the legacy RPC interface.
#[derive(Parser, Debug)]
#[command(name = "cql-exec")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Node address
    #[arg(short = 'a', long, value_name = "HOST", env = "CASSANDRA_RPC_ADDRESS")]
    pub rpc_address: Option<String>,

    /// Legacy RPC port
    #[arg(short = 'p', long, value_name = "PORT", env = "CASSANDRA_RPC_PORT")]
    pub rpc_port: Option<u16>,

    /// Keyspace selected before each statement
    #[arg(short = 'k', long, value_name = "KEYSPACE", env = "CASSANDRA_KEYSPACE")]
    pub keyspace: Option<String>,

    /// Statement(s) to execute, separated by ';'
    #[arg(short = 'e', long, value_name = "CQL", env = "CQL_STATEMENT")]
    pub statement: Option<String>,

    /// Script file; when it exists its contents replace --statement
    #[arg(short = 'f', long, value_name = "PATH", env = "CASSANDRA_CQL_SCRIPT")]
    pub script: Option<PathBuf>,

    /// Skip execution entirely
    #[arg(long, env = "CASSANDRA_SKIP")]
    pub skip: bool,

    /// Skip execution if this keyspace already exists
    #[arg(long, value_name = "KEYSPACE", env = "CQL_SKIP_IF_KEYSPACE_IS_PRESENT")]
    pub skip_if_keyspace_is_present: Option<String>,

    /// Type of row keys (e.g. UTF8Type)
    #[arg(long, value_name = "TYPE", env = "CQL_KEY_VALIDATOR")]
    pub key_validator: Option<String>,

    /// Type of column names
    #[arg(long, value_name = "TYPE", env = "CQL_COMPARATOR")]
    pub comparator: Option<String>,

    /// Type of column values
    #[arg(long, value_name = "TYPE", env = "CQL_DEFAULT_VALIDATOR")]
    pub default_validator: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Resolves the settings for this run.
    ///
    /// Flags (or their environment variables) take precedence over the
    /// config file, which takes precedence over defaults.
    pub fn to_settings(&self, config: &Config) -> ExecSettings {
        let mut settings = ExecSettings::from_config(config);

        if let Some(address) = &self.rpc_address {
            settings.rpc_address = address.clone();
        }
        if let Some(port) = self.rpc_port {
            settings.rpc_port = port;
        }
        if self.keyspace.is_some() {
            settings.keyspace = self.keyspace.clone();
        }
        if self.statement.is_some() {
            settings.statement = self.statement.clone();
        }
        if self.script.is_some() {
            settings.script = self.script.clone();
        }
        if self.skip {
            settings.skip = true;
        }
        if self.skip_if_keyspace_is_present.is_some() {
            settings.skip_if_keyspace_is_present = self.skip_if_keyspace_is_present.clone();
        }
        if let Some(key_validator) = &self.key_validator {
            settings.types.key_validator = key_validator.clone();
        }
        if let Some(comparator) = &self.comparator {
            settings.types.comparator = comparator.clone();
        }
        if let Some(default_validator) = &self.default_validator {
            settings.types.default_validator = default_validator.clone();
        }

        settings
    }
}
