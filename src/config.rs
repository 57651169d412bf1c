//! Configuration management for cql-exec.
//!
//! Handles loading configuration from TOML files and resolving the flat
//! settings a single run works from.

use crate::error::{CqlExecError, Result};
use crate::rpc::DEFAULT_RPC_PORT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-local config file, preferred over the per-user one when present.
pub const LOCAL_CONFIG_FILE: &str = "cql-exec.toml";

/// Script read when none is configured.
pub const DEFAULT_SCRIPT_PATH: &str = "src/cassandra/cql/exec.cql";

/// Type used for keys, column names and values when none is configured.
pub const DEFAULT_TYPE: &str = "BytesType";

/// Main configuration structure, as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Where to connect.
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// What to run.
    #[serde(default)]
    pub exec: ExecConfig,

    /// How to render results.
    #[serde(default)]
    pub types: TypeSettings,
}

/// Node connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConnectionConfig {
    /// Node address.
    pub rpc_address: Option<String>,

    /// Legacy RPC port.
    pub rpc_port: Option<u16>,

    /// Keyspace selected before each statement.
    pub keyspace: Option<String>,
}

/// Statement source and skip settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExecConfig {
    /// Skip the run entirely.
    pub skip: Option<bool>,

    /// Skip the run if this keyspace already exists.
    pub skip_if_keyspace_is_present: Option<String>,

    /// Script file; its contents replace `statement` when it exists.
    pub script: Option<PathBuf>,

    /// Inline statement(s).
    pub statement: Option<String>,
}

/// Type names for the three parts of a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSettings {
    /// Type of row keys.
    #[serde(default = "default_type")]
    pub key_validator: String,

    /// Type of column names.
    #[serde(default = "default_type")]
    pub comparator: String,

    /// Type of column values.
    #[serde(default = "default_type")]
    pub default_validator: String,
}

fn default_type() -> String {
    DEFAULT_TYPE.to_string()
}

impl Default for TypeSettings {
    fn default() -> Self {
        Self {
            key_validator: default_type(),
            comparator: default_type(),
            default_validator: default_type(),
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecSettings {
    pub rpc_address: String,
    pub rpc_port: u16,
    pub keyspace: Option<String>,
    pub skip: bool,
    pub skip_if_keyspace_is_present: Option<String>,
    pub script: Option<PathBuf>,
    pub statement: Option<String>,
    pub types: TypeSettings,
}

impl Default for ExecSettings {
    fn default() -> Self {
        Self {
            rpc_address: "localhost".to_string(),
            rpc_port: DEFAULT_RPC_PORT,
            keyspace: None,
            skip: false,
            skip_if_keyspace_is_present: None,
            script: Some(PathBuf::from(DEFAULT_SCRIPT_PATH)),
            statement: None,
            types: TypeSettings::default(),
        }
    }
}

impl ExecSettings {
    /// Builds settings from a config file, falling back to defaults.
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        Self {
            rpc_address: config
                .connection
                .rpc_address
                .clone()
                .unwrap_or(defaults.rpc_address),
            rpc_port: config.connection.rpc_port.unwrap_or(defaults.rpc_port),
            keyspace: config.connection.keyspace.clone(),
            skip: config.exec.skip.unwrap_or(defaults.skip),
            skip_if_keyspace_is_present: config.exec.skip_if_keyspace_is_present.clone(),
            script: config.exec.script.clone().or(defaults.script),
            statement: config.exec.statement.clone(),
            types: config.types.clone(),
        }
    }

    /// Keyspace to select before each statement, if set and not blank.
    pub fn keyspace(&self) -> Option<&str> {
        non_blank(self.keyspace.as_deref())
    }

    /// Keyspace whose presence skips the run, if set and not blank.
    pub fn skip_if_keyspace_is_present(&self) -> Option<&str> {
        non_blank(self.skip_if_keyspace_is_present.as_deref())
    }

    /// Returns `address:port` for display.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.rpc_address, self.rpc_port)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Returns the config file path to use when none is given.
    ///
    /// `./cql-exec.toml` wins when it exists; otherwise the per-user file in
    /// the platform config directory.
    pub fn default_path() -> PathBuf {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return local;
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cql-exec")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CqlExecError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            CqlExecError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }
}
