//! Runtime settings. Only environment variables are consulted: the bridge
//! ignores its command-line arguments apart from a leading `--help`.

use clap::{Parser, ValueEnum};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "mcp-bridge", disable_help_flag = true, disable_version_flag = true)]
pub struct Config {
    /// Tracing filter directive, e.g. `mcp_bridge=debug`
    #[arg(long, env = "MCP_BRIDGE_LOG", default_value = "warn")]
    pub log_filter: String,

    /// Log line format written to stderr
    #[arg(long, env = "MCP_BRIDGE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[derive(Debug, Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(#[from] clap::Error);

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::try_parse_from(["mcp-bridge"])?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "warn".to_string(),
            log_format: LogFormat::Compact,
        }
    }
}
