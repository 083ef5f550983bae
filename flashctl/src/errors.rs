//! Errors surfaced by flashctl commands

use flashgen_core::errors::{ConfigError, GatewayError, GenerationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read {path}: {source}")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Generator setup failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Output error: {0}")]
    Output(String),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Output(format!("Failed to serialize to JSON: {}", err))
    }
}
