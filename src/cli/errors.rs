//! CLI-specific error types
//!
//! Every CLI error is operational (exit code 1). An invalid batch is not an
//! error; it is reported on stdout with exit code 2.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::schema::SchemaError;
use crate::validation::BatchError;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    Batch(#[from] BatchError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "BATCH_CLI_CONFIG_ERROR",
            CliError::Schema(e) => e.code().code(),
            CliError::Batch(_) => "BATCH_CLI_INPUT_ERROR",
            CliError::Io(_) => "BATCH_CLI_IO_ERROR",
            CliError::Json(_) => "BATCH_CLI_IO_ERROR",
            CliError::Usage(_) => "BATCH_CLI_USAGE_ERROR",
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
