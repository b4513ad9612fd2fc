//! CLI error types

use tango_engine::{EngineError, EvaluationError};
use tango_types::SchemaValidationError;
use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// A file named on the command line could not be read
    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema rejected on validation
    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaValidationError),

    /// Engine operation failed
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Hyper value evaluation failed
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
