//! Ingestion error types

use contracts::ContractError;
use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Malformed replay line
    #[error("failed to parse line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// Parser message
        message: String,
    },

    /// Mock source frequency that cannot be turned into a tick period
    #[error("source {name} needs a finite frequency above 0 Hz, got {frequency_hz}")]
    InvalidFrequency {
        /// Source name
        name: String,
        frequency_hz: f64,
    },

    /// Reading input failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected by the datapoint sink
    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
