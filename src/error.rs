//! Error types for the seesaw simulation
//!
//! Every precondition is checked once at a call boundary and surfaced here.

use thiserror::Error;

/// Result type alias using SimError
pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    // Out-of-domain scalar parameters (mass, delta_t, weight factor, limits)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Sequences that must be index-aligned but are not
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Requested control/visualization mode has no implementation
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sweep worker failure: {0}")]
    Worker(String),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SimError {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        SimError::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        SimError::InvalidInput(msg.into())
    }
}
