//! Error types for the arbitration core

use thiserror::Error;

/// Result type alias for arbitration operations
pub type ArbiterResult<T> = Result<T, ArbiterError>;

/// Errors that can occur while constructing or configuring the arbitration core.
///
/// Decisions themselves never fail: every input text maps to a decision.
/// Errors only exist at the configuration boundary.
#[derive(Error, Debug)]
pub enum ArbiterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
