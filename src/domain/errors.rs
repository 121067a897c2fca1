//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Fatal at startup (e.g. no API keys configured).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Remote classifier failed for a reason other than rate limiting. Not retried.
    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Report store error: {0}")]
    Store(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Import failed: {0}")]
    Import(String),

    #[error("Export failed: {0}")]
    Export(String),
}
