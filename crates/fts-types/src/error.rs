//! Error types shared across the event-fts crates.

use thiserror::Error;

/// Unified error type for domain-level operations.
#[derive(Debug, Error)]
pub enum FtsError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
