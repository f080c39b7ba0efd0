//! Error types for the pricehound host.

use price_search::SearchError;

/// Top-level error type for the pricehound CLI and library.
#[derive(Debug, thiserror::Error)]
pub enum HoundError {
    /// Configuration file missing, malformed or inconsistent.
    #[error("config error: {0}")]
    Config(String),

    /// A search was rejected before it started.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, HoundError>;
