//! Error types for the price-search crate.
//!
//! Messages are stable, lower-case strings suitable for display to users
//! and for logging. Adapter failures never escape [`crate::search`]; only
//! caller misuse (`InvalidQuery`, `Config`) is returned as a hard error.

/// Errors that can occur while searching product catalogs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The query was empty or too short to search for.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Invalid search options.
    #[error("config error: {0}")]
    Config(String),

    /// An HTTP request to a catalog failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse a catalog response.
    #[error("parse error: {0}")]
    Parse(String),

    /// A catalog did not answer before its deadline.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The search was cancelled while the catalog was being queried.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// An adapter produced a listing that breaks the listing invariants.
    #[error("invalid listing: {0}")]
    InvalidListing(String),
}

impl SearchError {
    /// Returns `true` for errors caused by the deadline or cancellation
    /// rather than by the catalog itself.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Cancelled(_))
    }
}

/// Convenience type alias for price-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
