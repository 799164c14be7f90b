//! Error types for screener operations.
//!
//! This module defines [`ScreenerError`] which covers every failure that can occur
//! while fetching, caching, scoring, or screening symbols.
//!
//! Missing metric values are never errors: they are modeled as absent data on
//! [`StockMetrics`](crate::StockMetrics) and flow through scoring as "unscored".

use thiserror::Error;

/// Errors that can occur during screener operations.
#[derive(Error, Debug)]
pub enum ScreenerError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The requested symbol was not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider knows the symbol but returned no usable data.
    #[error("No data available for {0}")]
    DataNotAvailable(String),

    /// Error parsing data from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error interacting with the cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// No provider is configured to serve the request.
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// The caller broke the request contract (empty symbol list, too many symbols, ...).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A configuration value could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl ScreenerError {
    /// Returns true if the error only concerns a single symbol.
    ///
    /// The batch screener omits such symbols from its report instead of failing.
    #[must_use]
    pub const fn is_symbol_scoped(&self) -> bool {
        matches!(self, Self::SymbolNotFound(_) | Self::DataNotAvailable(_))
    }
}

/// Result type alias using [`ScreenerError`].
pub type Result<T> = std::result::Result<T, ScreenerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_scoped() {
        assert!(ScreenerError::SymbolNotFound("ZZZZ".into()).is_symbol_scoped());
        assert!(ScreenerError::DataNotAvailable("ZZZZ".into()).is_symbol_scoped());
        assert!(!ScreenerError::Network("timeout".into()).is_symbol_scoped());
        assert!(!ScreenerError::InvalidRequest("empty".into()).is_symbol_scoped());
    }

    #[test]
    fn test_display() {
        let err = ScreenerError::RateLimited {
            provider: "Yahoo Finance".to_string(),
            retry_after: None,
        };
        assert_eq!(err.to_string(), "Rate limited by Yahoo Finance: retry after None");
    }
}
