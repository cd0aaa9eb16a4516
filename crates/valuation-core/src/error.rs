//! Error types for data operations.
//!
//! This module defines [`DataError`] which covers all error cases that can occur
//! when fetching statements and prices or persisting generated datasets.

use thiserror::Error;

/// Errors that can occur during data operations.
#[derive(Error, Debug)]
pub enum DataError {
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

    /// Data is not available for the requested symbol and date range.
    #[error("Data not available for {symbol} in range {start} to {end}")]
    DataNotAvailable {
        /// The symbol that was requested.
        symbol: String,
        /// Start of the requested date range.
        start: String,
        /// End of the requested date range.
        end: String,
    },

    /// Error parsing data from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error writing to or resetting an output destination.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The requested feature is not supported.
    #[error("Feature not supported: {0}")]
    NotSupported(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl DataError {
    /// Returns true if the provider had nothing for the symbol, as opposed to
    /// failing to answer.
    #[must_use]
    pub const fn is_missing_data(&self) -> bool {
        matches!(self, Self::SymbolNotFound(_) | Self::DataNotAvailable { .. })
    }
}

impl From<std::io::Error> for DataError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_classification() {
        assert!(DataError::SymbolNotFound("ZZZZ".to_string()).is_missing_data());
        assert!(
            DataError::DataNotAvailable {
                symbol: "AAPL".to_string(),
                start: "2024-01-01".to_string(),
                end: "2024-01-04".to_string(),
            }
            .is_missing_data()
        );
        assert!(!DataError::Network("timeout".to_string()).is_missing_data());
    }

    #[test]
    fn test_io_error_is_storage() {
        let err: DataError = std::io::Error::other("disk full").into();
        assert!(matches!(err, DataError::Storage(_)));
    }
}
