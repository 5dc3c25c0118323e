//! Error types for the distributed Bloom filter

use thiserror::Error;

/// Errors surfaced by filter construction and membership operations
#[derive(Debug, Error)]
pub enum FilterError {
    /// Raised at construction time only, never by `put`/`might_contain`.
    #[error("Invalid filter configuration: {0}")]
    InvalidConfiguration(String),

    /// The funnel could not turn the element into bytes; no store call was made.
    #[error("Failed to encode element: {0}")]
    EncodingError(String),

    #[error("Bit store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

/// Errors reported by a [`BitStore`](crate::ports::BitStore) implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Bit index out of range: {index} >= {max}")]
    IndexOutOfRange { index: u64, max: u64 },
}

impl FilterError {
    /// Whether the error came from the remote store rather than local validation
    pub fn is_store_error(&self) -> bool {
        matches!(self, FilterError::StoreUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_converts_verbatim() {
        let err: FilterError = StoreError::ConnectionError("refused".to_string()).into();

        assert!(err.is_store_error());
        assert_eq!(
            err.to_string(),
            "Bit store unavailable: Connection error: refused"
        );
    }

    #[test]
    fn test_configuration_error_is_not_store_error() {
        let err = FilterError::InvalidConfiguration("k must be >= 1".to_string());
        assert!(!err.is_store_error());
    }
}
