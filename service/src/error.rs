//! Error types for the analysis service

use thiserror::Error;

use frontier_optimizer::OptimizerError;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Analysis service error types
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request failed validation
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Fewer than two assets could be fetched
    #[error("Insufficient assets: {0}")]
    InsufficientAssets(String),

    /// Ticker is not known to the price provider
    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    /// Provider returned fewer prices than required
    #[error("Not enough price data for {ticker} (got {got} points, need at least {required})")]
    InsufficientHistory {
        /// Ticker symbol
        ticker: String,
        /// Valid prices received
        got: usize,
        /// Configured minimum
        required: usize,
    },

    /// Provider reported an error
    #[error("Provider error for {ticker}: {message}")]
    Provider {
        /// Ticker symbol
        ticker: String,
        /// Error message
        message: String,
        /// HTTP status code, if any
        status: Option<u16>,
    },

    /// Fetch did not complete in time
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Optimization failed
    #[error("Optimization error: {0}")]
    Optimizer(#[from] OptimizerError),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl ServiceError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::NetworkError(_)
            | ServiceError::Timeout(_)
            | ServiceError::HttpError(_) => true,
            ServiceError::Provider { status, .. } => matches!(status, Some(s) if *s >= 500),
            _ => false,
        }
    }

    /// Check if the caller's input caused the error
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::BadRequest(_)
                | ServiceError::InsufficientAssets(_)
                | ServiceError::UnknownTicker(_)
                | ServiceError::Optimizer(OptimizerError::InvalidInput(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_retryable() {
        assert!(ServiceError::Timeout("SPY".to_string()).is_retryable());
        assert!(ServiceError::NetworkError("reset".to_string()).is_retryable());

        let upstream = ServiceError::Provider {
            ticker: "SPY".to_string(),
            message: "bad gateway".to_string(),
            status: Some(502),
        };
        assert!(upstream.is_retryable());

        let not_found = ServiceError::Provider {
            ticker: "SPY".to_string(),
            message: "not found".to_string(),
            status: Some(404),
        };
        assert!(!not_found.is_retryable());

        assert!(!ServiceError::BadRequest("x".to_string()).is_retryable());
    }

    #[test]
    fn test_client_errors() {
        assert!(ServiceError::BadRequest("too few tickers".to_string()).is_client_error());
        assert!(ServiceError::UnknownTicker("ZZZZ".to_string()).is_client_error());
        assert!(!ServiceError::Timeout("SPY".to_string()).is_client_error());

        let err: ServiceError = OptimizerError::InvalidInput("weights".to_string()).into();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_history_message() {
        let err = ServiceError::InsufficientHistory {
            ticker: "NEW".to_string(),
            got: 12,
            required: 30,
        };
        assert_eq!(
            err.to_string(),
            "Not enough price data for NEW (got 12 points, need at least 30)"
        );
    }
}
