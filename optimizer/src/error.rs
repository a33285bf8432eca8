//! Error types for the optimization engine

use thiserror::Error;

/// Errors that can occur while estimating statistics or optimizing a portfolio
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizerError {
    /// Malformed prices, weights or request parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Aligned price history is shorter than the configured floor
    #[error("Insufficient history for {ticker}: {observations} observations, need at least {required}")]
    InsufficientHistory {
        /// Asset with the shortest history
        ticker: String,
        /// Aligned return observations available
        observations: usize,
        /// Configured minimum
        required: usize,
    },

    /// No long-only portfolio reaches the requested return
    #[error("Target return {target:.6} is infeasible for a long-only portfolio")]
    InfeasibleTarget {
        /// Requested annualized return
        target: f64,
    },

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl OptimizerError {
    /// Check if the error only affects a single frontier point
    pub fn is_recoverable(&self) -> bool {
        matches!(self, OptimizerError::InfeasibleTarget { .. })
    }
}

pub type Result<T> = std::result::Result<T, OptimizerError>;
