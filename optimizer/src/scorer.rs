//! Portfolio scoring
//!
//! Computes annualized return, volatility and Sharpe ratio of a weight vector:
//! - Return: μ_p = wᵀμ
//! - Volatility: σ_p = √(wᵀΣw)
//! - Sharpe: (μ_p - r_f) / σ_p, or 0 when σ_p is zero

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{OptimizerError, Result};

/// Tolerance used when checking that weights sum to one
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// A scored portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedPortfolio {
    /// Asset weights, index-aligned with the run's tickers
    pub weights: Vec<f64>,

    /// Annualized expected return
    #[serde(rename = "return")]
    pub expected_return: f64,

    /// Annualized volatility
    pub risk: f64,

    /// Sharpe ratio against the run's risk-free rate
    pub sharpe: f64,
}

/// Return, risk and Sharpe ratio of a weight vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioScore {
    pub expected_return: f64,
    pub risk: f64,
    pub sharpe: f64,
}

/// Score a weight vector against annualized means and covariance
///
/// Rounding can push the quadratic form of a (near) riskless portfolio
/// slightly below zero; such variances are treated as zero.
pub fn score(
    weights: &DVector<f64>,
    mean_returns: &DVector<f64>,
    covariance: &DMatrix<f64>,
    risk_free_rate: f64,
) -> PortfolioScore {
    let expected_return = weights.dot(mean_returns);

    // Full quadratic form wᵀΣw
    let variance = weights.dot(&(covariance * weights));
    let risk = variance.max(0.0).sqrt();

    let sharpe = if risk > 0.0 {
        (expected_return - risk_free_rate) / risk
    } else {
        0.0
    };

    PortfolioScore {
        expected_return,
        risk,
        sharpe,
    }
}

impl SimulatedPortfolio {
    /// Score `weights` and keep them alongside the result
    pub fn scored(
        weights: Vec<f64>,
        mean_returns: &DVector<f64>,
        covariance: &DMatrix<f64>,
        risk_free_rate: f64,
    ) -> Self {
        let w = DVector::from_column_slice(&weights);
        let s = score(&w, mean_returns, covariance, risk_free_rate);

        Self {
            weights,
            expected_return: s.expected_return,
            risk: s.risk,
            sharpe: s.sharpe,
        }
    }
}

/// Check that `weights` is a long-only allocation over `num_assets` assets
pub fn validate_weights(weights: &[f64], num_assets: usize) -> Result<()> {
    if weights.len() != num_assets {
        return Err(OptimizerError::InvalidInput(format!(
            "expected {} weights, got {}",
            num_assets,
            weights.len()
        )));
    }

    if let Some((idx, w)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        return Err(OptimizerError::InvalidInput(format!(
            "weight at index {} must be non-negative, got {}",
            idx, w
        )));
    }

    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(OptimizerError::InvalidInput(format!(
            "weights must sum to 1, got {}",
            sum
        )));
    }

    Ok(())
}

/// Turn raw non-negative holdings into weights that sum to one
pub fn normalize_allocation(holdings: &[f64]) -> Result<Vec<f64>> {
    if holdings.iter().any(|h| !h.is_finite() || *h < 0.0) {
        return Err(OptimizerError::InvalidInput(
            "holdings must be finite and non-negative".to_string(),
        ));
    }

    let total: f64 = holdings.iter().sum();
    if total <= 0.0 {
        return Err(OptimizerError::InvalidInput(
            "holdings must have a positive total".to_string(),
        ));
    }

    Ok(holdings.iter().map(|h| h / total).collect())
}
