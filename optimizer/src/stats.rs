//! Annualized asset statistics and covariance estimation
//!
//! Return series of different lengths are aligned by keeping only the most
//! recent `minLen` observations of every asset, where `minLen` is the length
//! of the shortest series. Means, variances and covariances use the sample
//! (N-1) estimator and are annualized with the configured trading-day count.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::config::OptimizerConfig;
use crate::error::{OptimizerError, Result};
use crate::returns::{PriceSeries, ReturnSeries};

/// Annualized statistics of a single asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetStats {
    /// Asset ticker
    pub ticker: String,

    /// Annualized mean log-return
    pub annual_return: f64,

    /// Annualized volatility
    pub annual_volatility: f64,
}

/// Estimated market parameters for one optimization run
///
/// Every vector and matrix is index-aligned with `tickers`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketEstimate {
    /// Asset tickers in input order
    pub tickers: Vec<String>,

    /// Per-asset annualized statistics
    pub asset_stats: Vec<AssetStats>,

    /// Annualized mean returns
    pub mean_returns: DVector<f64>,

    /// Annualized covariance matrix
    pub covariance: DMatrix<f64>,

    /// Aligned daily observations per asset
    pub observations: usize,
}

impl MarketEstimate {
    /// Build an estimate directly from annualized parameters
    pub fn from_parameters(
        tickers: Vec<String>,
        mean_returns: DVector<f64>,
        covariance: DMatrix<f64>,
    ) -> Result<Self> {
        let n = tickers.len();
        if mean_returns.len() != n || covariance.nrows() != n || covariance.ncols() != n {
            return Err(OptimizerError::InvalidInput(format!(
                "{} tickers but {} mean returns and a {}x{} covariance matrix",
                n,
                mean_returns.len(),
                covariance.nrows(),
                covariance.ncols()
            )));
        }

        let asset_stats = tickers
            .iter()
            .enumerate()
            .map(|(i, ticker)| AssetStats {
                ticker: ticker.clone(),
                annual_return: mean_returns[i],
                annual_volatility: covariance[(i, i)].max(0.0).sqrt(),
            })
            .collect();

        Ok(Self {
            tickers,
            asset_stats,
            mean_returns,
            covariance,
            observations: 0,
        })
    }

    /// Number of assets
    pub fn num_assets(&self) -> usize {
        self.tickers.len()
    }

    /// Covariance matrix as nested rows
    pub fn covariance_rows(&self) -> Vec<Vec<f64>> {
        self.covariance
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }
}

/// Estimates return statistics and covariance from price histories
#[derive(Debug, Clone)]
pub struct CovarianceEstimator {
    trading_days: f64,
    min_observations: usize,
    max_assets: usize,
}

impl CovarianceEstimator {
    /// Create an estimator from the optimizer configuration
    pub fn new(config: &OptimizerConfig) -> Self {
        Self {
            trading_days: config.trading_days,
            min_observations: config.min_observations,
            max_assets: config.max_assets,
        }
    }

    /// Estimate annualized means and covariance for a basket of assets
    pub fn estimate(&self, assets: &[PriceSeries]) -> Result<MarketEstimate> {
        if assets.len() < 2 || assets.len() > self.max_assets {
            return Err(OptimizerError::InvalidInput(format!(
                "need between 2 and {} assets, got {}",
                self.max_assets,
                assets.len()
            )));
        }

        let series = assets
            .iter()
            .map(PriceSeries::returns)
            .collect::<Result<Vec<ReturnSeries>>>()?;

        // Shortest history decides the common window
        let (shortest, min_len) = series
            .iter()
            .enumerate()
            .map(|(i, s)| (i, s.len()))
            .min_by_key(|&(_, len)| len)
            .ok_or_else(|| OptimizerError::InvalidInput("no assets provided".to_string()))?;

        if min_len < self.min_observations {
            return Err(OptimizerError::InsufficientHistory {
                ticker: assets[shortest].ticker.clone(),
                observations: min_len,
                required: self.min_observations,
            });
        }

        debug!(
            assets = assets.len(),
            observations = min_len,
            "Aligned return series to common window"
        );

        let aligned: Vec<&[f64]> = series.iter().map(|s| s.tail(min_len)).collect();
        let n = aligned.len();

        let daily_means: Vec<f64> = aligned.iter().map(|r| r.mean()).collect();
        let mean_returns = DVector::from_iterator(
            n,
            daily_means.iter().map(|m| m * self.trading_days),
        );

        // Upper triangle, mirrored to keep the matrix exactly symmetric
        let mut covariance = DMatrix::zeros(n, n);
        for i in 0..n {
            for j in i..n {
                let daily = if i == j {
                    aligned[i].variance()
                } else {
                    aligned[i].covariance(aligned[j])
                };
                let cov = daily * self.trading_days;

                covariance[(i, j)] = cov;
                covariance[(j, i)] = cov;
            }
        }

        let asset_stats = assets
            .iter()
            .enumerate()
            .map(|(i, asset)| AssetStats {
                ticker: asset.ticker.clone(),
                annual_return: mean_returns[i],
                annual_volatility: covariance[(i, i)].sqrt(),
            })
            .collect();

        Ok(MarketEstimate {
            tickers: assets.iter().map(|a| a.ticker.clone()).collect(),
            asset_stats,
            mean_returns,
            covariance,
            observations: min_len,
        })
    }
}
