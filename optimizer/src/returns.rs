//! Price histories and log-return series

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{OptimizerError, Result};

/// Daily close prices for one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Asset ticker (e.g., "SPY")
    pub ticker: String,

    /// Close prices, oldest first
    pub closes: Vec<f64>,

    /// Observation dates, if known. Only used for diagnostics.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<DateTime<Utc>>,
}

impl PriceSeries {
    /// Create a price series without dates
    pub fn new(ticker: impl Into<String>, closes: Vec<f64>) -> Self {
        Self {
            ticker: ticker.into(),
            closes,
            dates: Vec::new(),
        }
    }

    /// Attach observation dates
    pub fn with_dates(mut self, dates: Vec<DateTime<Utc>>) -> Self {
        self.dates = dates;
        self
    }

    /// Number of close prices
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// First and last date covered, when dates are present
    pub fn date_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((*self.dates.first()?, *self.dates.last()?))
    }

    /// Build the log-return series of this asset
    pub fn returns(&self) -> Result<ReturnSeries> {
        ReturnSeries::from_prices(&self.closes).map_err(|e| match e {
            OptimizerError::InvalidInput(msg) => {
                OptimizerError::InvalidInput(format!("{}: {}", self.ticker, msg))
            }
            other => other,
        })
    }
}

/// Daily log-returns, `r[i] = ln(p[i+1] / p[i])`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries(Vec<f64>);

impl ReturnSeries {
    /// Convert a price sequence into log-returns
    ///
    /// Requires at least two prices, all finite and strictly positive.
    pub fn from_prices(prices: &[f64]) -> Result<Self> {
        if prices.len() < 2 {
            return Err(OptimizerError::InvalidInput(format!(
                "need at least 2 prices, got {}",
                prices.len()
            )));
        }

        if let Some((idx, price)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(OptimizerError::InvalidInput(format!(
                "price at index {} must be positive, got {}",
                idx, price
            )));
        }

        let returns = prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
        Ok(Self(returns))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// The most recent `n` observations (all of them if `n` exceeds the length)
    pub fn tail(&self, n: usize) -> &[f64] {
        &self.0[self.0.len().saturating_sub(n)..]
    }

    /// Rebuild the price path by cumulative exponentiation from the first price
    pub fn to_prices(&self, first_price: f64) -> Vec<f64> {
        let mut prices = Vec::with_capacity(self.0.len() + 1);
        prices.push(first_price);

        let mut price = first_price;
        for r in &self.0 {
            price *= r.exp();
            prices.push(price);
        }

        prices
    }
}
