//! Analysis request and response types

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use frontier_optimizer::{OptimizationReport, SimulatedPortfolio};

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};

/// Analysis request as received from a caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Ticker symbols, in any case
    pub tickers: Vec<String>,

    /// Years of history; missing or zero means the configured default
    #[serde(default)]
    pub years: Option<u32>,

    /// Annual risk-free rate; missing or outside [0, 1] means the configured default
    #[serde(default)]
    pub risk_free_rate: Option<f64>,

    /// Current holdings by ticker, in any unit
    #[serde(default)]
    pub current_portfolio: HashMap<String, f64>,
}

/// Request after normalization and validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    /// Upper-case, de-duplicated tickers in request order
    pub tickers: Vec<String>,

    pub years: u32,

    pub risk_free_rate: f64,

    /// Holdings keyed by upper-case ticker
    pub current_portfolio: HashMap<String, f64>,
}

impl AnalyzeRequest {
    /// Create a request for a set of tickers
    pub fn new<I, S>(tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tickers: tickers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set the history span in years
    pub fn with_years(mut self, years: u32) -> Self {
        self.years = Some(years);
        self
    }

    /// Set the annual risk-free rate
    pub fn with_risk_free_rate(mut self, risk_free_rate: f64) -> Self {
        self.risk_free_rate = Some(risk_free_rate);
        self
    }

    /// Add a current holding
    pub fn with_holding(mut self, ticker: impl Into<String>, amount: f64) -> Self {
        self.current_portfolio.insert(ticker.into(), amount);
        self
    }

    /// Normalize the request and check it against the service limits
    pub fn validate(&self, config: &ServiceConfig) -> ServiceResult<ValidatedRequest> {
        let mut seen = HashSet::new();
        let tickers: Vec<String> = self
            .tickers
            .iter()
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();

        if tickers.len() < 2 {
            return Err(ServiceError::BadRequest(
                "please provide at least 2 tickers to compute a frontier".to_string(),
            ));
        }
        if tickers.len() > config.max_tickers {
            return Err(ServiceError::BadRequest(format!(
                "maximum {} tickers allowed",
                config.max_tickers
            )));
        }

        let years = match self.years {
            None | Some(0) => config.default_years,
            Some(y) if y > config.max_years => {
                return Err(ServiceError::BadRequest(format!(
                    "maximum {} years of historical data allowed",
                    config.max_years
                )));
            }
            Some(y) => y,
        };

        let risk_free_rate = self
            .risk_free_rate
            .filter(|r| (0.0..=1.0).contains(r))
            .unwrap_or(config.default_risk_free_rate);

        let current_portfolio = self
            .current_portfolio
            .iter()
            .map(|(t, w)| (t.trim().to_uppercase(), *w))
            .collect();

        Ok(ValidatedRequest {
            tickers,
            years,
            risk_free_rate,
            current_portfolio,
        })
    }
}

/// Analysis result returned to the caller
///
/// Serializes as the optimization report with the extra fields alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub report: OptimizationReport,

    /// Score of the caller's current holdings, when supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_portfolio_stats: Option<SimulatedPortfolio>,

    /// Non-fatal data quality notes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Tickers that could not be fetched, when any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
