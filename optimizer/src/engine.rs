//! Optimization engine
//!
//! The FrontierEngine turns price histories into an optimization report:
//! statistics, Monte Carlo cloud, efficient frontier and the extreme
//! portfolios. It holds only configuration, so a single engine can serve
//! concurrent requests.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use crate::config::{FrontierMethod, OptimizerConfig};
use crate::error::{OptimizerError, Result};
use crate::frontier::{self, FrontierPoint};
use crate::projection;
use crate::returns::PriceSeries;
use crate::sampler::MonteCarloSampler;
use crate::scorer::{self, SimulatedPortfolio};
use crate::stats::{AssetStats, CovarianceEstimator, MarketEstimate};

/// Inputs of one optimization run
///
/// Unset parameters fall back to the engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    /// Price histories, one per asset
    pub assets: Vec<PriceSeries>,

    /// Annual risk-free rate in [0, 1]
    pub risk_free_rate: f64,

    /// Number of Monte Carlo portfolios
    #[serde(default)]
    pub simulations: Option<usize>,

    /// Frontier point budget
    #[serde(default)]
    pub frontier_points: Option<usize>,
}

impl OptimizationRequest {
    /// Create a request with a zero risk-free rate
    pub fn new(assets: Vec<PriceSeries>) -> Self {
        Self {
            assets,
            risk_free_rate: 0.0,
            simulations: None,
            frontier_points: None,
        }
    }

    /// Set the annual risk-free rate
    pub fn with_risk_free_rate(mut self, risk_free_rate: f64) -> Self {
        self.risk_free_rate = risk_free_rate;
        self
    }

    /// Override the number of Monte Carlo portfolios
    pub fn with_simulations(mut self, simulations: usize) -> Self {
        self.simulations = Some(simulations);
        self
    }

    /// Override the frontier point budget
    pub fn with_frontier_points(mut self, frontier_points: usize) -> Self {
        self.frontier_points = Some(frontier_points);
        self
    }

    /// Run parameters without the price histories
    pub fn parameters(&self) -> RunParameters {
        RunParameters {
            risk_free_rate: self.risk_free_rate,
            simulations: self.simulations,
            frontier_points: self.frontier_points,
        }
    }
}

/// Parameters of one run over an existing estimate
///
/// Unset values fall back to the engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RunParameters {
    /// Annual risk-free rate in [0, 1]
    pub risk_free_rate: f64,

    /// Number of Monte Carlo portfolios
    #[serde(default)]
    pub simulations: Option<usize>,

    /// Frontier point budget
    #[serde(default)]
    pub frontier_points: Option<usize>,
}

impl RunParameters {
    pub fn new(risk_free_rate: f64) -> Self {
        Self {
            risk_free_rate,
            ..Default::default()
        }
    }

    /// Override the number of Monte Carlo portfolios
    pub fn with_simulations(mut self, simulations: usize) -> Self {
        self.simulations = Some(simulations);
        self
    }

    /// Override the frontier point budget
    pub fn with_frontier_points(mut self, frontier_points: usize) -> Self {
        self.frontier_points = Some(frontier_points);
        self
    }
}

/// Result of one optimization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    /// Tickers, in the order used by every vector below
    pub tickers: Vec<String>,

    /// Annualized statistics per asset
    pub asset_stats: Vec<AssetStats>,

    /// Annualized mean returns
    pub mean_returns: Vec<f64>,

    /// Annualized covariance matrix, row by row
    pub covariance: Vec<Vec<f64>>,

    /// All sampled portfolios
    pub monte_carlo_points: Vec<SimulatedPortfolio>,

    /// Efficient frontier, ascending risk
    pub frontier_points: Vec<FrontierPoint>,

    /// Best Sharpe ratio among the samples
    pub max_sharpe: SimulatedPortfolio,

    /// Lowest volatility among the samples
    pub min_variance: SimulatedPortfolio,

    /// Risk-free rate used for the Sharpe ratios
    pub risk_free_rate: f64,
}

/// Portfolio optimization engine
#[derive(Debug, Clone)]
pub struct FrontierEngine {
    config: OptimizerConfig,
    estimator: CovarianceEstimator,
}

impl FrontierEngine {
    /// Create an engine from a validated configuration
    pub fn new(config: OptimizerConfig) -> Result<Self> {
        config.validate()?;
        let estimator = CovarianceEstimator::new(&config);
        Ok(Self { config, estimator })
    }

    /// Load the engine configuration from a YAML string
    ///
    /// # Example
    ///
    /// ```
    /// use frontier_optimizer::FrontierEngine;
    ///
    /// let yaml = r#"
    /// simulations: 5000
    /// frontier_points: 40
    /// "#;
    ///
    /// let engine = FrontierEngine::from_yaml(yaml).unwrap();
    /// assert_eq!(engine.config().simulations, 5000);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::new(OptimizerConfig::from_yaml(yaml)?)
    }

    /// Load the engine configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(OptimizerConfig::from_json(json)?)
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Estimate annualized statistics for a basket of assets
    pub fn estimate(&self, assets: &[PriceSeries]) -> Result<MarketEstimate> {
        self.estimator.estimate(assets)
    }

    /// Run the full optimization on raw price histories
    pub fn optimize(&self, request: &OptimizationRequest) -> Result<OptimizationReport> {
        let estimate = self.estimate(&request.assets)?;
        self.optimize_estimate(&estimate, &request.parameters())
    }

    /// Run sampling and frontier extraction on an existing estimate
    pub fn optimize_estimate(
        &self,
        estimate: &MarketEstimate,
        params: &RunParameters,
    ) -> Result<OptimizationReport> {
        let risk_free_rate = params.risk_free_rate;
        Self::check_risk_free_rate(risk_free_rate)?;

        let simulations = params.simulations.unwrap_or(self.config.simulations);
        let frontier_points = params.frontier_points.unwrap_or(self.config.frontier_points);
        if frontier_points < 2 {
            return Err(OptimizerError::InvalidInput(format!(
                "frontier point budget must be at least 2, got {}",
                frontier_points
            )));
        }

        info!(
            assets = estimate.num_assets(),
            observations = estimate.observations,
            simulations,
            "Starting portfolio optimization"
        );
        let start = Instant::now();

        let cloud = MonteCarloSampler::new(simulations, self.config.seed).run(
            &estimate.mean_returns,
            &estimate.covariance,
            risk_free_rate,
        )?;

        let frontier_points = match self.config.frontier_method {
            FrontierMethod::SampleFilter => {
                frontier::efficient_frontier(&cloud.portfolios, frontier_points)
            }
            FrontierMethod::TargetSweep => projection::sweep_frontier(
                &estimate.mean_returns,
                &estimate.covariance,
                &cloud.min_variance,
                &cloud.max_sharpe,
                frontier_points,
                risk_free_rate,
                &self.config.sweep,
            ),
        };

        debug!(
            method = ?self.config.frontier_method,
            points = frontier_points.len(),
            "Extracted efficient frontier"
        );
        info!(
            max_sharpe = cloud.max_sharpe.sharpe,
            min_risk = cloud.min_variance.risk,
            elapsed = ?start.elapsed(),
            "Portfolio optimization complete"
        );

        Ok(OptimizationReport {
            tickers: estimate.tickers.clone(),
            asset_stats: estimate.asset_stats.clone(),
            mean_returns: estimate.mean_returns.iter().copied().collect(),
            covariance: estimate.covariance_rows(),
            monte_carlo_points: cloud.portfolios,
            frontier_points,
            max_sharpe: cloud.max_sharpe,
            min_variance: cloud.min_variance,
            risk_free_rate,
        })
    }

    /// Score an existing allocation against an estimate
    ///
    /// `weights` must be long-only, aligned with `estimate.tickers` and sum to one.
    pub fn score_allocation(
        &self,
        estimate: &MarketEstimate,
        weights: &[f64],
        risk_free_rate: f64,
    ) -> Result<SimulatedPortfolio> {
        Self::check_risk_free_rate(risk_free_rate)?;
        scorer::validate_weights(weights, estimate.num_assets())?;

        Ok(SimulatedPortfolio::scored(
            weights.to_vec(),
            &estimate.mean_returns,
            &estimate.covariance,
            risk_free_rate,
        ))
    }

    /// Approximate minimum-variance weights reaching `target` annual return
    pub fn min_variance_for_return(
        &self,
        estimate: &MarketEstimate,
        target: f64,
    ) -> Result<Vec<f64>> {
        let weights = projection::min_variance_for_return(
            &estimate.mean_returns,
            &estimate.covariance,
            target,
            &self.config.sweep,
        )?;
        Ok(weights.iter().copied().collect())
    }

    fn check_risk_free_rate(risk_free_rate: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&risk_free_rate) {
            return Err(OptimizerError::InvalidInput(format!(
                "risk-free rate must be between 0 and 1, got {}",
                risk_free_rate
            )));
        }
        Ok(())
    }
}
