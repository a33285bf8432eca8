//! # frontier-optimizer: Mean-Variance Portfolio Optimization
//!
//! This library estimates the efficient frontier of a basket of assets from
//! their daily close prices, under Modern Portfolio Theory with long-only,
//! fully-invested portfolios.
//!
//! ## Core Components
//!
//! - **ReturnSeries**: Log-returns of a price history
//! - **CovarianceEstimator**: Annualized mean returns and covariance matrix
//! - **Scorer**: Return, volatility and Sharpe ratio of a weight vector
//! - **MonteCarloSampler**: Seeded, uniform sampling of the long-only simplex
//! - **Frontier extraction**: Non-dominated filter over the samples, or an
//!   approximate minimum-variance sweep over target returns
//! - **FrontierEngine**: Runs all of the above from one configuration
//!
//! ## Example Usage
//!
//! ```rust
//! use frontier_optimizer::{FrontierEngine, OptimizationRequest, OptimizerConfig, PriceSeries};
//!
//! let engine = FrontierEngine::new(OptimizerConfig::default()).unwrap();
//!
//! let request = OptimizationRequest::new(vec![
//!     PriceSeries::new("AAA", vec![100.0, 101.0, 100.5, 102.0, 103.0, 102.5]),
//!     PriceSeries::new("BBB", vec![50.0, 50.2, 50.9, 50.4, 51.3, 51.8]),
//! ])
//! .with_risk_free_rate(0.03)
//! .with_simulations(1000);
//!
//! let report = engine.optimize(&request).unwrap();
//! assert_eq!(report.monte_carlo_points.len(), 1000);
//! assert!(report.max_sharpe.sharpe >= report.min_variance.sharpe);
//! ```

mod config;
mod engine;
mod error;
pub mod frontier;
pub mod projection;
mod returns;
pub mod sampler;
pub mod scorer;
mod stats;

pub use config::{FrontierMethod, OptimizerConfig, SweepConfig};
pub use engine::{FrontierEngine, OptimizationReport, OptimizationRequest, RunParameters};
pub use error::{OptimizerError, Result};
pub use frontier::FrontierPoint;
pub use returns::{PriceSeries, ReturnSeries};
pub use sampler::{MonteCarloSampler, SampleCloud};
pub use scorer::{PortfolioScore, SimulatedPortfolio};
pub use stats::{AssetStats, CovarianceEstimator, MarketEstimate};
