//! Optimizer configuration
//!
//! All fields carry serde defaults so partial YAML/JSON documents are accepted.

use serde::{Deserialize, Serialize};

use crate::error::{OptimizerError, Result};

/// How the efficient frontier is derived from a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FrontierMethod {
    /// Non-dominated filter over the Monte Carlo samples
    #[default]
    SampleFilter,

    /// Minimum-variance solve at a sweep of target returns (approximate)
    TargetSweep,
}

/// Optimization engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Trading days per year used for annualization
    #[serde(default = "default_trading_days")]
    pub trading_days: f64,

    /// Maximum number of assets in one run
    #[serde(default = "default_max_assets")]
    pub max_assets: usize,

    /// Minimum aligned return observations per asset
    #[serde(default = "default_min_observations")]
    pub min_observations: usize,

    /// Default number of Monte Carlo portfolios
    #[serde(default = "default_simulations")]
    pub simulations: usize,

    /// Default number of frontier points reported
    #[serde(default = "default_frontier_points")]
    pub frontier_points: usize,

    /// Seed of the per-run random generator
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Frontier extraction method
    #[serde(default)]
    pub frontier_method: FrontierMethod,

    /// Settings of the target-return sweep
    #[serde(default)]
    pub sweep: SweepConfig,
}

/// Projected gradient descent settings for minimum-variance solves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Outer gradient iterations per target
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Initial gradient step size
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Learning rate halves every this many iterations
    #[serde(default = "default_decay_every")]
    pub decay_every: usize,

    /// Constraint correction passes after each gradient step
    #[serde(default = "default_correction_passes")]
    pub correction_passes: usize,

    /// Largest accepted gap between achieved and target return
    #[serde(default = "default_target_tolerance")]
    pub target_tolerance: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            trading_days: default_trading_days(),
            max_assets: default_max_assets(),
            min_observations: default_min_observations(),
            simulations: default_simulations(),
            frontier_points: default_frontier_points(),
            seed: default_seed(),
            frontier_method: FrontierMethod::default(),
            sweep: SweepConfig::default(),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            learning_rate: default_learning_rate(),
            decay_every: default_decay_every(),
            correction_passes: default_correction_passes(),
            target_tolerance: default_target_tolerance(),
        }
    }
}

impl OptimizerConfig {
    /// Parse a configuration from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| OptimizerError::Config(format!("Failed to parse YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| OptimizerError::Config(format!("Failed to parse JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every parameter is usable
    pub fn validate(&self) -> Result<()> {
        if !(self.trading_days.is_finite() && self.trading_days > 0.0) {
            return Err(OptimizerError::InvalidInput(format!(
                "trading_days must be positive, got {}",
                self.trading_days
            )));
        }
        if self.max_assets < 2 {
            return Err(OptimizerError::InvalidInput(
                "max_assets must be at least 2".to_string(),
            ));
        }
        if self.min_observations < 2 {
            return Err(OptimizerError::InvalidInput(
                "min_observations must be at least 2".to_string(),
            ));
        }
        if self.simulations == 0 {
            return Err(OptimizerError::InvalidInput(
                "simulations must be positive".to_string(),
            ));
        }
        if self.frontier_points < 2 {
            return Err(OptimizerError::InvalidInput(
                "frontier_points must be at least 2".to_string(),
            ));
        }
        self.sweep.validate()
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(OptimizerError::InvalidInput(format!(
                "sweep.learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.iterations == 0 || self.decay_every == 0 || self.correction_passes == 0 {
            return Err(OptimizerError::InvalidInput(
                "sweep iterations, decay_every and correction_passes must be positive".to_string(),
            ));
        }
        if !(self.target_tolerance > 0.0) {
            return Err(OptimizerError::InvalidInput(
                "sweep.target_tolerance must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// Default value functions
fn default_trading_days() -> f64 {
    252.0
}

fn default_max_assets() -> usize {
    20
}

fn default_min_observations() -> usize {
    2
}

fn default_simulations() -> usize {
    10_000
}

fn default_frontier_points() -> usize {
    60
}

fn default_seed() -> u64 {
    42
}

fn default_iterations() -> usize {
    1000
}

fn default_learning_rate() -> f64 {
    0.5
}

fn default_decay_every() -> usize {
    200
}

fn default_correction_passes() -> usize {
    10
}

fn default_target_tolerance() -> f64 {
    1e-3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = OptimizerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.trading_days, 252.0);
        assert_eq!(config.simulations, 10_000);
        assert_eq!(config.frontier_points, 60);
        assert_eq!(config.frontier_method, FrontierMethod::SampleFilter);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
simulations: 2000
frontier_method: target_sweep
sweep:
  iterations: 300
"#;
        let config = OptimizerConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.simulations, 2000);
        assert_eq!(config.frontier_method, FrontierMethod::TargetSweep);
        assert_eq!(config.sweep.iterations, 300);
        assert_eq!(config.sweep.decay_every, 200);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_json_config() {
        let json = r#"{ "seed": 7, "max_assets": 5 }"#;
        let config = OptimizerConfig::from_json(json).unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.max_assets, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(OptimizerConfig::from_yaml("simulations: 0").is_err());
        assert!(OptimizerConfig::from_yaml("frontier_points: 1").is_err());
        assert!(OptimizerConfig::from_yaml("trading_days: -1.0").is_err());
        assert!(OptimizerConfig::from_yaml("sweep:\n  learning_rate: 0.0").is_err());
    }

    #[test]
    fn test_malformed_document() {
        let err = OptimizerConfig::from_yaml("simulations: [1, 2").unwrap_err();
        assert!(matches!(err, OptimizerError::Config(_)));
    }
}
