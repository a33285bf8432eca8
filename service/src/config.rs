//! Service configuration
//!
//! Loaded from YAML/JSON, or from `FRONTIER_*` environment variables (a `.env`
//! file is read first when present).

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use frontier_optimizer::OptimizerConfig;

use crate::error::{ServiceError, ServiceResult};

/// Analysis service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the chart API; the ticker is appended as a path segment
    #[serde(default = "default_chart_endpoint")]
    pub chart_endpoint: String,

    /// Per-ticker fetch timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// User-Agent header sent to the provider
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Minimum valid closes per ticker
    #[serde(default = "default_min_prices")]
    pub min_prices: usize,

    /// Years of history when the request does not say
    #[serde(default = "default_years")]
    pub default_years: u32,

    /// Largest history a request may ask for
    #[serde(default = "default_max_years")]
    pub max_years: u32,

    /// Largest number of distinct tickers per request
    #[serde(default = "default_max_tickers")]
    pub max_tickers: usize,

    /// Risk-free rate when the request omits a valid one
    #[serde(default = "default_risk_free_rate")]
    pub default_risk_free_rate: f64,

    /// Fraction of the requested span below which data is flagged as partial
    #[serde(default = "default_partial_data_tolerance")]
    pub partial_data_tolerance: f64,

    /// Optimization engine settings
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            chart_endpoint: default_chart_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
            min_prices: default_min_prices(),
            default_years: default_years(),
            max_years: default_max_years(),
            max_tickers: default_max_tickers(),
            default_risk_free_rate: default_risk_free_rate(),
            partial_data_tolerance: default_partial_data_tolerance(),
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Parse configuration from YAML
    pub fn from_yaml(yaml: &str) -> ServiceResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from JSON
    pub fn from_json(json: &str) -> ServiceResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from defaults overridden by environment variables
    ///
    /// Recognized variables: `FRONTIER_CHART_ENDPOINT`, `FRONTIER_TIMEOUT_SECS`,
    /// `FRONTIER_USER_AGENT`, `FRONTIER_MIN_PRICES`, `FRONTIER_DEFAULT_YEARS`,
    /// `FRONTIER_MAX_TICKERS`, `FRONTIER_RISK_FREE_RATE`, `FRONTIER_SIMULATIONS`,
    /// `FRONTIER_SEED`.
    pub fn from_env() -> ServiceResult<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::default();
        if let Ok(endpoint) = env::var("FRONTIER_CHART_ENDPOINT") {
            config.chart_endpoint = endpoint;
        }
        if let Ok(agent) = env::var("FRONTIER_USER_AGENT") {
            config.user_agent = agent;
        }
        override_from_env(&mut config.request_timeout_secs, "FRONTIER_TIMEOUT_SECS")?;
        override_from_env(&mut config.min_prices, "FRONTIER_MIN_PRICES")?;
        override_from_env(&mut config.default_years, "FRONTIER_DEFAULT_YEARS")?;
        override_from_env(&mut config.max_tickers, "FRONTIER_MAX_TICKERS")?;
        override_from_env(&mut config.default_risk_free_rate, "FRONTIER_RISK_FREE_RATE")?;
        override_from_env(&mut config.optimizer.simulations, "FRONTIER_SIMULATIONS")?;
        override_from_env(&mut config.optimizer.seed, "FRONTIER_SEED")?;

        config.validate()?;
        Ok(config)
    }

    /// Check that every parameter is usable
    pub fn validate(&self) -> ServiceResult<()> {
        if self.request_timeout_secs == 0 {
            return Err(ServiceError::ConfigError(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.min_prices < 2 {
            return Err(ServiceError::ConfigError(
                "min_prices must be at least 2".to_string(),
            ));
        }
        if self.default_years == 0 || self.default_years > self.max_years {
            return Err(ServiceError::ConfigError(format!(
                "default_years must be between 1 and {}",
                self.max_years
            )));
        }
        if self.max_tickers < 2 {
            return Err(ServiceError::ConfigError(
                "max_tickers must be at least 2".to_string(),
            ));
        }
        if self.max_tickers > self.optimizer.max_assets {
            return Err(ServiceError::ConfigError(format!(
                "max_tickers ({}) exceeds optimizer.max_assets ({})",
                self.max_tickers, self.optimizer.max_assets
            )));
        }
        if !(0.0..=1.0).contains(&self.default_risk_free_rate) {
            return Err(ServiceError::ConfigError(
                "default_risk_free_rate must be between 0 and 1".to_string(),
            ));
        }
        if !(self.partial_data_tolerance > 0.0 && self.partial_data_tolerance <= 1.0) {
            return Err(ServiceError::ConfigError(
                "partial_data_tolerance must be in (0, 1]".to_string(),
            ));
        }
        url::Url::parse(&self.chart_endpoint).map_err(|e| {
            ServiceError::ConfigError(format!("invalid chart_endpoint: {}", e))
        })?;
        self.optimizer.validate()?;
        Ok(())
    }

    /// Per-ticker fetch timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn override_from_env<T: FromStr>(target: &mut T, key: &str) -> ServiceResult<()> {
    if let Ok(raw) = env::var(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|_| ServiceError::ConfigError(format!("{} has invalid value {:?}", key, raw)))?;
    }
    Ok(())
}

// Default value functions
fn default_chart_endpoint() -> String {
    "https://query1.finance.yahoo.com/v8/finance/chart".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; FrontierApp/1.0)".to_string()
}

fn default_min_prices() -> usize {
    30
}

fn default_years() -> u32 {
    2
}

fn default_max_years() -> u32 {
    100
}

fn default_max_tickers() -> usize {
    20
}

fn default_risk_free_rate() -> f64 {
    0.045
}

fn default_partial_data_tolerance() -> f64 {
    0.95
}
