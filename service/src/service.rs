//! Analysis service orchestrating price fetches and optimization
//!
//! The AnalysisService is the main entry point for a request. It fetches every
//! ticker concurrently from a PriceSource, keeps whatever arrived in time, and
//! runs the optimizer on the blocking thread pool.

use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use frontier_optimizer::{
    scorer, FrontierEngine, OptimizationReport, PriceSeries, RunParameters, SimulatedPortfolio,
};

use crate::adapters::price_source::{PriceHistory, PriceSource};
use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::providers::yahoo::YahooChartSource;
use crate::request::{AnalyzeRequest, AnalyzeResponse, ValidatedRequest};

/// Report, current holdings score and holdings warning
type EngineOutput = (OptimizationReport, Option<SimulatedPortfolio>, Option<String>);

/// Analysis service
pub struct AnalysisService {
    /// Price history provider shared by every fetch task
    source: Arc<dyn PriceSource>,

    /// Optimization engine
    engine: Arc<FrontierEngine>,

    /// Configuration
    config: ServiceConfig,
}

impl AnalysisService {
    /// Create a service around an explicit price source
    pub fn new(config: ServiceConfig, source: Arc<dyn PriceSource>) -> ServiceResult<Self> {
        config.validate()?;
        let engine = FrontierEngine::new(config.optimizer.clone())?;
        info!("Using price source: {}", source.name());

        Ok(Self {
            source,
            engine: Arc::new(engine),
            config,
        })
    }

    /// Create a service backed by the Yahoo Finance chart API
    pub fn with_yahoo(config: ServiceConfig) -> ServiceResult<Self> {
        let source = YahooChartSource::new(&config)?;
        Self::new(config, Arc::new(source))
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Validate a request, fetch its price histories and optimize
    ///
    /// Tickers that fail to load are reported in the response `error` field
    /// as long as at least two assets remain.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> ServiceResult<AnalyzeResponse> {
        let request = request.validate(&self.config)?;
        info!(
            tickers = request.tickers.len(),
            years = request.years,
            "Analyzing portfolio: {}",
            request.tickers.join(",")
        );

        let fetched = self.fetch_all(&request.tickers, request.years).await;

        let mut failures = Vec::new();
        let mut warnings = Vec::new();
        let mut assets = Vec::new();
        for (ticker, result) in request.tickers.iter().zip(fetched) {
            match result {
                Ok(history) => {
                    if let Some(warning) = history.partial_warning() {
                        warn!(
                            "Partial data: {} has {:.1} years, requested {}",
                            ticker, history.years_available, history.years_requested
                        );
                        warnings.push(warning);
                    }
                    assets.push(history.series);
                }
                Err(e) => {
                    error!("Fetch failed for {}: {}", ticker, e);
                    failures.push(format!("{}: {}", ticker, e));
                }
            }
        }

        if assets.len() < 2 {
            let mut msg = "could not fetch enough data to compute the frontier".to_string();
            if !failures.is_empty() {
                msg.push_str(": ");
                msg.push_str(&failures.join("; "));
            }
            return Err(ServiceError::InsufficientAssets(msg));
        }

        let (report, current_portfolio_stats, holdings_warning) =
            self.run_engine(assets, &request).await?;
        warnings.extend(holdings_warning);

        let error = (!failures.is_empty())
            .then(|| format!("some tickers failed: {}", failures.join("; ")));

        Ok(AnalyzeResponse {
            report,
            current_portfolio_stats,
            warnings,
            error,
        })
    }

    /// Fetch every ticker on its own task, in request order
    async fn fetch_all(&self, tickers: &[String], years: u32) -> Vec<ServiceResult<PriceHistory>> {
        let timeout = self.config.request_timeout();

        let handles: Vec<_> = tickers
            .iter()
            .map(|ticker| {
                let source = Arc::clone(&self.source);
                let ticker = ticker.clone();
                tokio::spawn(async move { fetch_with_timeout(source, ticker, years, timeout).await })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .map(|joined| {
                joined.unwrap_or_else(|e| {
                    Err(ServiceError::InternalError(format!("fetch task failed: {}", e)))
                })
            })
            .collect()
    }

    /// Run estimation, optimization and the holdings score off the async runtime
    async fn run_engine(
        &self,
        assets: Vec<PriceSeries>,
        request: &ValidatedRequest,
    ) -> ServiceResult<EngineOutput> {
        let engine = Arc::clone(&self.engine);
        let risk_free_rate = request.risk_free_rate;
        let holdings = request.current_portfolio.clone();

        tokio::task::spawn_blocking(move || -> ServiceResult<EngineOutput> {
            let estimate = engine.estimate(&assets)?;
            let report = engine.optimize_estimate(&estimate, &RunParameters::new(risk_free_rate))?;

            if holdings.is_empty() {
                return Ok((report, None, None));
            }

            let weights = current_weights(&estimate.tickers, &holdings);
            match scorer::normalize_allocation(&weights) {
                Ok(weights) => {
                    let stats = engine.score_allocation(&estimate, &weights, risk_free_rate)?;
                    debug!(sharpe = stats.sharpe, "Scored current portfolio");
                    Ok((report, Some(stats), None))
                }
                Err(e) => {
                    warn!("Ignoring current portfolio: {}", e);
                    Ok((report, None, Some(format!("current portfolio ignored: {}", e))))
                }
            }
        })
        .await
        .map_err(|e| ServiceError::InternalError(format!("optimizer task failed: {}", e)))?
    }
}

async fn fetch_with_timeout(
    source: Arc<dyn PriceSource>,
    ticker: String,
    years: u32,
    timeout: Duration,
) -> ServiceResult<PriceHistory> {
    match tokio::time::timeout(timeout, source.fetch_history(&ticker, years)).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::Timeout(format!(
            "fetching {} took longer than {:?}",
            ticker, timeout
        ))),
    }
}

/// Holdings aligned with the fetched tickers; unlisted tickers hold nothing
fn current_weights(tickers: &[String], holdings: &HashMap<String, f64>) -> Vec<f64> {
    tickers
        .iter()
        .map(|t| holdings.get(t).copied().unwrap_or(0.0))
        .collect()
}
