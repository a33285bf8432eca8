//! Integration tests for AnalysisService

use approx::assert_relative_eq;
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use frontier_optimizer::PriceSeries;
use frontier_service::{
    adapters::{PriceHistory, PriceSource},
    error::{ServiceError, ServiceResult},
    AnalysisService, AnalyzeRequest, ServiceConfig,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// How the mock answers for one ticker
#[derive(Clone)]
enum Behavior {
    /// Daily closes over this many calendar days
    Prices { days: usize, drift: f64, seed: u64 },
    /// Provider failure
    Fail,
    /// Sleep before answering
    Slow(std::time::Duration),
}

/// Mock price source for testing
struct MockPriceSource {
    behaviors: HashMap<String, Behavior>,
    calls: AtomicUsize,
}

impl MockPriceSource {
    fn new() -> Self {
        Self {
            behaviors: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn with(mut self, ticker: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(ticker.to_string(), behavior);
        self
    }

    fn prices(self, ticker: &str, seed: u64, drift: f64) -> Self {
        self.with(ticker, Behavior::Prices { days: 760, drift, seed })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn synthetic_series(ticker: &str, days: usize, drift: f64, seed: u64) -> PriceSeries {
    let start = Utc.with_ymd_and_hms(2022, 1, 3, 21, 0, 0).unwrap();
    let mut state = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut price = 100.0;
    let mut closes = Vec::with_capacity(days);
    let mut dates = Vec::with_capacity(days);

    for day in 0..days {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let u = (state >> 11) as f64 / (1u64 << 53) as f64;
        price *= (drift + (u - 0.5) * 0.03).exp();
        closes.push(price);
        dates.push(start + Duration::days(day as i64));
    }

    PriceSeries::new(ticker, closes).with_dates(dates)
}

#[async_trait]
impl PriceSource for MockPriceSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_history(&self, ticker: &str, years: u32) -> ServiceResult<PriceHistory> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.behaviors.get(ticker).cloned() {
            Some(Behavior::Prices { days, drift, seed }) => Ok(PriceHistory::new(
                synthetic_series(ticker, days, drift, seed),
                years,
                0.95,
            )),
            Some(Behavior::Fail) => Err(ServiceError::Provider {
                ticker: ticker.to_string(),
                message: "upstream unavailable".to_string(),
                status: Some(503),
            }),
            Some(Behavior::Slow(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(PriceHistory::new(synthetic_series(ticker, 760, 0.0, 9), years, 0.95))
            }
            None => Err(ServiceError::UnknownTicker(ticker.to_string())),
        }
    }
}

fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.optimizer.simulations = 500;
    config.optimizer.frontier_points = 20;
    config
}

fn service(source: MockPriceSource) -> (AnalysisService, Arc<MockPriceSource>) {
    let source = Arc::new(source);
    let service = AnalysisService::new(test_config(), source.clone()).unwrap();
    (service, source)
}

#[tokio::test]
async fn test_analyze_all_tickers() {
    let (service, source) = service(
        MockPriceSource::new()
            .prices("SPY", 1, 0.0004)
            .prices("QQQ", 2, 0.0006)
            .prices("TLT", 3, 0.0001),
    );

    let request = AnalyzeRequest::new(["spy", "QQQ", "tlt", "SPY"]).with_risk_free_rate(0.03);
    let response = service.analyze(&request).await.unwrap();

    assert_eq!(source.calls(), 3);
    assert_eq!(response.report.tickers, vec!["SPY", "QQQ", "TLT"]);
    assert_eq!(response.report.monte_carlo_points.len(), 500);
    assert!(response.report.frontier_points.len() <= 20);
    assert_eq!(response.report.risk_free_rate, 0.03);
    assert!(response.warnings.is_empty());
    assert!(response.error.is_none());
    assert!(response.current_portfolio_stats.is_none());
}

#[tokio::test]
async fn test_failed_ticker_is_reported_but_not_fatal() {
    let (service, _) = service(
        MockPriceSource::new()
            .prices("SPY", 1, 0.0004)
            .prices("QQQ", 2, 0.0006)
            .with("BAD", Behavior::Fail),
    );

    let response = service
        .analyze(&AnalyzeRequest::new(["SPY", "BAD", "QQQ"]))
        .await
        .unwrap();

    assert_eq!(response.report.tickers, vec!["SPY", "QQQ"]);
    let error = response.error.unwrap();
    assert!(error.starts_with("some tickers failed: BAD: "));
    assert!(error.contains("upstream unavailable"));
}

#[tokio::test]
async fn test_too_few_assets_fails() {
    let (service, _) = service(MockPriceSource::new().prices("SPY", 1, 0.0004));

    let result = service.analyze(&AnalyzeRequest::new(["SPY", "NOPE"])).await;

    match result {
        Err(ServiceError::InsufficientAssets(msg)) => {
            assert!(msg.starts_with("could not fetch enough data to compute the frontier"));
            assert!(msg.contains("NOPE: Unknown ticker: NOPE"));
        }
        other => panic!("expected InsufficientAssets, got {:?}", other.map(|r| r.report.tickers)),
    }
}

#[tokio::test]
async fn test_bad_request_skips_fetching() {
    let (service, source) = service(MockPriceSource::new().prices("SPY", 1, 0.0004));

    let result = service.analyze(&AnalyzeRequest::new(["SPY", " spy "])).await;

    assert!(matches!(result, Err(ServiceError::BadRequest(_))));
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_slow_ticker_times_out() {
    let mut config = test_config();
    config.request_timeout_secs = 1;

    let source = Arc::new(
        MockPriceSource::new()
            .prices("SPY", 1, 0.0004)
            .prices("QQQ", 2, 0.0006)
            .with("SLOW", Behavior::Slow(std::time::Duration::from_secs(10))),
    );
    let service = AnalysisService::new(config, source).unwrap();

    let response = service
        .analyze(&AnalyzeRequest::new(["SPY", "QQQ", "SLOW"]))
        .await
        .unwrap();

    assert_eq!(response.report.tickers, vec!["SPY", "QQQ"]);
    assert!(response.error.unwrap().contains("SLOW: Operation timed out"));
}

#[tokio::test]
async fn test_partial_history_warning() {
    let (service, _) = service(
        MockPriceSource::new()
            .prices("SPY", 1, 0.0004)
            .with("NEW", Behavior::Prices { days: 200, drift: 0.001, seed: 5 }),
    );

    let response = service
        .analyze(&AnalyzeRequest::new(["SPY", "NEW"]).with_years(2))
        .await
        .unwrap();

    assert_eq!(response.warnings.len(), 1);
    assert!(response.warnings[0].starts_with("NEW: only ~0.5 years of data available"));
    // Statistics use the overlapping window
    assert_eq!(response.report.tickers.len(), 2);
}

#[tokio::test]
async fn test_current_portfolio_is_scored() {
    let (service, _) = service(
        MockPriceSource::new()
            .prices("SPY", 1, 0.0004)
            .prices("QQQ", 2, 0.0006)
            .with("BAD", Behavior::Fail),
    );

    let request = AnalyzeRequest::new(["SPY", "QQQ", "BAD"])
        .with_risk_free_rate(0.02)
        .with_holding("spy", 600.0)
        .with_holding("QQQ", 400.0)
        .with_holding("BAD", 1000.0);
    let response = service.analyze(&request).await.unwrap();

    let current = response.current_portfolio_stats.unwrap();
    assert_relative_eq!(current.weights[0], 0.6, epsilon = 1e-12);
    assert_relative_eq!(current.weights[1], 0.4, epsilon = 1e-12);

    // The sampled minimum sits close to the true minimum-variance portfolio
    assert!(current.risk > 0.0);
    assert!(current.risk >= response.report.min_variance.risk * 0.9);
}

#[tokio::test]
async fn test_empty_holdings_are_ignored_with_warning() {
    let (service, _) = service(
        MockPriceSource::new()
            .prices("SPY", 1, 0.0004)
            .prices("QQQ", 2, 0.0006),
    );

    let request = AnalyzeRequest::new(["SPY", "QQQ"]).with_holding("GLD", 100.0);
    let response = service.analyze(&request).await.unwrap();

    assert!(response.current_portfolio_stats.is_none());
    assert_eq!(response.warnings.len(), 1);
    assert!(response.warnings[0].starts_with("current portfolio ignored"));
}

#[tokio::test]
async fn test_response_json_shape() {
    let (service, _) = service(
        MockPriceSource::new()
            .prices("SPY", 1, 0.0004)
            .prices("QQQ", 2, 0.0006),
    );

    let response = service
        .analyze(&AnalyzeRequest::new(["SPY", "QQQ"]))
        .await
        .unwrap();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["tickers"], serde_json::json!(["SPY", "QQQ"]));
    assert!(json["max_sharpe"]["return"].is_number());
    assert!(json["frontier_points"][0]["risk"].is_number());
    assert!(json.get("warnings").is_none());
    assert!(json.get("error").is_none());
    assert!(json.get("current_portfolio_stats").is_none());
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let (service, _) = service(
        MockPriceSource::new()
            .prices("SPY", 1, 0.0004)
            .prices("QQQ", 2, 0.0006)
            .prices("GLD", 4, 0.0002),
    );
    let request = AnalyzeRequest::new(["SPY", "QQQ", "GLD"]);

    let first = service.analyze(&request).await.unwrap();
    let second = service.analyze(&request).await.unwrap();

    assert_eq!(first, second);
}
