//! Integration tests for the Yahoo chart adapter over HTTP

use frontier_service::{
    adapters::PriceSource, error::ServiceError, providers::YahooChartSource, AnalysisService,
    AnalyzeRequest, ServiceConfig,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DAY: i64 = 86_400;

/// Chart payload with `count` daily closes starting at 2023-01-02
fn chart_body(symbol: &str, count: usize, base: f64) -> Value {
    let start = 1_672_617_600i64;
    let timestamps: Vec<i64> = (0..count as i64).map(|d| start + d * DAY).collect();
    let closes: Vec<Value> = (0..count)
        .map(|i| {
            if i % 17 == 5 {
                Value::Null
            } else {
                json!(base * (1.0 + 0.01 * ((i as f64) * 0.7).sin()))
            }
        })
        .collect();

    json!({
        "chart": {
            "result": [{
                "meta": { "symbol": symbol, "currency": "USD" },
                "timestamp": timestamps,
                "indicators": { "quote": [{ "close": closes }] }
            }],
            "error": null
        }
    })
}

fn config_for(server: &MockServer) -> ServiceConfig {
    let mut config = ServiceConfig {
        chart_endpoint: format!("{}/v8/finance/chart", server.uri()),
        request_timeout_secs: 2,
        ..Default::default()
    };
    config.optimizer.simulations = 300;
    config
}

#[tokio::test]
async fn test_fetch_history_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/SPY"))
        .and(query_param("interval", "1d"))
        .and(query_param("range", "2y"))
        .and(header("user-agent", "Mozilla/5.0 (compatible; FrontierApp/1.0)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body("SPY", 760, 400.0)))
        .expect(1)
        .mount(&server)
        .await;

    let source = YahooChartSource::new(&config_for(&server)).unwrap();
    let history = source.fetch_history("SPY", 2).await.unwrap();

    // Every 17th close starting at index 5 is null
    let nulls = (0..760).filter(|i| i % 17 == 5).count();
    assert_eq!(history.series.ticker, "SPY");
    assert_eq!(history.series.len(), 760 - nulls);
    assert_eq!(history.series.dates.len(), history.series.len());
    assert_eq!(history.years_requested, 2);
    assert!(!history.partial);
}

#[tokio::test]
async fn test_short_history_is_partial() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NEWCO"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body("NEWCO", 90, 20.0)))
        .mount(&server)
        .await;

    let source = YahooChartSource::new(&config_for(&server)).unwrap();
    let history = source.fetch_history("NEWCO", 5).await.unwrap();

    assert!(history.partial);
    assert!(history.years_available < 0.25);
    assert!(history.partial_warning().unwrap().contains("requested 5 years"));
}

#[tokio::test]
async fn test_unknown_ticker() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/ZZZZZ"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        })))
        .mount(&server)
        .await;

    let source = YahooChartSource::new(&config_for(&server)).unwrap();
    let err = source.fetch_history("ZZZZZ", 2).await.unwrap_err();

    assert!(matches!(err, ServiceError::UnknownTicker(ref t) if t == "ZZZZZ"));
    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_server_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let source = YahooChartSource::new(&config_for(&server)).unwrap();
    let err = source.fetch_history("SPY", 2).await.unwrap_err();

    match &err {
        ServiceError::Provider { status, .. } => assert_eq!(*status, Some(502)),
        other => panic!("expected provider error, got {:?}", other),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_not_enough_prices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body("IPO", 20, 10.0)))
        .mount(&server)
        .await;

    let source = YahooChartSource::new(&config_for(&server)).unwrap();
    let err = source.fetch_history("IPO", 1).await.unwrap_err();

    assert!(err.to_string().starts_with("Not enough price data for IPO"));
}

#[tokio::test]
async fn test_client_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chart_body("SPY", 100, 10.0))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.request_timeout_secs = 1;
    let source = YahooChartSource::new(&config).unwrap();

    let err = source.fetch_history("SPY", 1).await.unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_analysis_over_http() {
    let server = MockServer::start().await;
    for (symbol, base) in [("SPY", 400.0), ("TLT", 95.0)] {
        Mock::given(method("GET"))
            .and(path(format!("/v8/finance/chart/{}", symbol)))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(symbol, 400, base)))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/GONE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let source = Arc::new(YahooChartSource::new(&config).unwrap());
    let service = AnalysisService::new(config, source).unwrap();

    let request = AnalyzeRequest::new(["spy", "gone", "tlt"]).with_years(1);
    let response = service.analyze(&request).await.unwrap();

    assert_eq!(response.report.tickers, vec!["SPY", "TLT"]);
    assert_eq!(response.report.monte_carlo_points.len(), 300);
    assert_eq!(
        response.error.as_deref(),
        Some("some tickers failed: GONE: Unknown ticker: GONE")
    );
}
