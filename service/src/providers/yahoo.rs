//! Yahoo Finance chart API price source
//!
//! This module implements the PriceSource trait on top of the public v8 chart
//! endpoint: `GET {endpoint}/{ticker}?interval=1d&range={years}y`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error};
use url::Url;

use frontier_optimizer::PriceSeries;

use crate::adapters::price_source::{PriceHistory, PriceSource};
use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};

/// Yahoo Finance chart adapter
pub struct YahooChartSource {
    endpoint: Url,
    client: Client,
    min_prices: usize,
    partial_data_tolerance: f64,
}

impl YahooChartSource {
    /// Create a new chart adapter
    pub fn new(config: &ServiceConfig) -> ServiceResult<Self> {
        let endpoint = Url::parse(&config.chart_endpoint)
            .map_err(|e| ServiceError::ConfigError(format!("Invalid chart endpoint: {}", e)))?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ServiceError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            client,
            min_prices: config.min_prices,
            partial_data_tolerance: config.partial_data_tolerance,
        })
    }

    /// Build the chart URL for one ticker
    fn chart_url(&self, ticker: &str, years: u32) -> ServiceResult<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ServiceError::ConfigError(format!("Chart endpoint cannot be a base: {}", self.endpoint))
            })?
            .pop_if_empty()
            .push(ticker);
        url.query_pairs_mut()
            .append_pair("interval", "1d")
            .append_pair("range", &format!("{}y", years));
        Ok(url)
    }

    /// Convert a chart payload into a price series
    ///
    /// Null and non-positive closes are skipped together with their timestamps.
    fn parse_chart(&self, ticker: &str, chart: ChartResponse) -> ServiceResult<PriceSeries> {
        if let Some(err) = chart.chart.error {
            return Err(Self::map_chart_error(ticker, err, None));
        }

        let result = chart
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| ServiceError::UnknownTicker(ticker.to_string()))?;

        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::Provider {
                ticker: ticker.to_string(),
                message: "no quote data".to_string(),
                status: None,
            })?;

        let timestamps = result.timestamp.unwrap_or_default();
        let mut closes = Vec::with_capacity(quote.close.len());
        let mut dates = Vec::with_capacity(quote.close.len());

        for (i, close) in quote.close.into_iter().enumerate() {
            let Some(close) = close.filter(|c| c.is_finite() && *c > 0.0) else {
                continue;
            };
            closes.push(close);
            if let Some(date) = timestamps
                .get(i)
                .and_then(|ts| DateTime::<Utc>::from_timestamp(*ts, 0))
            {
                dates.push(date);
            }
        }

        if closes.len() < self.min_prices {
            return Err(ServiceError::InsufficientHistory {
                ticker: ticker.to_string(),
                got: closes.len(),
                required: self.min_prices,
            });
        }

        // Dates are only kept when every close has one
        if dates.len() != closes.len() {
            dates.clear();
        }

        Ok(PriceSeries::new(ticker, closes).with_dates(dates))
    }

    fn map_chart_error(ticker: &str, err: ChartError, status: Option<u16>) -> ServiceError {
        if err.code.eq_ignore_ascii_case("Not Found") {
            return ServiceError::UnknownTicker(ticker.to_string());
        }
        ServiceError::Provider {
            ticker: ticker.to_string(),
            message: err.description.unwrap_or(err.code),
            status,
        }
    }
}

#[async_trait]
impl PriceSource for YahooChartSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_history(&self, ticker: &str, years: u32) -> ServiceResult<PriceHistory> {
        let url = self.chart_url(ticker, years)?;
        debug!(ticker, %url, "Fetching price history");

        let response = self.client.get(url).send().await.map_err(|e| {
            error!(ticker, error = %e, "Price request failed");
            if e.is_timeout() {
                ServiceError::Timeout(format!("fetching {}", ticker))
            } else {
                ServiceError::NetworkError(format!("fetching {}: {}", ticker, e))
            }
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Yahoo reports unknown symbols as 404 with a chart error body
            let chart_error = serde_json::from_str::<ChartResponse>(&body)
                .ok()
                .and_then(|c| c.chart.error);
            return Err(match chart_error {
                Some(err) => Self::map_chart_error(ticker, err, Some(status.as_u16())),
                None if status == StatusCode::NOT_FOUND => {
                    ServiceError::UnknownTicker(ticker.to_string())
                }
                None => ServiceError::Provider {
                    ticker: ticker.to_string(),
                    message: format!("HTTP {}", status),
                    status: Some(status.as_u16()),
                },
            });
        }

        let chart: ChartResponse = serde_json::from_str(&body)?;
        let series = self.parse_chart(ticker, chart)?;
        debug!(ticker, closes = series.len(), "Parsed price history");

        Ok(PriceHistory::new(series, years, self.partial_data_tolerance))
    }
}

// Chart API types

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}
