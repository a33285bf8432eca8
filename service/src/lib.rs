//! # frontier-service: Price Fetching and Analysis Requests
//!
//! This library wraps the frontier optimizer with everything a request needs
//! before and after the math: validating caller input, downloading daily
//! close prices, tolerating tickers that fail to load, and scoring the
//! caller's current holdings against the frontier.
//!
//! ## Core Components
//!
//! - **AnalysisService**: Main orchestrator for one analysis request
//! - **PriceSource**: Trait for price history providers
//! - **YahooChartSource**: Yahoo Finance v8 chart API provider
//! - **AnalyzeRequest / AnalyzeResponse**: Caller-facing request and result
//! - **ServiceConfig**: Provider, limits and optimizer settings
//! - **http**: warp routes for `POST /api/analyze`, `GET /api/health` and static files
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use frontier_service::{AnalysisService, AnalyzeRequest, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     frontier_service::init_tracing();
//!
//!     let service = AnalysisService::with_yahoo(ServiceConfig::default()).unwrap();
//!
//!     let request = AnalyzeRequest::new(["SPY", "QQQ", "TLT"])
//!         .with_years(5)
//!         .with_risk_free_rate(0.04)
//!         .with_holding("SPY", 60.0)
//!         .with_holding("TLT", 40.0);
//!
//!     match service.analyze(&request).await {
//!         Ok(response) => println!("Max Sharpe: {:?}", response.report.max_sharpe),
//!         Err(e) => eprintln!("Analysis failed: {}", e),
//!     }
//! }
//! ```

// Public modules
pub mod config;
pub mod error;
pub mod http;
pub mod request;

// Re-export main types
pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult};
pub use request::{AnalyzeRequest, AnalyzeResponse, ValidatedRequest};

// Internal modules
mod service;

// Adapter modules
pub mod adapters {
    pub mod price_source;

    pub use price_source::{PriceHistory, PriceSource};
}

// Provider implementations
pub mod providers {
    pub mod yahoo;

    pub use yahoo::YahooChartSource;
}

// Re-export service
pub use service::AnalysisService;

// Initialize tracing
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        let _: AnalyzeRequest;
        let _: ServiceConfig;
        let _: adapters::PriceHistory;
        let _: Option<AnalysisService>;
        let _: Option<providers::YahooChartSource>;
    }
}
