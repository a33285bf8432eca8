//! Example: Analyzing a basket of tickers with live Yahoo Finance data
//!
//! This example demonstrates how to:
//! 1. Load the service configuration from the environment
//! 2. Build an analysis request from command-line tickers
//! 3. Fetch prices and compute the efficient frontier
//! 4. Compare a current holding against the optimal portfolios
//!
//! Usage: cargo run --example analyze -- SPY QQQ TLT GLD

use anyhow::Context;
use frontier_service::{AnalysisService, AnalyzeRequest, ServiceConfig};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    frontier_service::init_tracing();

    println!("=== Efficient Frontier Analysis ===\n");

    let mut tickers: Vec<String> = env::args().skip(1).collect();
    if tickers.is_empty() {
        tickers = ["SPY", "QQQ", "TLT", "GLD"].iter().map(|t| t.to_string()).collect();
    }

    // 1. Configuration (FRONTIER_* variables, .env supported)
    let config = ServiceConfig::from_env().context("loading configuration")?;
    println!(
        "1. Using {} simulations, seed {}\n",
        config.optimizer.simulations, config.optimizer.seed
    );
    let service = AnalysisService::with_yahoo(config)?;

    // 2. Request with an equal-weight current holding
    let mut request = AnalyzeRequest::new(tickers.clone()).with_years(3);
    for ticker in &tickers {
        request = request.with_holding(ticker.as_str(), 1.0);
    }
    println!("2. Requesting {} years for {}\n", 3, tickers.join(", "));

    // 3. Fetch and optimize
    let response = service.analyze(&request).await.context("analysis failed")?;
    let report = &response.report;

    println!("3. Asset statistics:");
    for stats in &report.asset_stats {
        println!(
            "   {:<8} return {:>7.2}%  volatility {:>6.2}%",
            stats.ticker,
            stats.annual_return * 100.0,
            stats.annual_volatility * 100.0
        );
    }

    let describe = |label: &str, weights: &[f64], ret: f64, risk: f64, sharpe: f64| {
        println!("\n   {}: return {:.2}%, risk {:.2}%, Sharpe {:.3}", label, ret * 100.0, risk * 100.0, sharpe);
        for (ticker, w) in report.tickers.iter().zip(weights) {
            println!("     {:<8} {:>6.2}%", ticker, w * 100.0);
        }
    };

    println!("\n4. Portfolios (risk-free rate {:.2}%):", report.risk_free_rate * 100.0);
    let best = &report.max_sharpe;
    describe("Max Sharpe", &best.weights, best.expected_return, best.risk, best.sharpe);
    let safest = &report.min_variance;
    describe("Min variance", &safest.weights, safest.expected_return, safest.risk, safest.sharpe);
    if let Some(current) = &response.current_portfolio_stats {
        describe("Current", &current.weights, current.expected_return, current.risk, current.sharpe);
    }

    println!("\n   Frontier: {} points", report.frontier_points.len());

    for warning in &response.warnings {
        println!("   ! {}", warning);
    }
    if let Some(error) = &response.error {
        println!("   ! {}", error);
    }

    println!("\n=== JSON ===");
    println!("{}", serde_json::to_string_pretty(&report.frontier_points)?);

    Ok(())
}
