//! Efficient frontier example
//!
//! Simulates geometric Brownian motion price paths for a small basket,
//! runs the optimizer and prints the key portfolios.
//!
//! Run with: cargo run -p frontier-optimizer --example frontier

use frontier_optimizer::{FrontierEngine, OptimizationRequest, OptimizerConfig, PriceSeries};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Daily closes of a GBM path with annual drift `mu` and volatility `sigma`
fn gbm_path(ticker: &str, mu: f64, sigma: f64, days: usize, rng: &mut StdRng) -> PriceSeries {
    let dt = 1.0 / 252.0;
    let normal = Normal::new(0.0, 1.0).expect("valid normal");

    let mut price = 100.0;
    let closes = (0..days)
        .map(|_| {
            let z: f64 = normal.sample(rng);
            price *= ((mu - 0.5 * sigma * sigma) * dt + sigma * dt.sqrt() * z).exp();
            price
        })
        .collect();

    PriceSeries::new(ticker, closes)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Efficient Frontier Example ===\n");

    let mut rng = StdRng::seed_from_u64(2024);
    let assets = vec![
        gbm_path("EQUITY", 0.09, 0.18, 504, &mut rng),
        gbm_path("GROWTH", 0.13, 0.28, 504, &mut rng),
        gbm_path("BONDS", 0.03, 0.06, 504, &mut rng),
        gbm_path("GOLD", 0.05, 0.15, 378, &mut rng),
    ];

    let engine = FrontierEngine::new(OptimizerConfig::default())?;
    let request = OptimizationRequest::new(assets).with_risk_free_rate(0.045);
    let report = engine.optimize(&request)?;

    println!("Asset statistics:");
    for s in &report.asset_stats {
        println!(
            "  {:<8} return {:>7.2}%  volatility {:>6.2}%",
            s.ticker,
            s.annual_return * 100.0,
            s.annual_volatility * 100.0
        );
    }

    let print_weights = |weights: &[f64]| {
        for (ticker, w) in report.tickers.iter().zip(weights) {
            println!("    {:<8} {:>6.2}%", ticker, w * 100.0);
        }
    };

    println!("\nMaximum Sharpe portfolio (Sharpe {:.3}):", report.max_sharpe.sharpe);
    print_weights(&report.max_sharpe.weights);

    println!("\nMinimum variance portfolio (risk {:.2}%):", report.min_variance.risk * 100.0);
    print_weights(&report.min_variance.weights);

    println!("\nEfficient frontier ({} points):", report.frontier_points.len());
    for p in report.frontier_points.iter().step_by(10) {
        println!(
            "  risk {:>6.2}%  return {:>6.2}%",
            p.risk * 100.0,
            p.expected_return * 100.0
        );
    }

    Ok(())
}
