//! Minimum-variance portfolios at a target return
//!
//! Solves `min wᵀΣw` subject to `Σw = 1`, `w >= 0`, `μ·w = target` with
//! projected gradient descent. After each gradient step on `2Σw` the weights
//! are pulled back towards the constraints by alternating passes of:
//! 1. shifting every weight by the same amount so they sum to one,
//! 2. shifting along `μ - mean(μ)` so the return meets the target
//!    (this direction leaves the weight sum unchanged),
//! 3. clamping negative weights to zero.
//!
//! Steps 1 and 2 together are the Euclidean projection onto the affine
//! constraints. Alternating them with the clamp is not an exact projection onto
//! the feasible polytope, so results are approximate and convergence slows
//! down for ill-conditioned covariance matrices.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

use crate::config::SweepConfig;
use crate::error::{OptimizerError, Result};
use crate::frontier::{self, FrontierPoint};
use crate::scorer::SimulatedPortfolio;

/// Weight mass below this is treated as a collapsed projection
const MASS_EPSILON: f64 = 1e-12;

/// Find approximately minimum-variance long-only weights with return `target`
pub fn min_variance_for_return(
    mean_returns: &DVector<f64>,
    covariance: &DMatrix<f64>,
    target: f64,
    config: &SweepConfig,
) -> Result<DVector<f64>> {
    check_dimensions(mean_returns, covariance)?;
    if !target.is_finite() {
        return Err(OptimizerError::InvalidInput(format!(
            "target return must be finite, got {}",
            target
        )));
    }

    // Long-only portfolios can only reach returns between the extreme assets
    let lowest = mean_returns.min();
    let highest = mean_returns.max();
    if target < lowest - config.target_tolerance || target > highest + config.target_tolerance {
        return Err(OptimizerError::InfeasibleTarget { target });
    }

    let weights = descend(mean_returns, covariance, Some(target), config)
        .ok_or(OptimizerError::InfeasibleTarget { target })?;

    let achieved = weights.dot(mean_returns);
    if (achieved - target).abs() > config.target_tolerance {
        return Err(OptimizerError::InfeasibleTarget { target });
    }

    Ok(weights)
}

/// Find approximately the long-only portfolio with the lowest variance overall
pub fn global_min_variance(
    mean_returns: &DVector<f64>,
    covariance: &DMatrix<f64>,
    config: &SweepConfig,
) -> Result<DVector<f64>> {
    check_dimensions(mean_returns, covariance)?;
    descend(mean_returns, covariance, None, config).ok_or_else(|| {
        OptimizerError::InvalidInput("minimum-variance weights collapsed".to_string())
    })
}

fn check_dimensions(mean_returns: &DVector<f64>, covariance: &DMatrix<f64>) -> Result<()> {
    let n = mean_returns.len();
    if n == 0 || covariance.nrows() != n || covariance.ncols() != n {
        return Err(OptimizerError::InvalidInput(format!(
            "covariance matrix is {}x{} for {} assets",
            covariance.nrows(),
            covariance.ncols(),
            n
        )));
    }
    Ok(())
}

/// Projected gradient descent on `wᵀΣw`; `None` if the weights collapse
fn descend(
    mean_returns: &DVector<f64>,
    covariance: &DMatrix<f64>,
    target: Option<f64>,
    config: &SweepConfig,
) -> Option<DVector<f64>> {
    let n = mean_returns.len();
    let deviation = mean_returns.add_scalar(-mean_returns.mean());
    let deviation_norm = deviation.norm_squared();

    let mut weights = DVector::from_element(n, 1.0 / n as f64);
    let mut learning_rate = config.learning_rate;

    for iteration in 0..config.iterations {
        if iteration > 0 && iteration % config.decay_every == 0 {
            learning_rate *= 0.5;
        }

        let gradient = covariance * &weights * 2.0;
        weights -= gradient * learning_rate;

        for _ in 0..config.correction_passes {
            let mass = weights.sum();
            weights.add_scalar_mut((1.0 - mass) / n as f64);

            if let Some(target) = target {
                if deviation_norm > MASS_EPSILON {
                    let gap = target - weights.dot(mean_returns);
                    weights += &deviation * (gap / deviation_norm);
                }
            }

            weights.apply(|w| *w = w.max(0.0));
        }
    }

    let mass = weights.sum();
    if !mass.is_finite() || mass < MASS_EPSILON {
        return None;
    }
    Some(weights / mass)
}

/// Sweep `points` targets between the minimum-variance return and 1.5x the
/// best-Sharpe return, solving each one and keeping the non-dominated results
///
/// The sweep starts at the solved global minimum-variance portfolio, falling
/// back to the sampled one, so no target lies on the inefficient branch.
/// Infeasible targets are skipped.
pub fn sweep_frontier(
    mean_returns: &DVector<f64>,
    covariance: &DMatrix<f64>,
    min_variance: &SimulatedPortfolio,
    max_sharpe: &SimulatedPortfolio,
    points: usize,
    risk_free_rate: f64,
    config: &SweepConfig,
) -> Vec<FrontierPoint> {
    let low = match global_min_variance(mean_returns, covariance, config) {
        Ok(weights) => weights.dot(mean_returns),
        Err(e) => {
            warn!("Falling back to sampled minimum variance: {}", e);
            min_variance.expected_return
        }
    };
    let high = (max_sharpe.expected_return * 1.5).max(low);
    let step = if points > 1 {
        (high - low) / (points - 1) as f64
    } else {
        0.0
    };

    let mut solved = Vec::with_capacity(points);
    for i in 0..points {
        let target = low + step * i as f64;

        match min_variance_for_return(mean_returns, covariance, target, config) {
            Ok(weights) => solved.push(SimulatedPortfolio::scored(
                weights.iter().copied().collect(),
                mean_returns,
                covariance,
                risk_free_rate,
            )),
            Err(e) if e.is_recoverable() => {
                debug!(target_return = target, "Skipping frontier target: {}", e);
            }
            Err(e) => {
                warn!(target_return = target, "Frontier target failed: {}", e);
            }
        }
    }

    frontier::non_dominated(&solved)
}
