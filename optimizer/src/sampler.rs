//! Monte Carlo sampling of long-only portfolios
//!
//! Weights are drawn uniformly from the simplex by normalizing independent
//! Exp(1) samples (a Dirichlet(1, ..., 1) draw). Draws come from a single
//! generator owned by the run, so output is reproducible for a given seed.
//! Scoring is independent per draw and runs on the rayon pool.

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{OptimizerError, Result};
use crate::scorer::SimulatedPortfolio;

/// All sampled portfolios of a run plus the extremes among them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleCloud {
    /// Every sampled portfolio, in draw order
    pub portfolios: Vec<SimulatedPortfolio>,

    /// Highest Sharpe ratio (first one on ties)
    pub max_sharpe: SimulatedPortfolio,

    /// Lowest volatility (first one on ties)
    pub min_variance: SimulatedPortfolio,
}

/// Monte Carlo portfolio sampler
#[derive(Debug, Clone)]
pub struct MonteCarloSampler {
    simulations: usize,
    seed: u64,
}

impl MonteCarloSampler {
    /// Create a sampler drawing `simulations` portfolios from a generator seeded with `seed`
    pub fn new(simulations: usize, seed: u64) -> Self {
        Self { simulations, seed }
    }

    /// Draw one weight vector uniformly from the long-only simplex
    pub fn random_weights<R: Rng + ?Sized>(num_assets: usize, rng: &mut R) -> Vec<f64> {
        let mut weights: Vec<f64> = (0..num_assets).map(|_| Exp1.sample(rng)).collect();
        let total: f64 = weights.iter().sum();

        for w in &mut weights {
            *w /= total;
        }

        weights
    }

    /// Sample and score portfolios with a fresh generator from the configured seed
    pub fn run(
        &self,
        mean_returns: &DVector<f64>,
        covariance: &DMatrix<f64>,
        risk_free_rate: f64,
    ) -> Result<SampleCloud> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.run_with_rng(mean_returns, covariance, risk_free_rate, &mut rng)
    }

    /// Sample and score portfolios with a caller-supplied generator
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        mean_returns: &DVector<f64>,
        covariance: &DMatrix<f64>,
        risk_free_rate: f64,
        rng: &mut R,
    ) -> Result<SampleCloud> {
        if self.simulations == 0 {
            return Err(OptimizerError::InvalidInput(
                "number of simulations must be positive".to_string(),
            ));
        }

        let n = mean_returns.len();
        if n == 0 || covariance.nrows() != n || covariance.ncols() != n {
            return Err(OptimizerError::InvalidInput(format!(
                "covariance matrix is {}x{} for {} assets",
                covariance.nrows(),
                covariance.ncols(),
                n
            )));
        }

        // Draws stay sequential so the stream does not depend on thread scheduling
        let draws: Vec<Vec<f64>> = (0..self.simulations)
            .map(|_| Self::random_weights(n, rng))
            .collect();

        let portfolios: Vec<SimulatedPortfolio> = draws
            .into_par_iter()
            .map(|w| SimulatedPortfolio::scored(w, mean_returns, covariance, risk_free_rate))
            .collect();

        let mut max_idx = 0;
        let mut min_idx = 0;
        for (i, p) in portfolios.iter().enumerate().skip(1) {
            if p.sharpe > portfolios[max_idx].sharpe {
                max_idx = i;
            }
            if p.risk < portfolios[min_idx].risk {
                min_idx = i;
            }
        }

        Ok(SampleCloud {
            max_sharpe: portfolios[max_idx].clone(),
            min_variance: portfolios[min_idx].clone(),
            portfolios,
        })
    }
}
