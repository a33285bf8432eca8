//! Efficient frontier extraction from sampled portfolios
//!
//! Samples are sorted by risk (return breaks ties) and scanned while tracking
//! the best return seen so far. A sample joins the front only if it beats that
//! return; a sample with the same risk as the last front point replaces it.
//! The resulting front is monotone in risk and return and holds no dominated
//! point. Long fronts are thinned to a point budget by even index stride,
//! keeping both endpoints.

use serde::{Deserialize, Serialize};

use crate::scorer::SimulatedPortfolio;

/// A non-dominated portfolio on the efficient frontier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontierPoint {
    /// Annualized expected return
    #[serde(rename = "return")]
    pub expected_return: f64,

    /// Annualized volatility
    pub risk: f64,

    /// Asset weights
    pub weights: Vec<f64>,
}

impl From<&SimulatedPortfolio> for FrontierPoint {
    fn from(p: &SimulatedPortfolio) -> Self {
        Self {
            expected_return: p.expected_return,
            risk: p.risk,
            weights: p.weights.clone(),
        }
    }
}

/// Extract the efficient frontier from a sample cloud, limited to `max_points`
pub fn efficient_frontier(samples: &[SimulatedPortfolio], max_points: usize) -> Vec<FrontierPoint> {
    resample(non_dominated(samples), max_points)
}

/// All non-dominated samples, ordered by ascending risk
pub fn non_dominated(samples: &[SimulatedPortfolio]) -> Vec<FrontierPoint> {
    let mut sorted: Vec<&SimulatedPortfolio> = samples
        .iter()
        .filter(|p| p.risk.is_finite() && p.expected_return.is_finite())
        .collect();
    sorted.sort_by(|a, b| {
        a.risk
            .total_cmp(&b.risk)
            .then(a.expected_return.total_cmp(&b.expected_return))
    });

    let mut front: Vec<FrontierPoint> = Vec::new();
    let mut best_return = f64::NEG_INFINITY;

    for p in sorted {
        if p.expected_return <= best_return {
            continue;
        }
        best_return = p.expected_return;

        match front.last_mut() {
            Some(last) if last.risk == p.risk => *last = p.into(),
            _ => front.push(p.into()),
        }
    }

    front
}

/// Thin a front to exactly `max_points` by even index stride, keeping endpoints
pub fn resample(front: Vec<FrontierPoint>, max_points: usize) -> Vec<FrontierPoint> {
    if front.len() <= max_points {
        return front;
    }
    if max_points < 2 {
        return front.into_iter().take(max_points).collect();
    }

    let last = front.len() - 1;
    let step = last as f64 / (max_points - 1) as f64;

    (0..max_points)
        .map(|i| {
            let idx = ((i as f64 * step).round() as usize).min(last);
            front[idx].clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(expected_return: f64, risk: f64) -> SimulatedPortfolio {
        SimulatedPortfolio {
            weights: vec![1.0],
            expected_return,
            risk,
            sharpe: 0.0,
        }
    }

    #[test]
    fn test_drops_dominated_points() {
        let samples = vec![
            sample(0.10, 0.20),
            sample(0.08, 0.25), // dominated: more risk, less return
            sample(0.12, 0.22),
            sample(0.11, 0.30), // dominated
            sample(0.15, 0.35),
        ];

        let front = non_dominated(&samples);
        let pairs: Vec<(f64, f64)> = front.iter().map(|p| (p.risk, p.expected_return)).collect();

        assert_eq!(pairs, vec![(0.20, 0.10), (0.22, 0.12), (0.35, 0.15)]);
    }

    #[test]
    fn test_equal_risk_keeps_higher_return() {
        let samples = vec![sample(0.10, 0.2), sample(0.14, 0.2), sample(0.12, 0.2)];

        let front = non_dominated(&samples);

        assert_eq!(front.len(), 1);
        assert_eq!(front[0].expected_return, 0.14);
    }

    #[test]
    fn test_empty_input() {
        assert!(efficient_frontier(&[], 60).is_empty());
    }

    #[test]
    fn test_resample_keeps_endpoints() {
        let front: Vec<FrontierPoint> = (0..100)
            .map(|i| FrontierPoint {
                expected_return: i as f64,
                risk: i as f64,
                weights: vec![1.0],
            })
            .collect();

        let thinned = resample(front, 10);

        assert_eq!(thinned.len(), 10);
        assert_eq!(thinned[0].risk, 0.0);
        assert_eq!(thinned[9].risk, 99.0);
        assert!(thinned.windows(2).all(|w| w[0].risk < w[1].risk));
    }

    #[test]
    fn test_short_front_untouched() {
        let front = vec![FrontierPoint {
            expected_return: 0.1,
            risk: 0.2,
            weights: vec![1.0],
        }];
        assert_eq!(resample(front.clone(), 60), front);
    }

    #[test]
    fn test_front_is_monotone() {
        let samples: Vec<SimulatedPortfolio> = (0..200)
            .map(|i| {
                let x = i as f64 * 0.37;
                sample(x.sin() * 0.1 + 0.1, x.cos().abs() * 0.3 + 0.05)
            })
            .collect();

        let front = efficient_frontier(&samples, 60);

        for w in front.windows(2) {
            assert!(w[0].risk < w[1].risk);
            assert!(w[0].expected_return < w[1].expected_return);
        }
    }
}
