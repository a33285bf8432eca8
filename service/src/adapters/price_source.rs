//! Price source trait and fetched history
//!
//! This module defines the PriceSource trait that every history provider
//! implements. The analysis service only talks to this trait, so providers can
//! be swapped or mocked.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use frontier_optimizer::PriceSeries;

use crate::error::ServiceResult;

/// Price source trait
///
/// Implementations must be shareable across tasks: the service fetches every
/// ticker of a request concurrently from one source.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &str;

    /// Fetch daily close prices covering the last `years` years
    ///
    /// # Arguments
    /// * `ticker` - Upper-case ticker symbol
    /// * `years` - Requested history span
    ///
    /// # Returns
    /// * `Ok(PriceHistory)` - At least the provider's minimum number of valid closes
    /// * `Err(ServiceError)` - Unknown ticker, provider failure or too little data
    async fn fetch_history(&self, ticker: &str, years: u32) -> ServiceResult<PriceHistory>;
}

/// Close prices returned by a source, with coverage information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    /// Valid closes in chronological order
    pub series: PriceSeries,

    /// True when the covered span falls short of the requested one
    pub partial: bool,

    /// Requested span in years
    pub years_requested: u32,

    /// Span actually covered, in years
    pub years_available: f64,
}

impl PriceHistory {
    /// Build a history and derive coverage from the series dates
    ///
    /// The span is flagged as partial when it covers less than
    /// `tolerance * years_requested` years. A series without dates is
    /// assumed to cover the requested span.
    pub fn new(series: PriceSeries, years_requested: u32, tolerance: f64) -> Self {
        let years_available = match series.date_range() {
            Some((first, last)) => (last - first).num_seconds() as f64 / SECONDS_PER_YEAR,
            None => f64::from(years_requested),
        };
        let partial = years_available < tolerance * f64::from(years_requested);

        Self {
            series,
            partial,
            years_requested,
            years_available,
        }
    }

    /// Warning shown to the caller when the history is partial
    pub fn partial_warning(&self) -> Option<String> {
        self.partial.then(|| {
            format!(
                "{}: only ~{:.1} years of data available (requested {} years), using available data",
                self.series.ticker, self.years_available, self.years_requested
            )
        })
    }
}

const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;
