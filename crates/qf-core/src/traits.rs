//! Core traits for qf
//!
//! Callers that turn a probability into a p-value or a power estimate only
//! need a CDF; they depend on this trait rather than on a concrete engine.

use crate::Result;

/// A univariate distribution whose CDF can be evaluated numerically.
///
/// Evaluation may fail (e.g. an iterative method exhausting its budget), so
/// both methods return [`Result`].
pub trait CumulativeDistribution: Send + Sync {
    /// `P(Q <= x)`
    fn cdf(&self, x: f64) -> Result<f64>;

    /// Survival function `P(Q > x) = 1 - cdf(x)`
    fn sf(&self, x: f64) -> Result<f64> {
        Ok(1.0 - self.cdf(x)?)
    }
}
