//! Chernoff-type tail bound and the cutoff (support edge) search built on it.

use qf_core::Result;

use super::WeightedChiSquare;
use super::budget::IterationBudget;
use crate::math::{exp_floored, ln_1p_minus_x};

/// Stop bisecting once `(c1 - mean) / (c2 - mean)` reaches this ratio.
const CUTOFF_BRACKET_RATIO: f64 = 0.9;

/// Exponential bound on a tail probability, with the cutoff it applies to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailProbabilityBound {
    /// Upper bound on `P(Q > cutoff)` (or `P(Q < cutoff)` for negative `u`)
    pub bound: f64,
    /// Point of the distribution the bound refers to
    pub cutoff: f64,
}

impl WeightedChiSquare {
    /// Chernoff bound at moment-generating-function argument `u`.
    ///
    /// Costs one budget step. `u` must keep every `2uλ` below 1, which the
    /// cutoff search guarantees by mapping its search variable through
    /// `u / (1 + u·rb)`.
    pub(crate) fn find_tail_probability_bound(
        &self,
        u: f64,
        sigma_sq: f64,
        budget: &mut IterationBudget,
    ) -> Result<TailProbabilityBound> {
        budget.step()?;
        let mut cutoff = u * sigma_sq;
        let mut sum = u * cutoff;
        let u2 = 2.0 * u;
        for term in &self.terms {
            let df = term.degrees_of_freedom;
            let nc = term.noncentrality;
            let x = u2 * term.lambda;
            let y = 1.0 - x;
            cutoff += term.lambda * (nc / y + df) / y;
            sum += nc * (x / y) * (x / y) + df * (x * x / y + ln_1p_minus_x(-x));
        }
        Ok(TailProbabilityBound { bound: exp_floored(-0.5 * sum), cutoff })
    }

    /// Find the point where the tail bound first drops below `accuracy`.
    ///
    /// A positive `seed` searches the upper tail, a negative one the lower
    /// tail. Doubles the search variable until the bound is small enough, then
    /// bisects until the bracketing cutoffs agree to within
    /// [`CUTOFF_BRACKET_RATIO`]. Returns `(cutoff, seed)`; the seed can start
    /// the next search of the same tail.
    pub(crate) fn find_cutoff_point(
        &self,
        seed: f64,
        mean: f64,
        sigma_sq: f64,
        accuracy: f64,
        budget: &mut IterationBudget,
    ) -> Result<(f64, f64)> {
        let mut u2 = seed;
        let mut u1 = 0.0;
        let mut c1 = mean;
        let rb = 2.0 * if u2 > 0.0 { self.max_lambda } else { self.min_lambda };

        let mut tail = self.find_tail_probability_bound(u2 / (1.0 + u2 * rb), sigma_sq, budget)?;
        while tail.bound > accuracy {
            u1 = u2;
            c1 = tail.cutoff;
            u2 *= 2.0;
            tail = self.find_tail_probability_bound(u2 / (1.0 + u2 * rb), sigma_sq, budget)?;
        }
        let mut c2 = tail.cutoff;

        let mut ratio = (c1 - mean) / (c2 - mean);
        while ratio < CUTOFF_BRACKET_RATIO {
            let u = 0.5 * (u1 + u2);
            let tail = self.find_tail_probability_bound(u / (1.0 + u * rb), sigma_sq, budget)?;
            if tail.bound > accuracy {
                u1 = u;
                c1 = tail.cutoff;
            } else {
                u2 = u;
                c2 = tail.cutoff;
            }
            ratio = (c1 - mean) / (c2 - mean);
        }
        Ok((c2, u2))
    }
}
