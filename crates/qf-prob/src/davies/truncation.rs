//! Truncation error of the quadrature, the truncation-point search, and the
//! convergence factor that trades a little bias for a shorter integration range.

use std::f64::consts::{LN_2, PI};

use qf_core::Result;

use super::WeightedChiSquare;
use super::budget::IterationBudget;
use crate::math::{exp_floored, ln_1p};

/// Divisors tried, in order, to shrink a bracketed truncation point.
const TRUNCATION_DIVISORS: [f64; 4] = [2.0, 1.4, 1.2, 1.1];

/// `ln(2) / 8`
const LN_2_OVER_8: f64 = LN_2 / 8.0;

/// Above this exponent the convergence factor `2^(sum/4)` loses too much precision.
const MAX_CONVERGENCE_EXPONENT: f64 = 100.0;

impl WeightedChiSquare {
    /// Bound on the error from truncating the integral at `u`.
    ///
    /// `tau_sq` is extra Gaussian variance from a candidate convergence factor
    /// (0 for none). Returns the smaller of a ratio-based bound and a
    /// residual-mass bound. Costs one budget step.
    pub(crate) fn calculate_integration_error(
        &self,
        u: f64,
        sigma_sq: f64,
        tau_sq: f64,
        budget: &mut IterationBudget,
    ) -> Result<f64> {
        budget.step()?;
        let mut sum1 = 0.0;
        let sum2 = (sigma_sq + tau_sq) * u * u;
        let mut prod1 = 2.0 * sum2;
        let mut prod2 = 0.0;
        let mut prod3 = 0.0;
        let mut dominant_df = 0.0;
        let u2 = 2.0 * u;
        for term in &self.terms {
            let df = term.degrees_of_freedom;
            let x = (u2 * term.lambda) * (u2 * term.lambda);
            sum1 += term.noncentrality * x / (1.0 + x);
            if x > 1.0 {
                prod2 += df * x.ln();
                prod3 += df * ln_1p(x);
                dominant_df += df;
            } else {
                prod1 += df * ln_1p(x);
            }
        }
        sum1 *= 0.5;
        prod2 += prod1;
        prod3 += prod1;

        let x = exp_floored(-sum1 - 0.25 * prod2) / PI;
        let y = exp_floored(-sum1 - 0.25 * prod3) / PI;
        let ratio_bound = if dominant_df == 0.0 { 1.0 } else { 2.0 * x / dominant_df };
        let mass_bound = if prod3 > 1.0 { 2.5 * y } else { 1.0 };
        let bound = ratio_bound.min(mass_bound);

        let half_sum2 = 0.5 * sum2;
        let gaussian_bound = if half_sum2 <= y { 1.0 } else { y / half_sum2 };
        Ok(bound.min(gaussian_bound))
    }

    /// Smallest truncation point (on a coarse grid) whose integration error is
    /// at most `target`.
    ///
    /// Brackets by factors of 4 starting from `seed`, then tries each of
    /// [`TRUNCATION_DIVISORS`] against the best point found so far.
    pub(crate) fn find_truncation_point(
        &self,
        seed: f64,
        sigma_sq: f64,
        target: f64,
        budget: &mut IterationBudget,
    ) -> Result<f64> {
        let mut best = seed;
        if self.calculate_integration_error(seed / 4.0, sigma_sq, 0.0, budget)? > target {
            while self.calculate_integration_error(best, sigma_sq, 0.0, budget)? > target {
                best *= 4.0;
            }
        } else {
            best = seed / 4.0;
            let mut u = best / 4.0;
            while self.calculate_integration_error(u, sigma_sq, 0.0, budget)? <= target {
                best = u;
                u /= 4.0;
            }
        }

        for divisor in TRUNCATION_DIVISORS {
            let u = best / divisor;
            if self.calculate_integration_error(u, sigma_sq, 0.0, budget)? <= target {
                best = u;
            }
        }
        Ok(best)
    }

    /// Convergence factor for `quantile`; `tau² = k·accuracy / factor` is the
    /// damping variance that keeps the added bias below `k·accuracy`.
    ///
    /// Walks the terms from largest to smallest `|λ|`, using only those whose
    /// weight has the same sign as `quantile`. Returns `None` when the factor
    /// would be imprecise (exponent above 100) or undefined (zero effective
    /// quantile). Costs one budget step.
    pub(crate) fn calculate_convergence_factor(
        &self,
        quantile: f64,
        budget: &mut IterationBudget,
    ) -> Result<Option<f64>> {
        budget.step()?;
        let sign = if quantile > 0.0 { 1.0 } else { -1.0 };
        let mut axl = quantile.abs();
        let mut sum = 0.0;

        for (pos, &idx) in self.rank_by_abs_lambda.iter().enumerate().rev() {
            let term = &self.terms[idx];
            if term.lambda * sign <= 0.0 {
                continue;
            }
            let abs_lambda = term.lambda.abs();
            let axl1 = axl - abs_lambda * (term.degrees_of_freedom + term.noncentrality);
            let axl2 = abs_lambda / LN_2_OVER_8;
            if axl1 > axl2 {
                axl = axl1;
                continue;
            }
            if axl > axl2 {
                axl = axl2;
            }
            sum = (axl - axl1) / abs_lambda;
            sum += self.rank_by_abs_lambda[..pos]
                .iter()
                .map(|&k| self.terms[k].degrees_of_freedom + self.terms[k].noncentrality)
                .sum::<f64>();
            break;
        }

        if sum > MAX_CONVERGENCE_EXPONENT {
            log::debug!("convergence factor skipped at {}: exponent {} too large", quantile, sum);
            return Ok(None);
        }
        if axl == 0.0 {
            return Ok(None);
        }
        Ok(Some((sum / 4.0).exp2() / (PI * axl * axl)))
    }
}
