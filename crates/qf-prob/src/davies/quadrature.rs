//! Quadrature of the inverted characteristic function.

use std::f64::consts::PI;

use super::WeightedChiSquare;
use crate::math::{exp_floored, ln_1p};

/// Result of one quadrature pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct QuadratureSum {
    /// Signed integral estimate; `cdf = 0.5 - Σ value`
    pub value: f64,
    /// `Σ 0.5·(|phase| terms)·weight`, a magnitude diagnostic only
    pub absolute_sum: f64,
}

impl WeightedChiSquare {
    /// Midpoint rule over `u_k = (k + 0.5)·interval`, `k = num_terms ..= 0`.
    ///
    /// `sigma_sq` is the working Gaussian variance of the call. With
    /// `damping_tau_sq` set, each point is multiplied by
    /// `1 - exp(-0.5·tau²·u²)` (auxiliary pass).
    pub(crate) fn integrate(
        &self,
        num_terms: usize,
        interval: f64,
        quantile: f64,
        sigma_sq: f64,
        damping_tau_sq: Option<f64>,
    ) -> QuadratureSum {
        let scale = interval / PI;
        let mut total = QuadratureSum::default();
        for k in (0..=num_terms).rev() {
            let u = (k as f64 + 0.5) * interval;
            let mut phase = -2.0 * u * quantile;
            let mut magnitude = phase.abs();
            let mut log_amplitude = -0.5 * sigma_sq * u * u;
            for term in &self.terms {
                let df = term.degrees_of_freedom;
                let x = 2.0 * term.lambda * u;
                let y = x * x;
                log_amplitude -= 0.25 * df * ln_1p(y);
                let y = term.noncentrality * x / (1.0 + y);
                let z = df * x.atan() + y;
                phase += z;
                magnitude += z.abs();
                log_amplitude -= 0.5 * x * y;
            }
            let mut weight = scale * exp_floored(log_amplitude) / u;
            if let Some(tau_sq) = damping_tau_sq {
                weight *= 1.0 - exp_floored(-0.5 * tau_sq * u * u);
            }
            total.value += (0.5 * phase).sin() * weight;
            total.absolute_sum += 0.5 * magnitude * weight;
        }
        total
    }
}
