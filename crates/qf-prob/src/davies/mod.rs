//! Distribution of a weighted sum of noncentral chi-square variables.
//!
//! `Q = c·Z + Σ λ_i·X_i` with `Z ~ N(0, 1)` and `X_i ~ χ'²(df_i, ω_i)`, all
//! independent. The CDF has no closed form; it is obtained by numerically
//! inverting the characteristic function (Davies 1980, "The distribution of a
//! linear combination of χ² random variables", Applied Statistics AS 155).
//!
//! One evaluation runs, in order:
//! 1. a truncation-point search for the quadrature,
//! 2. an optional convergence factor (extra Gaussian damping),
//! 3. a support search with a Chernoff tail bound, returning `0`/`1` outside
//!    the effective support,
//! 4. optional auxiliary integrations, then the main quadrature.
//!
//! All nested searches draw from one iteration budget created per call; its
//! ceiling is [`MAX_STEPS`] unless overridden with
//! [`WeightedChiSquare::with_max_steps`].

use std::f64::consts::PI;

use qf_core::{ChiSquareTerm, CumulativeDistribution, Error, Result};
use serde::Serialize;

pub(crate) mod bound;
pub(crate) mod budget;
mod quadrature;
mod truncation;

use budget::IterationBudget;
pub use budget::MAX_STEPS;

/// Coefficient of the normal term used by [`WeightedChiSquare::from_terms`].
pub const DEFAULT_NORMAL_COEFFICIENT: f64 = 0.0;

/// Below this ratio of `max |λ|` to the standard deviation, a zero quantile
/// gets no convergence factor.
const CONVERGENCE_FACTOR_MIN_LAMBDA_RATIO: f64 = 0.07;

/// Diagnostics collected during one CDF evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CdfTrace {
    /// Sum of absolute values of the integrand contributions. Reported only;
    /// never folded into the probability.
    pub absolute_sum: f64,
    /// Total number of quadrature terms over all integrations.
    pub integration_terms: usize,
    /// Number of quadrature passes (auxiliary + main).
    pub integrations: usize,
    /// Spacing of the main quadrature.
    pub integration_interval: f64,
    /// Final truncation point `U`.
    pub truncation_point: f64,
    /// Standard deviation of the Gaussian damping added by convergence factors.
    pub convergence_sd: f64,
    /// Iteration-budget steps consumed.
    pub cycles: usize,
}

/// Probability together with the diagnostics of the run that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CdfEvaluation {
    /// `P(Q <= quantile)`
    pub probability: f64,
    /// Diagnostics
    pub trace: CdfTrace,
}

/// Distribution engine for `Q = c·Z + Σ λ_i·X_i`.
///
/// Built once from the term list; immutable afterwards. Every call to
/// [`cdf`](Self::cdf) keeps its working state (variance, accuracy, budget)
/// local, so calls are independent of each other and of call order.
#[derive(Debug, Clone)]
pub struct WeightedChiSquare {
    terms: Vec<ChiSquareTerm>,
    normal_coefficient: f64,
    accuracy: f64,
    /// `max(0, max λ)`
    max_lambda: f64,
    /// `min(0, min λ)`
    min_lambda: f64,
    max_abs_lambda: f64,
    /// Term indices, ascending by `|λ|`, ties in insertion order.
    rank_by_abs_lambda: Vec<usize>,
    max_steps: usize,
}

impl WeightedChiSquare {
    /// Create a distribution for the given terms.
    ///
    /// - `terms`: non-empty; every term needs a finite `λ` and finite, non-negative df and noncentrality
    /// - `normal_coefficient`: finite coefficient `c` of the standard-normal term (may be 0)
    /// - `accuracy`: in `(0, 1)`; maximum absolute error of the returned probabilities
    ///
    /// A distribution with all `λ` and `c` equal to zero is rejected.
    pub fn new(terms: Vec<ChiSquareTerm>, normal_coefficient: f64, accuracy: f64) -> Result<Self> {
        if terms.is_empty() {
            return Err(Error::Validation("No chi-square terms specified".to_string()));
        }
        if !normal_coefficient.is_finite() {
            return Err(Error::Validation(format!(
                "coefficient of the normal term must be finite, got {}",
                normal_coefficient
            )));
        }
        if !accuracy.is_finite() || accuracy <= 0.0 || accuracy >= 1.0 {
            return Err(Error::Validation(format!(
                "accuracy must lie in (0, 1), got {}",
                accuracy
            )));
        }
        for (i, term) in terms.iter().enumerate() {
            if let Err(e) = term.validate() {
                let msg = match e {
                    Error::Validation(msg) => msg,
                    other => other.to_string(),
                };
                return Err(Error::Validation(format!("term {}: {}", i, msg)));
            }
        }

        let max_lambda = terms.iter().map(|t| t.lambda).fold(0.0, f64::max);
        let min_lambda = terms.iter().map(|t| t.lambda).fold(0.0, f64::min);
        if max_lambda == 0.0 && min_lambda == 0.0 && normal_coefficient == 0.0 {
            return Err(Error::Validation(
                "at least one lambda or the coefficient of the normal term must be non-zero"
                    .to_string(),
            ));
        }
        let max_abs_lambda = max_lambda.max(-min_lambda);

        let mut rank_by_abs_lambda: Vec<usize> = (0..terms.len()).collect();
        rank_by_abs_lambda.sort_by(|&a, &b| terms[a].lambda.abs().total_cmp(&terms[b].lambda.abs()));

        Ok(Self {
            terms,
            normal_coefficient,
            accuracy,
            max_lambda,
            min_lambda,
            max_abs_lambda,
            rank_by_abs_lambda,
            max_steps: MAX_STEPS,
        })
    }

    /// Create a distribution without a normal term.
    pub fn from_terms(terms: Vec<ChiSquareTerm>, accuracy: f64) -> Result<Self> {
        Self::new(terms, DEFAULT_NORMAL_COEFFICIENT, accuracy)
    }

    /// Override the per-call iteration ceiling (default [`MAX_STEPS`]).
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Chi-square terms, in insertion order.
    pub fn terms(&self) -> &[ChiSquareTerm] {
        &self.terms
    }

    /// Coefficient of the standard-normal term.
    pub fn normal_coefficient(&self) -> f64 {
        self.normal_coefficient
    }

    /// Requested accuracy.
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Per-call iteration ceiling.
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Largest weight, clamped below at 0.
    pub fn max_lambda(&self) -> f64 {
        self.max_lambda
    }

    /// Smallest weight, clamped above at 0.
    pub fn min_lambda(&self) -> f64 {
        self.min_lambda
    }

    /// Largest absolute weight.
    pub fn max_abs_lambda(&self) -> f64 {
        self.max_abs_lambda
    }

    /// Term indices sorted ascending by `|λ|`.
    pub fn rank_by_abs_lambda(&self) -> &[usize] {
        &self.rank_by_abs_lambda
    }

    /// `E[Q] = Σ λ_i (df_i + ω_i)`
    pub fn mean(&self) -> f64 {
        self.terms.iter().map(ChiSquareTerm::mean).sum()
    }

    /// `Var[Q] = c² + Σ λ_i² (2 df_i + 4 ω_i)`
    pub fn variance(&self) -> f64 {
        let c_sq = self.normal_coefficient * self.normal_coefficient;
        c_sq + self.terms.iter().map(ChiSquareTerm::variance).sum::<f64>()
    }

    /// `P(Q <= quantile)`, accurate to within the configured accuracy.
    ///
    /// Fails with [`Error::Computation`] when the iteration budget runs out
    /// and with [`Error::Validation`] for a NaN quantile.
    pub fn cdf(&self, quantile: f64) -> Result<f64> {
        Ok(self.cdf_with_trace(quantile)?.probability)
    }

    /// Like [`cdf`](Self::cdf), also returning the run's diagnostics.
    pub fn cdf_with_trace(&self, quantile: f64) -> Result<CdfEvaluation> {
        if quantile.is_nan() {
            return Err(Error::Validation("quantile must not be NaN".to_string()));
        }
        let mut trace = CdfTrace::default();
        if quantile.is_infinite() {
            let probability = if quantile > 0.0 { 1.0 } else { 0.0 };
            return Ok(CdfEvaluation { probability, trace });
        }

        let mean = self.mean();
        let variance = self.variance();
        // All mass sits at the origin.
        if variance == 0.0 {
            let probability = if quantile == 0.0 { 1.0 } else { 0.0 };
            return Ok(CdfEvaluation { probability, trace });
        }
        let sd = variance.sqrt();

        let mut budget = IterationBudget::new(self.max_steps);
        let result = self.evaluate(quantile, mean, sd, &mut budget, &mut trace);
        trace.cycles = budget.count();
        match result {
            Ok(probability) => {
                log::debug!(
                    "weighted chi-square cdf: quantile={} probability={} steps={} terms={} U={}",
                    quantile,
                    probability,
                    trace.cycles,
                    trace.integration_terms,
                    trace.truncation_point
                );
                Ok(CdfEvaluation { probability, trace })
            }
            Err(e) => {
                log::warn!("weighted chi-square cdf at {} did not converge: {}", quantile, e);
                Err(e)
            }
        }
    }

    fn evaluate(
        &self,
        quantile: f64,
        mean: f64,
        sd: f64,
        budget: &mut IterationBudget,
        trace: &mut CdfTrace,
    ) -> Result<f64> {
        // Working variance of the Gaussian part; grows when convergence factors are folded in.
        let mut sigma_sq = self.normal_coefficient * self.normal_coefficient;
        let mut folded_tau_sq = 0.0;
        let mut accuracy = self.accuracy;

        let mut u = self.find_truncation_point(16.0 / sd, sigma_sq, 0.5 * accuracy, budget)?;

        if quantile != 0.0 || self.max_abs_lambda > CONVERGENCE_FACTOR_MIN_LAMBDA_RATIO * sd {
            if let Some(factor) = self.calculate_convergence_factor(quantile, budget)? {
                let tau_sq = 0.25 * accuracy / factor;
                if self.calculate_integration_error(u, sigma_sq, tau_sq, budget)? < 0.2 * accuracy {
                    sigma_sq += tau_sq;
                    folded_tau_sq += tau_sq;
                    u = self.find_truncation_point(u, sigma_sq, 0.25 * accuracy, budget)?;
                }
            }
        }
        trace.truncation_point = u;
        trace.convergence_sd = folded_tau_sq.sqrt();
        accuracy *= 0.5;

        let mut upper_seed = 4.5 / sd;
        let mut lower_seed = -upper_seed;
        let mut integral = 0.0;

        let (num_terms, interval) = loop {
            let (upper, seed) =
                self.find_cutoff_point(upper_seed, mean, sigma_sq, accuracy, budget)?;
            upper_seed = seed;
            let upper_gap = upper - quantile;
            if upper_gap <= 0.0 {
                return Ok(1.0);
            }

            let (lower, seed) =
                self.find_cutoff_point(lower_seed, mean, sigma_sq, accuracy, budget)?;
            lower_seed = seed;
            let lower_gap = quantile - lower;
            if lower_gap <= 0.0 {
                return Ok(0.0);
            }

            let interval = 2.0 * PI / upper_gap.max(lower_gap);
            let num_terms_main = u / interval;
            let num_terms_aux = 3.0 / accuracy.sqrt();
            if num_terms_main <= 1.5 * num_terms_aux {
                break (num_terms_main, interval);
            }

            // The main pass would be long: an auxiliary pass with a coarser grid
            // lets the truncation point shrink.
            let n_aux = num_terms_aux.round() as usize;
            budget.check(n_aux, "auxiliary integration")?;
            let interval_aux = u / n_aux as f64;
            let limit = 2.0 * PI / interval_aux;
            if limit <= quantile.abs() {
                break (num_terms_main, interval);
            }
            let below = self.calculate_convergence_factor(quantile - limit, budget)?;
            let above = self.calculate_convergence_factor(quantile + limit, budget)?;
            let (Some(below), Some(above)) = (below, above) else {
                break (num_terms_main, interval);
            };
            let tau_sq = 0.33 * accuracy / (1.1 * (below + above));
            accuracy *= 0.67;

            budget.reserve(n_aux, "auxiliary integration")?;
            let pass = self.integrate(n_aux, interval_aux, quantile, sigma_sq, Some(tau_sq));
            integral += pass.value;
            trace.absolute_sum += pass.absolute_sum;
            trace.integration_terms += n_aux;
            trace.integrations += 1;

            sigma_sq += tau_sq;
            folded_tau_sq += tau_sq;
            u = self.find_truncation_point(u, sigma_sq, 0.25 * accuracy, budget)?;
            accuracy *= 0.75;
            trace.truncation_point = u;
            trace.convergence_sd = folded_tau_sq.sqrt();
        };

        let n_main = num_terms.round() as usize;
        budget.reserve(n_main, "main integration")?;
        let pass = self.integrate(n_main, interval, quantile, sigma_sq, None);
        integral += pass.value;
        trace.absolute_sum += pass.absolute_sum;
        trace.integration_terms += n_main;
        trace.integrations += 1;
        trace.integration_interval = interval;

        Ok(0.5 - integral)
    }
}

impl CumulativeDistribution for WeightedChiSquare {
    fn cdf(&self, x: f64) -> Result<f64> {
        WeightedChiSquare::cdf(self, x)
    }
}
