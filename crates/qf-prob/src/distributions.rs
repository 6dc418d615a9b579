//! Scalar CDF helpers for common special cases.
//!
//! Thin wrappers that build a [`WeightedChiSquare`] for a single evaluation.
//! Callers evaluating many quantiles of one distribution should build the
//! engine once instead.

use qf_core::{ChiSquareTerm, Result};

use crate::davies::WeightedChiSquare;

/// CDF of `c·Z + Σ λ_i·X_i` at `x`.
pub fn weighted_chi_square_cdf(
    terms: &[ChiSquareTerm],
    normal_coefficient: f64,
    x: f64,
    accuracy: f64,
) -> Result<f64> {
    WeightedChiSquare::new(terms.to_vec(), normal_coefficient, accuracy)?.cdf(x)
}

/// CDF of a noncentral chi-square `χ'²(df, noncentrality)` at `x`.
pub fn noncentral_chi_square_cdf(x: f64, df: f64, noncentrality: f64, accuracy: f64) -> Result<f64> {
    weighted_chi_square_cdf(&[ChiSquareTerm::new(1.0, df, noncentrality)], 0.0, x, accuracy)
}

/// CDF of a central chi-square `χ²(df)` at `x`.
pub fn chi_square_cdf(x: f64, df: f64, accuracy: f64) -> Result<f64> {
    noncentral_chi_square_cdf(x, df, 0.0, accuracy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_chi_square_median_df2() {
        // χ²(2) median is 2·ln 2
        let p = chi_square_cdf(2.0 * std::f64::consts::LN_2, 2.0, 1e-6).unwrap();
        assert_abs_diff_eq!(p, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_noncentral_shifts_mass_right() {
        let central = chi_square_cdf(5.0, 3.0, 1e-6).unwrap();
        let shifted = noncentral_chi_square_cdf(5.0, 3.0, 2.5, 1e-6).unwrap();
        assert!(shifted < central);
    }

    #[test]
    fn test_invalid_inputs_propagate() {
        assert!(chi_square_cdf(1.0, -1.0, 1e-6).is_err());
        assert!(weighted_chi_square_cdf(&[], 1.0, 0.0, 1e-6).is_err());
        assert!(chi_square_cdf(1.0, 2.0, 0.0).is_err());
    }
}
