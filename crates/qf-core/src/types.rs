//! Common data types for qf

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One component `λ·X` of a weighted sum, with `X ~ χ'²(df, ω)`.
///
/// Serialized as `{"lambda": .., "df": .., "noncentrality": ..}`; a missing
/// `noncentrality` means a central chi-square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareTerm {
    /// Weight applied to the chi-square variable
    pub lambda: f64,

    /// Degrees of freedom (`>= 0`)
    #[serde(rename = "df")]
    pub degrees_of_freedom: f64,

    /// Noncentrality parameter (`>= 0`)
    #[serde(default)]
    pub noncentrality: f64,
}

impl ChiSquareTerm {
    /// Create a new weighted noncentral chi-square term
    pub fn new(lambda: f64, degrees_of_freedom: f64, noncentrality: f64) -> Self {
        Self { lambda, degrees_of_freedom, noncentrality }
    }

    /// Create a weighted central chi-square term
    pub fn central(lambda: f64, degrees_of_freedom: f64) -> Self {
        Self::new(lambda, degrees_of_freedom, 0.0)
    }

    /// Contribution `λ·(df + ω)` of this term to the mean of the sum
    pub fn mean(&self) -> f64 {
        self.lambda * (self.degrees_of_freedom + self.noncentrality)
    }

    /// Contribution `λ²·(2·df + 4·ω)` of this term to the variance of the sum
    pub fn variance(&self) -> f64 {
        self.lambda * self.lambda * (2.0 * self.degrees_of_freedom + 4.0 * self.noncentrality)
    }

    /// Check that the weight is finite and that df / noncentrality are finite and `>= 0`.
    pub fn validate(&self) -> Result<()> {
        if !self.lambda.is_finite() {
            return Err(Error::Validation(format!("lambda must be finite, got {}", self.lambda)));
        }
        if !self.degrees_of_freedom.is_finite() || self.degrees_of_freedom < 0.0 {
            return Err(Error::Validation(format!(
                "degrees of freedom must be finite and >= 0, got {}",
                self.degrees_of_freedom
            )));
        }
        if !self.noncentrality.is_finite() || self.noncentrality < 0.0 {
            return Err(Error::Validation(format!(
                "noncentrality must be finite and >= 0, got {}",
                self.noncentrality
            )));
        }
        Ok(())
    }
}
