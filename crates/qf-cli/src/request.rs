//! JSON request files for `qf cdf`.

use std::path::Path;

use anyhow::{Context, Result};
use qf_core::ChiSquareTerm;
use serde::Deserialize;

/// Accuracy used when neither the request nor the command line sets one.
pub const DEFAULT_ACCURACY: f64 = 1e-6;

/// A distribution and the quantiles to evaluate it at.
///
/// ```json
/// {"terms": [{"lambda": 6.0, "df": 1.0}], "normal_coefficient": 0.0, "accuracy": 1e-6, "quantiles": [1.0, 7.0]}
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CdfRequest {
    pub terms: Vec<ChiSquareTerm>,
    #[serde(default)]
    pub normal_coefficient: f64,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub quantiles: Vec<f64>,
}

impl CdfRequest {
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("invalid request {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Command-line values win over the file.
    pub fn apply_overrides(&mut self, accuracy: Option<f64>, quantiles: &[f64]) {
        if accuracy.is_some() {
            self.accuracy = accuracy;
        }
        if !quantiles.is_empty() {
            self.quantiles = quantiles.to_vec();
        }
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy.unwrap_or(DEFAULT_ACCURACY)
    }
}
