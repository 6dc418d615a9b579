//! Error types for qf

use thiserror::Error;

/// qf error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid input (term list, coefficients, accuracy, quantile)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Numerical evaluation did not converge within its iteration budget
    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
