//! Probability engines for qf.
//!
//! This crate hosts:
//! - the Davies characteristic-function inversion for weighted sums of
//!   noncentral chi-square variables plus a normal term ([`davies`])
//! - one-liner wrappers for common special cases ([`distributions`])
//! - small numeric helpers shared by the quadrature ([`math`])

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod davies;
pub mod distributions;
pub mod math;

pub use davies::{CdfEvaluation, CdfTrace, MAX_STEPS, WeightedChiSquare};
