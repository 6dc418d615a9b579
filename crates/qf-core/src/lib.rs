//! # qf-core
//!
//! Shared building blocks for the qf workspace.
//!
//! This crate holds what every other crate agrees on:
//! - the [`Error`] type and [`Result`] alias
//! - the [`ChiSquareTerm`] value type describing one weighted chi-square component
//! - the [`CumulativeDistribution`] trait implemented by distribution engines
//!
//! It knows nothing about how a CDF is evaluated; `qf-prob` does.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Error types.
pub mod error;
/// Distribution traits.
pub mod traits;
/// Common value types.
pub mod types;

pub use error::{Error, Result};
pub use traits::CumulativeDistribution;
pub use types::ChiSquareTerm;

/// Workspace version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
