//! Iteration budget shared by every search inside one CDF evaluation.

use qf_core::{Error, Result};

/// Default step ceiling for one evaluation.
pub const MAX_STEPS: usize = 200_000;

/// Counts work done by one `cdf` call and fails once a hard ceiling is passed.
///
/// Each bound/error evaluation costs one step; each quadrature pass reserves
/// as many steps as it has evaluation points. A fresh budget is created per
/// call, so evaluations never share a counter.
#[derive(Debug, Clone)]
pub struct IterationBudget {
    count: usize,
    max_steps: usize,
}

impl IterationBudget {
    /// Create an empty budget with the given ceiling.
    pub fn new(max_steps: usize) -> Self {
        Self { count: 0, max_steps }
    }

    /// Steps consumed so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Steps still available before the ceiling.
    pub fn remaining(&self) -> usize {
        self.max_steps.saturating_sub(self.count)
    }

    /// Consume one step.
    pub fn step(&mut self) -> Result<()> {
        self.count += 1;
        if self.count > self.max_steps {
            return Err(Error::Computation(format!(
                "exceeded maximum of {} iteration steps",
                self.max_steps
            )));
        }
        Ok(())
    }

    /// Fail unless `n` more steps fit in the budget; consumes nothing.
    pub fn check(&self, n: usize, what: &str) -> Result<()> {
        if n > self.remaining() {
            return Err(Error::Computation(format!(
                "{} needs {} terms but only {} of {} iteration steps remain",
                what,
                n,
                self.remaining(),
                self.max_steps
            )));
        }
        Ok(())
    }

    /// Reserve `n` steps for a quadrature pass, failing if they do not fit.
    pub fn reserve(&mut self, n: usize, what: &str) -> Result<()> {
        self.check(n, what)?;
        self.count += n;
        Ok(())
    }
}
