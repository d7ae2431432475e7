//! Adapter that exposes a response pattern as an `argmin` problem.
//!
//! The cost is the pattern's negative log-likelihood `c(θ) = −ℓ(θ)`, a scalar
//! function of a scalar parameter, which is exactly the shape Brent's bounded
//! method consumes. No gradient is provided: the search is derivative-free.
use argmin::core::{CostFunction, Error};

use crate::{
    estimation::errors::EstimationError,
    irt::{Response, negative_log_likelihood},
};

/// Bridges a borrowed answer pattern to `argmin`'s `CostFunction`.
#[derive(Debug, Clone, Copy)]
pub struct PatternCost<'a> {
    pub pattern: &'a [Response],
}

impl<'a> PatternCost<'a> {
    pub fn new(pattern: &'a [Response]) -> Self {
        Self { pattern }
    }
}

impl CostFunction for PatternCost<'_> {
    type Param = f64;
    type Output = f64;

    /// Evaluate `c(θ) = −ℓ(θ)`.
    ///
    /// # Errors
    /// Returns `NonFiniteCost` if the likelihood is NaN or infinite, which can
    /// only happen for a non-finite θ since probabilities are clamped.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let value = negative_log_likelihood(*theta, self.pattern);
        if !value.is_finite() {
            return Err((EstimationError::NonFiniteCost { theta: *theta, value }).into());
        }
        Ok(value)
    }
}
