//! Maximum-likelihood θ estimation with a bounded Brent search.
//!
//! Purpose
//! -------
//! Turn a full answer pattern into a point estimate θ̂ and its standard
//! error. The estimator is a pure function of the pattern and its options:
//! no session state leaks in, so re-estimating the same pattern always gives
//! the same result.
//!
//! Key behaviors
//! -------------
//! - An empty pattern returns the prior `{θ = 0, SE = 1, converged = false}`
//!   without touching the optimizer.
//! - Otherwise the negative log-likelihood is minimized over the closed
//!   bounds with `argmin`'s `BrentOpt`, which needs no derivatives and
//!   tolerates the flat or multi-modal surfaces short 3PL patterns produce.
//! - `SE = 1/√I(θ̂)` with `I` the summed item information; a zero or
//!   non-finite total falls back to `SE = 1`.
//! - `converged` mirrors whether the solver terminated with
//!   `SolverConverged`; an iteration-capped run is reported, not raised.
//!
//! Invariants & assumptions
//! ------------------------
//! - θ̂ always lies inside the configured bounds.
//! - `se > 0` and finite for every returned estimate.
//!
//! Downstream usage
//! ----------------
//! - The session engine calls [`ThetaEstimator::estimate`] on every
//!   submission and decides how to treat `converged = false`.
//! - Simulation and reporting reuse [`standard_error`] and
//!   [`ThetaEstimate::confidence_interval`].
use argmin::{
    core::{Executor, State, TerminationReason},
    solver::brent::BrentOpt,
};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::{
    estimation::{
        adapter::PatternCost,
        errors::{EstimationError, EstimationResult},
        options::EstimatorOptions,
        validation::{validate_pattern, validate_theta_hat},
    },
    irt::{Response, total_information},
};

/// Point estimate of ability with its standard error.
///
/// - `theta`: θ̂ inside the search bounds.
/// - `se`: standard error, strictly positive.
/// - `converged`: `true` iff the solver reported convergence.
/// - `iterations`: solver iterations performed (0 for the prior).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThetaEstimate {
    pub theta: f64,
    pub se: f64,
    pub converged: bool,
    pub iterations: u64,
}

impl ThetaEstimate {
    /// Estimate before any evidence: `θ = 0`, `SE = 1`, not converged.
    pub fn prior() -> Self {
        Self { theta: 0.0, se: 1.0, converged: false, iterations: 0 }
    }

    /// Two-sided normal-approximation interval `θ̂ ± z·SE`.
    ///
    /// # Errors
    /// - [`EstimationError::InvalidConfidenceLevel`] unless `0 < level < 1`.
    pub fn confidence_interval(&self, level: f64) -> EstimationResult<(f64, f64)> {
        confidence_interval(self.theta, self.se, level)
    }
}

/// Normal-approximation interval around `theta` with standard error `se`.
pub fn confidence_interval(theta: f64, se: f64, level: f64) -> EstimationResult<(f64, f64)> {
    if !(level > 0.0 && level < 1.0) {
        return Err(EstimationError::InvalidConfidenceLevel {
            level,
            reason: "Confidence level must lie strictly between 0 and 1.",
        });
    }
    let standard_normal =
        Normal::new(0.0, 1.0).map_err(|e| EstimationError::Distribution { text: e.to_string() })?;
    let z = standard_normal.inverse_cdf(0.5 + level / 2.0);
    Ok((theta - z * se, theta + z * se))
}

/// Standard error `1/√I(θ)` of a pattern at `theta`, or `1.0` when the total
/// information is zero or not finite.
pub fn standard_error(theta: f64, pattern: &[Response]) -> f64 {
    let info = total_information(theta, pattern.iter().map(|response| &response.params));
    if info > 0.0 && info.is_finite() { 1.0 / info.sqrt() } else { 1.0 }
}

/// Stateless maximum-likelihood θ estimator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ThetaEstimator {
    options: EstimatorOptions,
}

impl ThetaEstimator {
    /// Build an estimator from validated options.
    ///
    /// # Errors
    /// Propagates [`EstimatorOptions::validate`] failures.
    pub fn new(options: EstimatorOptions) -> EstimationResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &EstimatorOptions {
        &self.options
    }

    /// Estimate θ from a full answer pattern.
    ///
    /// # Behavior
    /// 1. Empty pattern → [`ThetaEstimate::prior`].
    /// 2. Validate every item's parameters.
    /// 3. Run Brent's bounded search on the negative log-likelihood.
    /// 4. Derive SE from total information at θ̂.
    ///
    /// # Errors
    /// - `InvalidPatternItem` for out-of-domain item parameters.
    /// - Backend and outcome errors from the solver (`NonFiniteCost`,
    ///   `MissingThetaHat`, argmin wrappers).
    pub fn estimate(&self, pattern: &[Response]) -> EstimationResult<ThetaEstimate> {
        if pattern.is_empty() {
            return Ok(ThetaEstimate::prior());
        }
        validate_pattern(pattern)?;

        let (lower, upper) = self.options.bounds;
        let solver = BrentOpt::new(lower, upper)
            .set_tolerance(f64::EPSILON.sqrt(), self.options.tolerance);
        let max_iters = self.options.max_iters;
        let result = Executor::new(PatternCost::new(pattern), solver)
            .configure(|state| state.max_iters(max_iters))
            .run()?;

        let state = result.state();
        let converged =
            matches!(state.get_termination_reason(), Some(TerminationReason::SolverConverged));
        let iterations = state.get_iter();
        let theta = validate_theta_hat(state.get_best_param().copied())?.clamp(lower, upper);
        let se = standard_error(theta, pattern);

        Ok(ThetaEstimate { theta, se, converged, iterations })
    }
}
