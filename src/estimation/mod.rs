//! estimation — maximum-likelihood ability estimation.
//!
//! Purpose
//! -------
//! Estimate a test taker's latent ability θ from their full answer pattern
//! under the 3PL model, together with its standard error. The estimator is
//! stateless and deterministic: the same pattern always yields the same
//! [`ThetaEstimate`].
//!
//! Key behaviors
//! -------------
//! - [`ThetaEstimator::estimate`] minimizes the pattern's negative
//!   log-likelihood over a closed interval with Brent's bounded method
//!   (`argmin`), then derives `SE = 1/√I(θ̂)`.
//! - [`EstimatorOptions`] validates bounds, tolerance and the iteration cap.
//! - [`PatternCost`] adapts a borrowed pattern to `argmin::CostFunction`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every response carries item parameters inside the 3PL domain; invalid
//!   ones are rejected with [`EstimationError::InvalidPatternItem`].
//! - Iteration-capped runs are not errors; they return `converged = false`
//!   and leave the policy decision to the caller.
//!
//! Downstream usage
//! ----------------
//! - `session::engine` re-estimates after every submission.
//! - `simulation` estimates on synthetic patterns.

pub mod adapter;
pub mod errors;
pub mod estimator;
pub mod options;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::adapter::PatternCost;
pub use self::errors::{EstimationError, EstimationResult};
pub use self::estimator::{ThetaEstimate, ThetaEstimator, confidence_interval, standard_error};
pub use self::options::{
    DEFAULT_MAX_ITERS, DEFAULT_THETA_BOUNDS, DEFAULT_TOLERANCE, EstimatorOptions,
};
