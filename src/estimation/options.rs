//! Estimator options — θ search bounds, tolerance and iteration cap.
//!
//! Purpose
//! -------
//! Bundle the knobs of the bounded θ search in one validated value so that
//! the estimator can assume a well-formed interval and positive tolerances.
//!
//! Invariants & assumptions
//! ------------------------
//! - `lower < upper`, both finite.
//! - `tolerance` is finite and `> 0`; it is the absolute θ tolerance handed
//!   to Brent's method, paired with a relative tolerance of `√ε_mach`.
//! - `max_iters > 0`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the defaults and each rejection path of
//!   [`EstimatorOptions::new`].
use serde::{Deserialize, Serialize};

use crate::estimation::{
    errors::EstimationResult,
    validation::{verify_bounds, verify_max_iters, verify_tolerance},
};

/// Default closed search interval for θ.
pub const DEFAULT_THETA_BOUNDS: (f64, f64) = (-4.0, 4.0);

/// Default absolute θ tolerance for the bounded search.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Default iteration cap for the bounded search.
pub const DEFAULT_MAX_ITERS: u64 = 500;

/// Validated configuration of the θ search.
///
/// Fields
/// ------
/// - `bounds`: `(lower, upper)` closed interval searched for θ̂.
/// - `tolerance`: absolute tolerance on θ̂.
/// - `max_iters`: hard cap on solver iterations; hitting it yields an
///   estimate with `converged = false`.
///
/// Default
/// -------
/// - `bounds = (-4, 4)`, `tolerance = 1e-6`, `max_iters = 500`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorOptions {
    pub bounds: (f64, f64),
    pub tolerance: f64,
    pub max_iters: u64,
}

impl EstimatorOptions {
    /// Construct validated estimator options.
    ///
    /// # Errors
    /// - `EstimationError::InvalidBounds` for non-finite or unordered bounds.
    /// - `EstimationError::InvalidTolerance` for non-finite or non-positive tolerance.
    /// - `EstimationError::InvalidMaxIter` if `max_iters == 0`.
    pub fn new(bounds: (f64, f64), tolerance: f64, max_iters: u64) -> EstimationResult<Self> {
        let opts = Self { bounds, tolerance, max_iters };
        opts.validate()?;
        Ok(opts)
    }

    /// Re-check invariants, e.g. after deserialization.
    pub fn validate(&self) -> EstimationResult<()> {
        verify_bounds(self.bounds)?;
        verify_tolerance(self.tolerance)?;
        verify_max_iters(self.max_iters)?;
        Ok(())
    }

    /// Lower end of the search interval.
    pub fn lower(&self) -> f64 {
        self.bounds.0
    }

    /// Upper end of the search interval.
    pub fn upper(&self) -> f64 {
        self.bounds.1
    }
}

impl Default for EstimatorOptions {
    fn default() -> Self {
        Self {
            bounds: DEFAULT_THETA_BOUNDS,
            tolerance: DEFAULT_TOLERANCE,
            max_iters: DEFAULT_MAX_ITERS,
        }
    }
}
