//! Validation helpers for θ estimation.
//!
//! - **Option checks**: [`verify_bounds`], [`verify_tolerance`],
//!   [`verify_max_iters`].
//! - **Pattern checks**: [`validate_pattern`] rejects responses whose item
//!   parameters left the 3PL domain.
//! - **Outcome checks**: [`validate_theta_hat`] ensures the solver produced a
//!   finite estimate.
//!
//! All helpers return [`EstimationError`] variants so higher layers report
//! failures uniformly.
use crate::{
    estimation::errors::{EstimationError, EstimationResult},
    irt::Response,
};

/// Validate the closed search interval.
///
/// # Errors
/// Returns [`EstimationError::InvalidBounds`] if either end is non-finite or
/// `lower >= upper`.
pub fn verify_bounds(bounds: (f64, f64)) -> EstimationResult<()> {
    let (lower, upper) = bounds;
    if !lower.is_finite() || !upper.is_finite() {
        return Err(EstimationError::InvalidBounds {
            lower,
            upper,
            reason: "Bounds must be finite.",
        });
    }
    if lower >= upper {
        return Err(EstimationError::InvalidBounds {
            lower,
            upper,
            reason: "Lower bound must be strictly below upper bound.",
        });
    }
    Ok(())
}

/// Validate the absolute θ tolerance.
///
/// # Errors
/// Returns [`EstimationError::InvalidTolerance`] if the value is non-finite or ≤ 0.0.
pub fn verify_tolerance(tol: f64) -> EstimationResult<()> {
    if !tol.is_finite() {
        return Err(EstimationError::InvalidTolerance { tol, reason: "Tolerance must be finite." });
    }
    if tol <= 0.0 {
        return Err(EstimationError::InvalidTolerance {
            tol,
            reason: "Tolerance must be positive.",
        });
    }
    Ok(())
}

/// Validate the iteration cap.
pub fn verify_max_iters(max_iter: u64) -> EstimationResult<()> {
    if max_iter == 0 {
        return Err(EstimationError::InvalidMaxIter {
            max_iter,
            reason: "Maximum iterations must be greater than zero.",
        });
    }
    Ok(())
}

/// Validate every response's item parameters.
///
/// # Errors
/// Returns [`EstimationError::InvalidPatternItem`] for the first offending
/// position.
pub fn validate_pattern(pattern: &[Response]) -> EstimationResult<()> {
    for (index, response) in pattern.iter().enumerate() {
        response
            .params
            .validate()
            .map_err(|source| EstimationError::InvalidPatternItem { index, source })?;
    }
    Ok(())
}

/// Validate and unwrap the solver's best θ.
///
/// # Errors
/// - [`EstimationError::MissingThetaHat`] if no value was produced.
/// - [`EstimationError::InvalidThetaHat`] if the value is non-finite.
pub fn validate_theta_hat(theta_hat: Option<f64>) -> EstimationResult<f64> {
    match theta_hat {
        Some(value) if value.is_finite() => Ok(value),
        Some(value) => Err(EstimationError::InvalidThetaHat {
            value,
            reason: "Estimated theta must be finite.",
        }),
        None => Err(EstimationError::MissingThetaHat),
    }
}
