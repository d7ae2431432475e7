//! Error surface for θ estimation.
//!
//! [`EstimationError`] normalizes configuration mistakes, invalid item
//! parameters in a pattern, non-finite likelihood values and `argmin`
//! backend failures into one enum. Callers never see raw Argmin errors.
//!
//! Non-convergence is **not** an error: a run that stops without the solver
//! reporting convergence still returns a `ThetaEstimate` with
//! `converged = false`.
use argmin::core::{ArgminError, Error};
use thiserror::Error;

use crate::irt::ParamError;

/// Result alias for estimator operations.
pub type EstimationResult<T> = Result<T, EstimationError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    // ---- EstimatorOptions ----
    /// Search bounds must be finite with `lower < upper`.
    #[error("Invalid theta bounds ({lower}, {upper}): {reason}")]
    InvalidBounds { lower: f64, upper: f64, reason: &'static str },

    /// Absolute tolerance must be finite and strictly positive.
    #[error("Invalid tolerance {tol}: {reason}")]
    InvalidTolerance { tol: f64, reason: &'static str },

    /// Iteration cap must be positive.
    #[error("Invalid maximum iterations {max_iter}: {reason}")]
    InvalidMaxIter { max_iter: u64, reason: &'static str },

    /// Confidence level must lie strictly between 0 and 1.
    #[error("Invalid confidence level {level}: {reason}")]
    InvalidConfidenceLevel { level: f64, reason: &'static str },

    // ---- Pattern ----
    /// A response in the pattern carried out-of-domain item parameters.
    #[error("Invalid item parameters at position {index}: {source}")]
    InvalidPatternItem { index: usize, source: ParamError },

    // ---- Cost function ----
    /// The negative log-likelihood evaluated to NaN or ±∞.
    #[error("Non-finite cost {value} at theta {theta}")]
    NonFiniteCost { theta: f64, value: f64 },

    // ---- Optimizer outcome ----
    /// Solver finished without a best parameter.
    #[error("Missing estimated theta")]
    MissingThetaHat,

    /// Estimated θ must be finite.
    #[error("Invalid estimated theta {value}: {reason}")]
    InvalidThetaHat { value: f64, reason: &'static str },

    // ---- Argmin ----
    /// Wrapper for argmin::InvalidParameter
    #[error("Invalid parameter: {text}")]
    InvalidParameter { text: String },
    /// Wrapper for argmin::NotImplemented
    #[error("Not implemented: {text}")]
    NotImplemented { text: String },
    /// Wrapper for argmin::NotInitialized
    #[error("Not initialized: {text}")]
    NotInitialized { text: String },
    /// Wrapper for argmin::ConditionViolated
    #[error("Condition violated: {text}")]
    ConditionViolated { text: String },
    /// Wrapper for argmin::PotentialBug
    #[error("Potential bug: {text}")]
    PotentialBug { text: String },
    /// Wrapper for any other backend error
    #[error("Backend error: {text}")]
    BackendError { text: String },

    // ---- Distributions ----
    /// statrs rejected a distribution parameterization.
    #[error("Distribution error: {text}")]
    Distribution { text: String },
}

impl From<Error> for EstimationError {
    fn from(original_err: Error) -> Self {
        let original_err = match original_err.downcast::<EstimationError>() {
            Ok(own) => return own,
            Err(err) => err,
        };
        match original_err.downcast::<ArgminError>() {
            Ok(argmin_err) => match argmin_err {
                ArgminError::InvalidParameter { text } => EstimationError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => EstimationError::NotImplemented { text },
                ArgminError::NotInitialized { text } => EstimationError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => {
                    EstimationError::ConditionViolated { text }
                }
                ArgminError::PotentialBug { text } => EstimationError::PotentialBug { text },
                other => EstimationError::BackendError { text: other.to_string() },
            },
            Err(err) => EstimationError::BackendError { text: err.to_string() },
        }
    }
}
