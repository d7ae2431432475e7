//! Errors for item calibration parameters and item content.
//!
//! A single enum, [`ParamError`], covers every way an item can be rejected
//! before it reaches the estimator or the selector: 3PL parameters outside
//! their domain and malformed answer options.
//!
//! ## Conventions
//! - Option indices are **0-based**.
//! - Variants carry the offending value and a short static `reason` so the
//!   caller can report exactly what failed.
use thiserror::Error;

/// Result alias for parameter validation.
pub type ParamResult<T> = Result<T, ParamError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    // ---- 3PL parameters ----
    /// Discrimination `a` must be finite and strictly positive.
    #[error("Invalid discrimination {value}: {reason}")]
    InvalidDiscrimination { value: f64, reason: &'static str },

    /// Difficulty `b` must be finite.
    #[error("Invalid difficulty {value}: {reason}")]
    InvalidDifficulty { value: f64, reason: &'static str },

    /// Guessing `c` must lie in `[0, 1)`.
    #[error("Invalid guessing {value}: {reason}")]
    InvalidGuessing { value: f64, reason: &'static str },

    // ---- Item content ----
    /// An item needs at least one answer option.
    #[error("Item has no answer options")]
    NoOptions,

    /// The keyed answer must index into the option list.
    #[error("Correct option {index} out of range for {n_options} options")]
    CorrectOptionOutOfRange { index: usize, n_options: usize },
}
