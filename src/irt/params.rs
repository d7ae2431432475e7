//! Validated 3PL item parameters.
//!
//! Purpose
//! -------
//! Provide a small, `Copy` container for the calibrated `(a, b, c)` triple of
//! a 3PL item so that the probability, information and likelihood routines
//! can assume domain-valid inputs without rechecking.
//!
//! Invariants & assumptions
//! ------------------------
//! - `a` (discrimination) is finite and `> 0`.
//! - `b` (difficulty) is finite.
//! - `c` (guessing) satisfies `0 ≤ c < 1`, which keeps `(1 - c)²` away from
//!   zero in the information formula.
//!
//! Testing notes
//! -------------
//! - Unit tests cover acceptance of typical calibrations and rejection of
//!   each out-of-domain field with the matching [`ParamError`] variant.
use serde::{Deserialize, Serialize};

use crate::irt::errors::{ParamError, ParamResult};

/// Calibrated 3PL parameters for a single item.
///
/// Fields
/// ------
/// - `discrimination`: slope `a` of the item characteristic curve.
/// - `difficulty`: location `b` on the θ scale.
/// - `guessing`: lower asymptote `c`.
///
/// Construct through [`ItemParams::new`]; deserialized values should be
/// passed through [`ItemParams::validate`] before use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemParams {
    pub discrimination: f64,
    pub difficulty: f64,
    pub guessing: f64,
}

impl ItemParams {
    /// Construct validated parameters.
    ///
    /// # Errors
    /// - [`ParamError::InvalidDiscrimination`] if `a` is non-finite or `≤ 0`.
    /// - [`ParamError::InvalidDifficulty`] if `b` is non-finite.
    /// - [`ParamError::InvalidGuessing`] if `c` is non-finite or outside `[0, 1)`.
    pub fn new(discrimination: f64, difficulty: f64, guessing: f64) -> ParamResult<Self> {
        let params = Self { discrimination, difficulty, guessing };
        params.validate()?;
        Ok(params)
    }

    /// Two-parameter item (`c = 0`).
    pub fn two_pl(discrimination: f64, difficulty: f64) -> ParamResult<Self> {
        Self::new(discrimination, difficulty, 0.0)
    }

    /// Check the 3PL domain constraints.
    pub fn validate(&self) -> ParamResult<()> {
        let a = self.discrimination;
        if !a.is_finite() {
            return Err(ParamError::InvalidDiscrimination {
                value: a,
                reason: "Discrimination must be finite.",
            });
        }
        if a <= 0.0 {
            return Err(ParamError::InvalidDiscrimination {
                value: a,
                reason: "Discrimination must be strictly positive.",
            });
        }
        if !self.difficulty.is_finite() {
            return Err(ParamError::InvalidDifficulty {
                value: self.difficulty,
                reason: "Difficulty must be finite.",
            });
        }
        let c = self.guessing;
        if !c.is_finite() || !(0.0..1.0).contains(&c) {
            return Err(ParamError::InvalidGuessing {
                value: c,
                reason: "Guessing must lie in [0, 1).",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover domain validation in `ItemParams::new`.
    //
    // They intentionally DO NOT cover the 3PL formulas themselves; those live
    // in `irt::model`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A typical calibrated item is accepted unchanged.
    fn itemparams_new_accepts_typical_calibration() {
        let params = ItemParams::new(1.2, -0.5, 0.25).expect("typical item should validate");
        assert_eq!(params.discrimination, 1.2);
        assert_eq!(params.difficulty, -0.5);
        assert_eq!(params.guessing, 0.25);
    }

    #[test]
    // Purpose
    // -------
    // Non-positive and non-finite discriminations are rejected.
    fn itemparams_new_rejects_bad_discrimination() {
        for a in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            match ItemParams::new(a, 0.0, 0.2) {
                Err(ParamError::InvalidDiscrimination { .. }) => {}
                other => panic!("expected InvalidDiscrimination for a={a}, got {other:?}"),
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Guessing at or above one (or negative) is rejected; zero is allowed.
    fn itemparams_new_enforces_guessing_range() {
        assert!(ItemParams::new(1.0, 0.0, 0.0).is_ok());
        for c in [1.0, 1.5, -0.01, f64::NAN] {
            match ItemParams::new(1.0, 0.0, c) {
                Err(ParamError::InvalidGuessing { value, .. }) => {
                    assert!(value.is_nan() || value == c)
                }
                other => panic!("expected InvalidGuessing for c={c}, got {other:?}"),
            }
        }
    }

    #[test]
    fn itemparams_new_rejects_non_finite_difficulty() {
        let err = ItemParams::new(1.0, f64::NEG_INFINITY, 0.1).unwrap_err();
        assert!(matches!(err, ParamError::InvalidDifficulty { .. }));
    }

    #[test]
    fn two_pl_has_zero_guessing() {
        let params = ItemParams::two_pl(1.5, 0.3).unwrap();
        assert_eq!(params.guessing, 0.0);
    }
}
