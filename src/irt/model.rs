//! 3PL item response model: probability, Fisher information, likelihood.
//!
//! Purpose
//! -------
//! Collect the stateless numerical core shared by estimation and selection.
//! Every routine is a pure function of θ and the item parameters, so callers
//! may evaluate them concurrently without coordination.
//!
//! Key behaviors
//! -------------
//! - [`probability`] evaluates `P(θ) = c + (1 − c)·σ(a(θ − b))` with a
//!   sign-branched logistic and a clamped logit, so no `exp` overflows.
//! - [`information`] evaluates `I(θ) = a²·P·(1 − P)/(1 − c)²`, taking
//!   `1 − P` from the complementary logistic instead of subtracting.
//! - [`negative_log_likelihood`] scores a full response pattern; the
//!   estimator minimizes it.
//! - [`test_information`] sums item information over a θ grid.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are [`ItemParams`] that already passed validation (`a > 0`,
//!   `0 ≤ c < 1`, finite `b`).
//! - For finite θ, `c ≤ P(θ) < 1` and `P` is non-decreasing in θ.
//! - Probabilities are clamped to `[LOG_EPS, 1 − LOG_EPS]` before taking
//!   logs, so a near-deterministic item can never produce `ln 0`.
//!
//! Conventions
//! -----------
//! - The likelihood is reported as a **cost** (negative log-likelihood); the
//!   estimator minimizes it.
//! - This module never logs and never allocates inside per-item loops.
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::irt::params::ItemParams;

/// Probability clamp applied before taking logarithms.
pub const LOG_EPS: f64 = 1e-10;

/// Symmetric bound on the logit `a(θ − b)`.
///
/// `σ(±35)` is within `1e-15` of its limit, so clamping here does not change
/// any value the estimator can distinguish.
pub const LOGIT_CLAMP: f64 = 35.0;

/// Largest probability returned by [`probability`].
const P_MAX: f64 = 1.0 - f64::EPSILON;

/// One scored response inside an answer pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub is_correct: bool,
    pub params: ItemParams,
}

impl Response {
    pub fn new(is_correct: bool, params: ItemParams) -> Self {
        Self { is_correct, params }
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let exp_x = x.exp();
        exp_x / (1.0 + exp_x)
    }
}

#[inline]
fn logit(theta: f64, params: &ItemParams) -> f64 {
    (params.discrimination * (theta - params.difficulty)).clamp(-LOGIT_CLAMP, LOGIT_CLAMP)
}

/// Probability of a correct response under the 3PL model.
///
/// # Returns
/// `P(θ)` in `[c, 1)` for finite `theta`; NaN propagates.
#[inline]
pub fn probability(theta: f64, params: &ItemParams) -> f64 {
    let c = params.guessing;
    let p = c + (1.0 - c) * sigmoid(logit(theta, params));
    if p.is_nan() {
        return p;
    }
    p.min(P_MAX).max(c)
}

/// Fisher information of a 3PL item at `theta`.
///
/// Uses `1 − P = (1 − c)·σ(−z)`, which gives
/// `I = a²·P·σ(−z)/(1 − c)`; algebraically identical to the textbook form but
/// free of cancellation when `P` is close to one.
#[inline]
pub fn information(theta: f64, params: &ItemParams) -> f64 {
    let a = params.discrimination;
    let z = logit(theta, params);
    let p = probability(theta, params);
    a * a * p * sigmoid(-z) / (1.0 - params.guessing)
}

/// Negative log-likelihood of a response pattern at `theta`.
///
/// Each term contributes `−ln P` (correct) or `−ln(1 − P)` (incorrect), with
/// `P` clamped to `[LOG_EPS, 1 − LOG_EPS]`. An empty pattern scores `0.0`.
pub fn negative_log_likelihood(theta: f64, pattern: &[Response]) -> f64 {
    pattern
        .iter()
        .map(|response| {
            let p = probability(theta, &response.params).clamp(LOG_EPS, 1.0 - LOG_EPS);
            if response.is_correct { -p.ln() } else { -(1.0 - p).ln() }
        })
        .sum()
}

/// Total information of a set of items at a single `theta`.
pub fn total_information<'a, I>(theta: f64, items: I) -> f64
where
    I: IntoIterator<Item = &'a ItemParams>,
{
    items.into_iter().map(|params| information(theta, params)).sum()
}

/// Test information function over a θ grid.
///
/// # Returns
/// An array with the same length as `theta_grid` whose entry `k` is
/// `Σ_i I_i(θ_k)`.
pub fn test_information(theta_grid: ArrayView1<f64>, items: &[ItemParams]) -> Array1<f64> {
    theta_grid.mapv(|theta| total_information(theta, items))
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Range and monotonicity of the 3PL probability, including saturated
    //   logits far from the item difficulty.
    // - Non-negativity and the closed-form peak of the information function.
    // - The log clamp in the negative log-likelihood.
    //
    // They intentionally DO NOT cover optimization of the likelihood; see
    // `estimation`.
    // -------------------------------------------------------------------------

    fn item(a: f64, b: f64, c: f64) -> ItemParams {
        ItemParams::new(a, b, c).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // At θ = b the 3PL curve passes through the midpoint `c + (1 − c)/2`.
    fn probability_at_difficulty_is_midpoint() {
        let params = item(1.7, 0.4, 0.2);
        let p = probability(0.4, &params);
        assert!((p - 0.6).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Over a wide θ grid, including saturated logits, P stays in [c, 1) and
    // never decreases.
    //
    // Given
    // -----
    // - Several items with large discriminations and mixed guessing.
    //
    // Expect
    // ------
    // - `c ≤ P < 1` at every point and `P(θ_{k+1}) ≥ P(θ_k)`.
    fn probability_is_bounded_and_monotone() {
        let items = [item(0.3, -2.0, 0.0), item(4.0, 1.0, 0.25), item(50.0, 0.0, 0.0)];
        for params in &items {
            let mut previous = f64::NEG_INFINITY;
            for k in -400..=400 {
                let theta = k as f64 * 0.05;
                let p = probability(theta, params);
                assert!(p >= params.guessing, "p={p} below c at θ={theta}");
                assert!(p < 1.0, "p reached 1 at θ={theta}");
                assert!(p >= previous, "p decreased at θ={theta}");
                previous = p;
            }
        }
    }

    #[test]
    fn probability_handles_extreme_theta_without_nan() {
        let params = item(2.0, 0.0, 0.1);
        assert!(probability(1e308, &params).is_finite());
        assert!((probability(-1e308, &params) - 0.1).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Information is non-negative everywhere and, for a 2PL item, peaks at
    // θ = b with value a²/4.
    fn information_non_negative_and_peaks_for_two_pl() {
        let params = item(1.5, 0.5, 0.0);
        let peak = information(0.5, &params);
        assert!((peak - 1.5 * 1.5 / 4.0).abs() < 1e-12);
        for k in -100..=100 {
            let theta = k as f64 * 0.1;
            let info = information(theta, &params);
            assert!(info >= 0.0);
            assert!(info <= peak + 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // The cancellation-free form agrees with the textbook formula.
    fn information_matches_textbook_formula() {
        let params = item(1.1, -0.3, 0.2);
        for theta in [-2.0, -0.3, 0.0, 1.5] {
            let p = probability(theta, &params);
            let textbook = 1.1 * 1.1 * p * (1.0 - p) / (0.8 * 0.8);
            assert!((information(theta, &params) - textbook).abs() < 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // A near-deterministic item answered against the odds yields a finite
    // cost thanks to the LOG_EPS clamp.
    fn negative_log_likelihood_is_finite_for_deterministic_item() {
        let params = item(40.0, -3.0, 0.0);
        let pattern = [Response::new(false, params)];
        let cost = negative_log_likelihood(4.0, &pattern);
        assert!(cost.is_finite());
        assert!((cost - (-(LOG_EPS).ln())).abs() < 1e-6);
    }

    #[test]
    fn negative_log_likelihood_of_empty_pattern_is_zero() {
        assert_eq!(negative_log_likelihood(1.0, &[]), 0.0);
    }

    #[test]
    fn test_information_sums_items_on_grid() {
        let items = [item(1.0, 0.0, 0.0), item(1.0, 0.0, 0.0)];
        let grid = Array1::from(vec![-1.0, 0.0, 1.0]);
        let tif = test_information(grid.view(), &items);
        assert_eq!(tif.len(), 3);
        assert!((tif[1] - 0.5).abs() < 1e-12);
        assert!((tif[0] - tif[2]).abs() < 1e-12);
    }
}
