//! irt — three-parameter logistic item response model.
//!
//! Purpose
//! -------
//! Hold the pure 3PL math consumed by both the θ estimator and the item
//! selector, together with the validated parameter type and its error
//! surface.
//!
//! Key behaviors
//! -------------
//! - [`ItemParams`] validates `(a, b, c)` once at construction.
//! - [`model`] evaluates probability, information, the pattern negative
//!   log-likelihood and the test information function.
//!
//! Conventions
//! -----------
//! - Functions are stateless and allocation-free per item; the only
//!   allocating routine is [`model::test_information`], which returns an
//!   `ndarray` vector.
//! - Domain violations surface as [`ParamError`], never as panics.

pub mod errors;
pub mod model;
pub mod params;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{ParamError, ParamResult};
pub use self::model::{
    LOG_EPS, LOGIT_CLAMP, Response, information, negative_log_likelihood, probability,
    test_information, total_information,
};
pub use self::params::ItemParams;
