//! selection — choosing the next item.
//!
//! Purpose
//! -------
//! Rank candidate items by Fisher information at the current θ and apply an
//! exposure-control policy on top of that ranking.
//!
//! Key behaviors
//! -------------
//! - [`select_max_information`] is the deterministic baseline.
//! - [`ItemSelector`] wraps the baseline with [`ExposureControl`]
//!   (randomesque or maximum exposure rate).
//!
//! Conventions
//! -----------
//! - Selection never mutates item counters; the engine does that after a
//!   committed answer.

pub mod exposure;
pub mod selector;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::exposure::{DEFAULT_TOP_K, ExposureControl};
pub use self::selector::{
    ItemSelector, PARALLEL_SCORING_THRESHOLD, rank_candidates, select_max_information,
};
