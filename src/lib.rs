//! adaptive_irt — adaptive diagnostic testing on the 3PL IRT model.
//!
//! Purpose
//! -------
//! Serve as the crate root for an adaptive assessment engine: estimate a
//! test taker's latent ability θ from their answers, pick the most
//! informative next question, and stop once θ is known precisely enough or
//! the question budget is spent.
//!
//! Key behaviors
//! -------------
//! - `irt`: probability, information and likelihood of the 3PL model.
//! - `estimation`: bounded maximum-likelihood θ with standard error.
//! - `bank`: calibrated items with atomic usage counters.
//! - `selection`: maximum-information choice with exposure control.
//! - `session`: the session state machine, its store seam and audit trail.
//! - `gaps`: skill-gap ranking against occupation requirements.
//! - `simulation`: Monte Carlo recovery studies driven through the engine.
//! - `config`: serde/TOML engine configuration.
//!
//! Invariants & assumptions
//! ------------------------
//! - Item parameters are validated once, when items enter the bank.
//! - All numerical routines are pure; mutable state lives in the session
//!   store and the item counters only.
//!
//! Conventions
//! -----------
//! - θ is on the standard logistic IRT scale; the default search interval
//!   is `[-4, 4]`.
//! - Option indices are 0-based; answer ordinals are 1-based.
//! - Each layer has its own `thiserror` enum and `Result` alias.
//!
//! Downstream usage
//! ----------------
//! - Services build an [`ItemBank`](bank::ItemBank), an
//!   [`EngineConfig`](config::EngineConfig) and share one
//!   [`AssessmentEngine`](session::AssessmentEngine) behind an `Arc`.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/` exercises full sessions,
//!   concurrency on one session and the selection properties end to end.

pub mod bank;
pub mod config;
pub mod estimation;
pub mod gaps;
pub mod irt;
pub mod selection;
pub mod session;
pub mod simulation;
