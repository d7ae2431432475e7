//! Error surface of the session layer.
//!
//! [`SessionError`] is what callers of the engine see. Every variant that
//! can be raised by `submit_answer` is raised before any state is written,
//! except `ConcurrentModification`, which is raised after the retry budget
//! is spent and likewise leaves the stored session untouched.
//!
//! Non-convergence of the θ estimate is not an error, and neither is bank
//! exhaustion.
use thiserror::Error;
use uuid::Uuid;

use crate::{
    bank::ItemId,
    estimation::EstimationError,
    irt::ParamError,
    session::types::SessionStatus,
};

/// Result alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    // ---- Input ----
    /// Selected option index does not exist on the item.
    #[error("Invalid option {selected} for {item_id} with {n_options} options")]
    InvalidOption { item_id: ItemId, selected: usize, n_options: usize },

    #[error("No calibrated items for skill '{skill_ref}'")]
    EmptyItemBank { skill_ref: String },

    #[error("Unknown {item_id}")]
    ItemNotFound { item_id: ItemId },

    #[error("{item_id} belongs to skill '{item_skill}', session is on '{session_skill}'")]
    ItemSkillMismatch { item_id: ItemId, item_skill: String, session_skill: String },

    #[error("{item_id} was already answered in session {session_id}")]
    ItemAlreadyAnswered { session_id: Uuid, item_id: ItemId },

    #[error("Invalid item parameters for {item_id}: {source}")]
    InvalidParams { item_id: ItemId, source: ParamError },

    // ---- Lifecycle ----
    #[error("Session {session_id} not found")]
    SessionNotFound { session_id: Uuid },

    #[error("Session {session_id} is {status}, not active")]
    SessionNotActive { session_id: Uuid, status: SessionStatus },

    #[error("Session {session_id} already exists")]
    DuplicateSession { session_id: Uuid },

    // ---- Concurrency ----
    /// Version conflicts persisted across every retry.
    #[error("Session {session_id} modified concurrently; gave up after {attempts} attempts")]
    ConcurrentModification { session_id: Uuid, attempts: u32 },

    /// A single commit saw a stale version. Handled by the engine's retry
    /// loop; surfaces only from direct store calls.
    #[error("Version conflict on session {session_id}: expected {expected}, found {found}")]
    VersionConflict { session_id: Uuid, expected: u64, found: u64 },

    // ---- Estimation ----
    #[error("Estimation failed: {0}")]
    Estimation(#[from] EstimationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_item_and_option() {
        let err = SessionError::InvalidOption { item_id: ItemId(12), selected: 5, n_options: 4 };
        assert_eq!(err.to_string(), "Invalid option 5 for item#12 with 4 options");
    }

    #[test]
    fn estimation_errors_convert() {
        let err: SessionError = EstimationError::MissingThetaHat.into();
        assert!(matches!(err, SessionError::Estimation(EstimationError::MissingThetaHat)));
    }
}
