//! session — adaptive assessment sessions.
//!
//! Purpose
//! -------
//! Own the lifecycle of one adaptive test: start, item selection, answer
//! submission with re-estimation, termination and the audit trail.
//!
//! Key behaviors
//! -------------
//! - [`AssessmentEngine`] is the entry point; it is `Send + Sync` and meant
//!   to be shared behind an `Arc` by request handlers.
//! - [`SessionStore`] abstracts persistence; [`InMemorySessionStore`] is the
//!   bundled implementation.
//! - Concurrent submissions to one session are serialized by optimistic
//!   versioning with bounded retries.
//!
//! Invariants & assumptions
//! ------------------------
//! - `question_count` equals the number of stored [`AnswerRecord`]s.
//! - Terminal statuses (`converged`, `completed`, `abandoned`) are final.

pub mod engine;
pub mod errors;
pub mod store;
pub mod termination;
pub mod types;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::engine::{AssessmentEngine, REPORT_CONFIDENCE_LEVEL};
pub use self::errors::{SessionError, SessionResult};
pub use self::store::{InMemorySessionStore, SessionSnapshot, SessionStore};
pub use self::termination::{terminal_status, termination_reason};
pub use self::types::{
    AnswerRecord, Proficiency, Session, SessionReport, SessionStatus, TerminationReason,
};
