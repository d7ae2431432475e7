//! Session state, audit records and the summaries derived from them.
//!
//! Purpose
//! -------
//! Define the values the engine moves through the [`SessionStore`]:
//! the mutable [`Session`] row, the append-only [`AnswerRecord`] log and
//! the read-only [`SessionReport`] / [`Proficiency`] summaries.
//!
//! Invariants & assumptions
//! ------------------------
//! - A new session starts at `θ = 0`, `SE = 1`, `status = Active`,
//!   `version = 0`, with no answers.
//! - `answered_item_ids` lists items in answer order without repeats and
//!   has exactly `question_count` entries.
//! - For N records of one session, ordinals are `1..=N` and
//!   `theta_before(k + 1) == theta_after(k)`.
//!
//! [`SessionStore`]: crate::session::SessionStore
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bank::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Converged,
    Completed,
    Abandoned,
}

impl SessionStatus {
    pub fn is_active(self) -> bool {
        self == SessionStatus::Active
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SessionStatus::Active => "active",
            SessionStatus::Converged => "converged",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
        };
        f.write_str(text)
    }
}

/// Why a session stopped, or should stop, asking questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Standard error fell below the threshold.
    Converged,
    /// The question cap was reached.
    MaxQuestions,
    /// No unanswered item of the skill remains. Soft: the session stays
    /// active.
    BankExhausted,
    Abandoned,
}

/// One assessment attempt of a user on a skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_ref: String,
    pub skill_ref: String,
    pub current_theta: f64,
    pub current_se: f64,
    pub question_count: u32,
    pub status: SessionStatus,
    pub answered_item_ids: Vec<ItemId>,
    /// Optimistic-concurrency counter, bumped on every committed write.
    pub version: u64,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user_ref: impl Into<String>, skill_ref: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_ref: user_ref.into(),
            skill_ref: skill_ref.into(),
            current_theta: 0.0,
            current_se: 1.0,
            question_count: 0,
            status: SessionStatus::Active,
            answered_item_ids: Vec::new(),
            version: 0,
            started_at: now,
            last_activity: now,
            completed_at: None,
        }
    }

    pub fn has_answered(&self, item_id: ItemId) -> bool {
        self.answered_item_ids.contains(&item_id)
    }
}

/// Immutable audit entry written once per submitted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub session_id: Uuid,
    pub item_id: ItemId,
    pub selected_option: usize,
    pub is_correct: bool,
    pub theta_before: f64,
    pub theta_after: f64,
    pub se_before: f64,
    pub se_after: f64,
    /// 1-based position of the answer within its session.
    pub ordinal: u32,
    /// Whether the estimate behind `theta_after` converged; `false` means the
    /// previous θ/SE were carried forward.
    pub estimate_converged: bool,
    /// Seconds the test taker spent on the item, when the client reports it.
    #[serde(default)]
    pub time_taken_seconds: Option<u32>,
    pub answered_at: DateTime<Utc>,
}

/// Final (or current) state of a session as handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub user_ref: String,
    pub skill_ref: String,
    pub theta: f64,
    pub se: f64,
    pub question_count: u32,
    pub status: SessionStatus,
    pub termination_reason: Option<TerminationReason>,
    /// 95% normal-approximation interval around θ.
    pub confidence_interval: (f64, f64),
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A user's assessed standing on one skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proficiency {
    pub user_ref: String,
    pub skill_ref: String,
    pub theta: f64,
    pub standard_error: f64,
    /// Number of answers the estimate rests on.
    pub calibration_count: u32,
}

impl From<&Session> for Proficiency {
    fn from(session: &Session) -> Self {
        Self {
            user_ref: session.user_ref.clone(),
            skill_ref: session.skill_ref.clone(),
            theta: session.current_theta,
            standard_error: session.current_se,
            calibration_count: session.question_count,
        }
    }
}
