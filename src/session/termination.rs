//! Termination rules.
//!
//! A session stops when its standard error drops below the configured
//! threshold or when it reached the question cap, whichever fires first.
//! The SE rule is checked first, so a session satisfying both is reported as
//! converged.
use crate::{
    config::EngineConfig,
    session::types::{SessionStatus, TerminationReason},
};

/// Reason the session should stop after `question_count` answers with the
/// given `se`, or `None` to continue.
pub fn termination_reason(
    se: f64, question_count: u32, config: &EngineConfig,
) -> Option<TerminationReason> {
    if se < config.se_convergence_threshold {
        Some(TerminationReason::Converged)
    } else if question_count >= config.max_questions {
        Some(TerminationReason::MaxQuestions)
    } else {
        None
    }
}

/// Status a session takes when it stops for `reason`.
///
/// `None` for [`TerminationReason::BankExhausted`]: running out of items does
/// not end a session.
pub fn terminal_status(reason: TerminationReason) -> Option<SessionStatus> {
    match reason {
        TerminationReason::Converged => Some(SessionStatus::Converged),
        TerminationReason::MaxQuestions => Some(SessionStatus::Completed),
        TerminationReason::Abandoned => Some(SessionStatus::Abandoned),
        TerminationReason::BankExhausted => None,
    }
}
