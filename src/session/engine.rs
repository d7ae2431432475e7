//! Assessment engine — the adaptive session state machine.
//!
//! Purpose
//! -------
//! Drive one adaptive test per session: pick the most useful next item,
//! score submitted answers, re-estimate θ and SE from the full answer
//! pattern, decide when to stop, and write one audit record per answer.
//!
//! Key behaviors
//! -------------
//! - [`AssessmentEngine::start_session`] creates an active session at the
//!   prior and counts it towards item exposure rates.
//! - [`AssessmentEngine::get_next_item`] filters the skill's unanswered items
//!   and delegates to the [`ItemSelector`]; `None` means stop or bank
//!   exhausted.
//! - [`AssessmentEngine::submit_answer`] validates, re-estimates, evaluates
//!   termination and commits session plus record in one store call. A
//!   version conflict triggers a reload and a full recomputation, up to
//!   `max_commit_retries` attempts.
//! - Item usage counters move only after a successful commit.
//!
//! Invariants & assumptions
//! ------------------------
//! - Status transitions are `active → converged | completed | abandoned`;
//!   nothing leaves a terminal status.
//! - After a commit, `question_count == records.len()` and the record chain
//!   satisfies `theta_before(k + 1) == theta_after(k)`.
//! - A non-converged estimate never moves θ or SE: the previous values are
//!   carried forward and the record is flagged.
//!
//! Conventions
//! -----------
//! - Logging goes through `tracing`: `info!` for lifecycle changes,
//!   `debug!` for selections and estimates, `warn!` for non-convergence and
//!   commit retries.
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    bank::{Item, ItemBank, ItemId},
    config::{ConfigResult, EngineConfig},
    estimation::{EstimationError, ThetaEstimator, confidence_interval},
    irt::Response,
    selection::ItemSelector,
    session::{
        errors::{SessionError, SessionResult},
        store::{InMemorySessionStore, SessionSnapshot, SessionStore},
        termination::{terminal_status, termination_reason},
        types::{
            AnswerRecord, Proficiency, Session, SessionReport, SessionStatus, TerminationReason,
        },
    },
};

/// Confidence level of the interval in [`SessionReport`].
pub const REPORT_CONFIDENCE_LEVEL: f64 = 0.95;

pub struct AssessmentEngine<S: SessionStore = InMemorySessionStore> {
    bank: Arc<ItemBank>,
    store: S,
    estimator: ThetaEstimator,
    selector: ItemSelector,
    config: EngineConfig,
}

impl AssessmentEngine<InMemorySessionStore> {
    /// Engine backed by a fresh [`InMemorySessionStore`].
    pub fn in_memory(bank: Arc<ItemBank>, config: EngineConfig) -> ConfigResult<Self> {
        Self::new(bank, InMemorySessionStore::new(), config)
    }
}

impl<S: SessionStore> AssessmentEngine<S> {
    /// Build an engine over `bank` and `store`.
    ///
    /// # Errors
    /// Any [`ConfigError`](crate::config::ConfigError) from
    /// [`EngineConfig::validate`].
    pub fn new(bank: Arc<ItemBank>, store: S, config: EngineConfig) -> ConfigResult<Self> {
        config.validate()?;
        let estimator = ThetaEstimator::new(config.estimator)?;
        let selector = ItemSelector::new(config.exposure, config.seed);
        Ok(Self { bank, store, estimator, selector, config })
    }

    pub fn bank(&self) -> &Arc<ItemBank> {
        &self.bank
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open a new active session for `user_ref` on `skill_ref`.
    ///
    /// # Errors
    /// - [`SessionError::EmptyItemBank`] if the skill has no items.
    /// - Store errors from [`SessionStore::insert`].
    pub fn start_session(
        &self, user_ref: impl Into<String>, skill_ref: impl Into<String>,
    ) -> SessionResult<Session> {
        let skill_ref = skill_ref.into();
        if self.bank.items_for_skill(&skill_ref).is_empty() {
            return Err(SessionError::EmptyItemBank { skill_ref });
        }
        let session = Session::new(user_ref, skill_ref);
        self.store.insert(session.clone())?;
        let sessions_started = self.bank.record_session_start();
        info!(
            session_id = %session.id,
            user = %session.user_ref,
            skill = %session.skill_ref,
            sessions_started,
            "assessment session started"
        );
        Ok(session)
    }

    pub fn session(&self, session_id: Uuid) -> SessionResult<Session> {
        Ok(self.store.load(session_id)?.session)
    }

    /// Audit trail of the session, in ordinal order.
    pub fn answers(&self, session_id: Uuid) -> SessionResult<Vec<AnswerRecord>> {
        Ok(self.store.load(session_id)?.records)
    }

    /// Next item to present, or `None` when the session is not active, has
    /// met a termination rule, or has exhausted its skill's items.
    pub fn get_next_item(&self, session_id: Uuid) -> SessionResult<Option<Arc<Item>>> {
        let session = self.session(session_id)?;
        if !session.status.is_active() {
            debug!(%session_id, status = %session.status, "no next item: session not active");
            return Ok(None);
        }
        if let Some(reason) =
            termination_reason(session.current_se, session.question_count, &self.config)
        {
            debug!(%session_id, ?reason, "no next item: termination rule met");
            return Ok(None);
        }

        let candidates = self.candidates(&session);
        let chosen = self
            .selector
            .select(session.current_theta, &candidates, self.bank.sessions_started())
            .cloned();
        match &chosen {
            Some(item) => debug!(
                %session_id,
                item_id = %item.id,
                theta = session.current_theta,
                information = item.information(session.current_theta),
                candidates = candidates.len(),
                "item selected"
            ),
            None => debug!(%session_id, "no next item: bank exhausted"),
        }
        Ok(chosen)
    }

    /// Score `selected_option` for `item_id`, re-estimate and commit.
    ///
    /// Same as [`submit_timed_answer`](Self::submit_timed_answer) without a
    /// response time.
    pub fn submit_answer(
        &self, session_id: Uuid, item_id: ItemId, selected_option: usize,
    ) -> SessionResult<AnswerRecord> {
        self.submit_timed_answer(session_id, item_id, selected_option, None)
    }

    /// Score `selected_option` for `item_id`, re-estimate and commit,
    /// recording `time_taken_seconds` on the answer record.
    ///
    /// # Behavior
    /// 1. Reject unknown items and out-of-range options before touching the
    ///    session.
    /// 2. Load the session; reject non-active sessions, items of another
    ///    skill and already-answered items.
    /// 3. Re-estimate θ on the full pattern plus the new response; carry the
    ///    previous θ/SE forward if the estimate did not converge.
    /// 4. Apply the termination rules and commit against the loaded version.
    /// 5. On a version conflict, reload and repeat from step 2.
    /// 6. After the commit, bump the item's usage counters.
    ///
    /// # Errors
    /// See [`SessionError`]; `ConcurrentModification` once every attempt saw
    /// a conflict.
    pub fn submit_timed_answer(
        &self, session_id: Uuid, item_id: ItemId, selected_option: usize,
        time_taken_seconds: Option<u32>,
    ) -> SessionResult<AnswerRecord> {
        let item = self.bank.get(item_id).ok_or(SessionError::ItemNotFound { item_id })?;
        if !item.is_valid_option(selected_option) {
            return Err(SessionError::InvalidOption {
                item_id,
                selected: selected_option,
                n_options: item.n_options(),
            });
        }
        let is_correct = item.is_correct(selected_option);

        let attempts = self.config.max_commit_retries;
        for attempt in 1..=attempts {
            let snapshot = self.store.load(session_id)?;
            let expected_version = snapshot.session.version;
            let (session, record) =
                self.advance(snapshot, item, selected_option, is_correct, time_taken_seconds)?;

            match self.store.commit(expected_version, session, record.clone()) {
                Ok(committed) => {
                    item.record_administration(is_correct);
                    debug!(
                        %session_id,
                        %item_id,
                        ordinal = record.ordinal,
                        is_correct,
                        theta = record.theta_after,
                        se = record.se_after,
                        "answer committed"
                    );
                    if !committed.status.is_active() {
                        info!(
                            %session_id,
                            status = %committed.status,
                            theta = committed.current_theta,
                            se = committed.current_se,
                            questions = committed.question_count,
                            "assessment session finished"
                        );
                    }
                    return Ok(record);
                }
                Err(SessionError::VersionConflict { expected, found, .. }) => {
                    warn!(%session_id, attempt, expected, found, "session version conflict, retrying");
                }
                Err(other) => return Err(other),
            }
        }
        Err(SessionError::ConcurrentModification { session_id, attempts })
    }

    /// Move an active session to `abandoned`.
    ///
    /// # Errors
    /// - [`SessionError::SessionNotActive`] if it already finished.
    /// - [`SessionError::ConcurrentModification`] if conflicts persist.
    pub fn abandon_session(&self, session_id: Uuid) -> SessionResult<Session> {
        let attempts = self.config.max_commit_retries;
        for attempt in 1..=attempts {
            let session = self.session(session_id)?;
            if !session.status.is_active() {
                return Err(SessionError::SessionNotActive { session_id, status: session.status });
            }
            match self.store.update_status(session_id, session.version, SessionStatus::Abandoned) {
                Ok(updated) => {
                    info!(%session_id, questions = updated.question_count, "assessment session abandoned");
                    return Ok(updated);
                }
                Err(SessionError::VersionConflict { expected, found, .. }) => {
                    warn!(%session_id, attempt, expected, found, "session version conflict, retrying");
                }
                Err(other) => return Err(other),
            }
        }
        Err(SessionError::ConcurrentModification { session_id, attempts })
    }

    /// Current summary of the session, including a 95% interval for θ.
    pub fn report(&self, session_id: Uuid) -> SessionResult<SessionReport> {
        let session = self.session(session_id)?;
        let termination_reason = match session.status {
            SessionStatus::Converged => Some(TerminationReason::Converged),
            SessionStatus::Completed => Some(TerminationReason::MaxQuestions),
            SessionStatus::Abandoned => Some(TerminationReason::Abandoned),
            SessionStatus::Active if self.candidates(&session).is_empty() => {
                Some(TerminationReason::BankExhausted)
            }
            SessionStatus::Active => None,
        };
        let confidence_interval =
            confidence_interval(session.current_theta, session.current_se, REPORT_CONFIDENCE_LEVEL)?;
        Ok(SessionReport {
            session_id,
            user_ref: session.user_ref,
            skill_ref: session.skill_ref,
            theta: session.current_theta,
            se: session.current_se,
            question_count: session.question_count,
            status: session.status,
            termination_reason,
            confidence_interval,
            started_at: session.started_at,
            completed_at: session.completed_at,
        })
    }

    pub fn proficiency(&self, session_id: Uuid) -> SessionResult<Proficiency> {
        Ok(Proficiency::from(&self.session(session_id)?))
    }

    fn candidates(&self, session: &Session) -> Vec<Arc<Item>> {
        self.bank
            .items_for_skill(&session.skill_ref)
            .iter()
            .filter(|item| !session.has_answered(item.id))
            .cloned()
            .collect()
    }

    /// Compute the post-answer session and its record from a snapshot.
    fn advance(
        &self, snapshot: SessionSnapshot, item: &Item, selected_option: usize, is_correct: bool,
        time_taken_seconds: Option<u32>,
    ) -> SessionResult<(Session, AnswerRecord)> {
        let SessionSnapshot { mut session, records } = snapshot;
        let session_id = session.id;
        if !session.status.is_active() {
            return Err(SessionError::SessionNotActive { session_id, status: session.status });
        }
        if item.skill_ref != session.skill_ref {
            return Err(SessionError::ItemSkillMismatch {
                item_id: item.id,
                item_skill: item.skill_ref.clone(),
                session_skill: session.skill_ref.clone(),
            });
        }
        if session.has_answered(item.id) {
            return Err(SessionError::ItemAlreadyAnswered { session_id, item_id: item.id });
        }

        let mut item_ids: Vec<ItemId> = Vec::with_capacity(records.len() + 1);
        let mut pattern: Vec<Response> = Vec::with_capacity(records.len() + 1);
        for record in &records {
            let answered = self
                .bank
                .get(record.item_id)
                .ok_or(SessionError::ItemNotFound { item_id: record.item_id })?;
            item_ids.push(record.item_id);
            pattern.push(Response::new(record.is_correct, answered.params));
        }
        item_ids.push(item.id);
        pattern.push(Response::new(is_correct, item.params));

        let estimate = self.estimator.estimate(&pattern).map_err(|err| match err {
            EstimationError::InvalidPatternItem { index, source } => {
                SessionError::InvalidParams { item_id: item_ids[index], source }
            }
            other => SessionError::Estimation(other),
        })?;

        let theta_before = session.current_theta;
        let se_before = session.current_se;
        let (theta_after, se_after) = if estimate.converged {
            (estimate.theta, estimate.se)
        } else {
            warn!(
                %session_id,
                item_id = %item.id,
                iterations = estimate.iterations,
                theta = estimate.theta,
                "theta estimate did not converge, keeping previous estimate"
            );
            (theta_before, se_before)
        };
        debug!(
            %session_id,
            theta_before,
            theta_after,
            se_after,
            converged = estimate.converged,
            "theta re-estimated"
        );

        let now = Utc::now();
        session.question_count += 1;
        let record = AnswerRecord {
            session_id,
            item_id: item.id,
            selected_option,
            is_correct,
            theta_before,
            theta_after,
            se_before,
            se_after,
            ordinal: session.question_count,
            estimate_converged: estimate.converged,
            time_taken_seconds,
            answered_at: now,
        };

        session.current_theta = theta_after;
        session.current_se = se_after;
        session.answered_item_ids.push(item.id);
        session.last_activity = now;
        let reason = termination_reason(se_after, session.question_count, &self.config);
        if let Some(status) = reason.and_then(terminal_status) {
            session.status = status;
            session.completed_at = Some(now);
        }
        Ok((session, record))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::{irt::ItemParams, selection::ExposureControl};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Session start, including the empty-skill rejection.
    // - Per-answer bookkeeping: counts, record chain, counters.
    // - Validation failures leaving state untouched.
    // - The non-convergence fallback and the commit retry loop.
    //
    // End-to-end convergence on a realistic bank lives in
    // `tests/integration_assessment_pipeline.rs`.
    // -------------------------------------------------------------------------

    fn bank() -> Arc<ItemBank> {
        let items = (0..40).map(|i| {
            let skill = if i < 30 { "algebra" } else { "geometry" };
            let params = ItemParams::new(1.2, -2.0 + 0.14 * i as f64, 0.2).unwrap();
            let options = vec!["a".into(), "b".into(), "c".into(), "d".into()];
            Item::new(ItemId(i), skill, params, options, 0).unwrap()
        });
        Arc::new(ItemBank::new(items).unwrap())
    }

    fn config() -> EngineConfig {
        EngineConfig { exposure: ExposureControl::MaxInformation, ..Default::default() }
    }

    fn engine() -> AssessmentEngine {
        AssessmentEngine::in_memory(bank(), config()).unwrap()
    }

    #[test]
    fn start_session_rejects_unknown_skill() {
        let engine = engine();
        assert_eq!(
            engine.start_session("u", "chemistry").unwrap_err(),
            SessionError::EmptyItemBank { skill_ref: "chemistry".into() }
        );
        assert_eq!(engine.bank().sessions_started(), 0);
    }

    #[test]
    fn start_session_counts_sessions() {
        let engine = engine();
        let session = engine.start_session("u", "algebra").unwrap();
        assert_eq!(session.status, SessionStatus::Active);
        assert_eq!(engine.bank().sessions_started(), 1);
        assert_eq!(engine.session(session.id).unwrap(), session);
    }

    #[test]
    // Purpose
    // -------
    // One submission advances the count, writes an ordinal-1 record starting
    // from the prior and bumps the item counters.
    fn submit_answer_records_first_response() {
        // Arrange
        let engine = engine();
        let session = engine.start_session("u", "algebra").unwrap();
        let item = engine.get_next_item(session.id).unwrap().unwrap();

        // Act
        let record = engine.submit_answer(session.id, item.id, item.correct_option).unwrap();

        // Assert
        assert_eq!(record.ordinal, 1);
        assert_eq!(record.theta_before, 0.0);
        assert_eq!(record.se_before, 1.0);
        assert!(record.is_correct);
        assert!(record.theta_after > 0.0);
        let stored = engine.session(session.id).unwrap();
        assert_eq!(stored.question_count, 1);
        assert_eq!(stored.version, 1);
        assert_eq!(stored.answered_item_ids, vec![item.id]);
        assert_eq!(item.times_administered(), 1);
        assert_eq!(item.times_correct(), 1);
        assert_eq!(engine.answers(session.id).unwrap(), vec![record]);
    }

    #[test]
    // Purpose
    // -------
    // A reported response time is stored on the record; the untimed entry
    // point leaves it empty.
    fn submit_timed_answer_keeps_response_time() {
        // Arrange
        let engine = engine();
        let session = engine.start_session("u", "algebra").unwrap();
        let first = engine.get_next_item(session.id).unwrap().unwrap();

        // Act
        let timed =
            engine.submit_timed_answer(session.id, first.id, first.correct_option, Some(42)).unwrap();
        let second = engine.get_next_item(session.id).unwrap().unwrap();
        let untimed = engine.submit_answer(session.id, second.id, second.correct_option).unwrap();

        // Assert
        assert_eq!(timed.time_taken_seconds, Some(42));
        assert_eq!(untimed.time_taken_seconds, None);
        assert_eq!(engine.answers(session.id).unwrap(), vec![timed, untimed]);
    }

    #[test]
    // Purpose
    // -------
    // Invalid input is rejected without mutating the session or counters.
    fn invalid_submissions_leave_state_untouched() {
        // Arrange
        let engine = engine();
        let session = engine.start_session("u", "algebra").unwrap();
        let item = Arc::clone(engine.bank().get(ItemId(5)).unwrap());
        let foreign = ItemId(35);

        // Act / Assert
        assert_eq!(
            engine.submit_answer(session.id, item.id, 4).unwrap_err(),
            SessionError::InvalidOption { item_id: item.id, selected: 4, n_options: 4 }
        );
        assert!(matches!(
            engine.submit_answer(session.id, foreign, 0),
            Err(SessionError::ItemSkillMismatch { .. })
        ));
        assert_eq!(
            engine.submit_answer(session.id, ItemId(999), 0).unwrap_err(),
            SessionError::ItemNotFound { item_id: ItemId(999) }
        );
        let missing = Uuid::new_v4();
        assert_eq!(
            engine.submit_answer(missing, item.id, 0).unwrap_err(),
            SessionError::SessionNotFound { session_id: missing }
        );

        let stored = engine.session(session.id).unwrap();
        assert_eq!(stored, session);
        assert!(engine.answers(session.id).unwrap().is_empty());
        assert_eq!(item.times_administered(), 0);
    }

    #[test]
    fn repeated_item_is_rejected() {
        let engine = engine();
        let session = engine.start_session("u", "algebra").unwrap();
        engine.submit_answer(session.id, ItemId(3), 0).unwrap();
        assert_eq!(
            engine.submit_answer(session.id, ItemId(3), 1).unwrap_err(),
            SessionError::ItemAlreadyAnswered { session_id: session.id, item_id: ItemId(3) }
        );
        assert_eq!(engine.session(session.id).unwrap().question_count, 1);
    }

    #[test]
    // Purpose
    // -------
    // With a one-iteration solver cap every estimate is non-converged, so θ
    // and SE stay at the prior while the count and records still advance.
    fn non_converged_estimate_keeps_previous_theta() {
        // Arrange
        let mut config = config();
        config.estimator.max_iters = 1;
        config.estimator.tolerance = 1e-12;
        let engine = AssessmentEngine::in_memory(bank(), config).unwrap();
        let session = engine.start_session("u", "algebra").unwrap();

        // Act
        let first = engine.submit_answer(session.id, ItemId(10), 0).unwrap();
        let second = engine.submit_answer(session.id, ItemId(11), 1).unwrap();

        // Assert
        for record in [&first, &second] {
            assert!(!record.estimate_converged);
            assert_eq!(record.theta_after, 0.0);
            assert_eq!(record.se_after, 1.0);
        }
        assert_eq!(second.ordinal, 2);
        let stored = engine.session(session.id).unwrap();
        assert_eq!(stored.question_count, 2);
        assert_eq!(stored.current_theta, 0.0);
    }

    #[test]
    // Purpose
    // -------
    // The question cap completes the session and blocks further items.
    fn max_questions_completes_session() {
        // Arrange
        let config = EngineConfig { max_questions: 3, ..config() };
        let engine = AssessmentEngine::in_memory(bank(), config).unwrap();
        let session = engine.start_session("u", "algebra").unwrap();

        // Act
        for _ in 0..3 {
            let item = engine.get_next_item(session.id).unwrap().unwrap();
            engine.submit_answer(session.id, item.id, 1).unwrap();
        }

        // Assert
        let stored = engine.session(session.id).unwrap();
        assert_eq!(stored.status, SessionStatus::Completed);
        assert!(stored.completed_at.is_some());
        assert!(engine.get_next_item(session.id).unwrap().is_none());
        assert!(matches!(
            engine.submit_answer(session.id, ItemId(20), 0),
            Err(SessionError::SessionNotActive { status: SessionStatus::Completed, .. })
        ));
        let report = engine.report(session.id).unwrap();
        assert_eq!(report.termination_reason, Some(TerminationReason::MaxQuestions));
        assert!(report.confidence_interval.0 < report.theta);
    }

    #[test]
    fn abandon_session_is_terminal() {
        let engine = engine();
        let session = engine.start_session("u", "algebra").unwrap();
        let abandoned = engine.abandon_session(session.id).unwrap();
        assert_eq!(abandoned.status, SessionStatus::Abandoned);
        assert!(matches!(
            engine.abandon_session(session.id),
            Err(SessionError::SessionNotActive { .. })
        ));
        assert!(engine.get_next_item(session.id).unwrap().is_none());
        assert_eq!(
            engine.report(session.id).unwrap().termination_reason,
            Some(TerminationReason::Abandoned)
        );
    }

    /// Store that reports one spurious conflict per commit before delegating.
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemorySessionStore,
        conflict_next: AtomicBool,
        always_conflict: bool,
    }

    impl SessionStore for FlakyStore {
        fn insert(&self, session: Session) -> SessionResult<()> {
            self.inner.insert(session)
        }

        fn load(&self, session_id: Uuid) -> SessionResult<SessionSnapshot> {
            self.inner.load(session_id)
        }

        fn commit(
            &self, expected_version: u64, session: Session, record: AnswerRecord,
        ) -> SessionResult<Session> {
            if self.always_conflict || self.conflict_next.swap(false, Ordering::SeqCst) {
                return Err(SessionError::VersionConflict {
                    session_id: session.id,
                    expected: expected_version,
                    found: expected_version + 1,
                });
            }
            self.inner.commit(expected_version, session, record)
        }

        fn update_status(
            &self, session_id: Uuid, expected_version: u64, status: SessionStatus,
        ) -> SessionResult<Session> {
            self.inner.update_status(session_id, expected_version, status)
        }
    }

    #[test]
    fn commit_conflict_is_retried() {
        let store = FlakyStore { conflict_next: AtomicBool::new(true), ..Default::default() };
        let engine = AssessmentEngine::new(bank(), store, config()).unwrap();
        let session = engine.start_session("u", "algebra").unwrap();
        let record = engine.submit_answer(session.id, ItemId(2), 0).unwrap();
        assert_eq!(record.ordinal, 1);
        assert_eq!(engine.answers(session.id).unwrap().len(), 1);
        assert_eq!(engine.bank().get(ItemId(2)).unwrap().times_administered(), 1);
    }

    #[test]
    fn persistent_conflicts_raise_concurrent_modification() {
        let store = FlakyStore { always_conflict: true, ..Default::default() };
        let config = EngineConfig { max_commit_retries: 3, ..config() };
        let engine = AssessmentEngine::new(bank(), store, config).unwrap();
        let session = engine.start_session("u", "algebra").unwrap();
        assert_eq!(
            engine.submit_answer(session.id, ItemId(2), 0).unwrap_err(),
            SessionError::ConcurrentModification { session_id: session.id, attempts: 3 }
        );
        assert_eq!(engine.bank().get(ItemId(2)).unwrap().times_administered(), 0);
        assert_eq!(engine.session(session.id).unwrap().question_count, 0);
    }
}
