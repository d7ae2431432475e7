//! Session persistence seam with optimistic concurrency.
//!
//! Purpose
//! -------
//! Decouple the engine from where sessions and answer records live. The
//! engine only needs four operations, and [`SessionStore::commit`] is the
//! one that must be atomic: it checks the expected version, writes the new
//! session state and appends the audit record as one unit.
//!
//! Key behaviors
//! -------------
//! - Every successful write bumps `version` by one and returns the stored
//!   session.
//! - A stale `expected_version` yields [`SessionError::VersionConflict`]
//!   and writes nothing; the engine reloads and retries.
//! - [`InMemorySessionStore`] keeps everything in a `RwLock<HashMap>`; a
//!   commit holds the write lock across check, write and append.
//!
//! Conventions
//! -----------
//! - Records are returned in commit (ordinal) order.
use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use chrono::Utc;
use uuid::Uuid;

use crate::session::{
    errors::{SessionError, SessionResult},
    types::{AnswerRecord, Session, SessionStatus},
};

/// A consistent view of one session and its audit log.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session: Session,
    pub records: Vec<AnswerRecord>,
}

pub trait SessionStore: Send + Sync {
    /// Persist a new session.
    ///
    /// # Errors
    /// [`SessionError::DuplicateSession`] if the id is taken.
    fn insert(&self, session: Session) -> SessionResult<()>;

    /// Load the session together with its records.
    ///
    /// # Errors
    /// [`SessionError::SessionNotFound`] for unknown ids.
    fn load(&self, session_id: Uuid) -> SessionResult<SessionSnapshot>;

    /// Atomically replace the session and append `record`, provided the
    /// stored version still equals `expected_version`.
    ///
    /// # Errors
    /// - [`SessionError::SessionNotFound`] for unknown ids.
    /// - [`SessionError::VersionConflict`] if another writer got there first.
    fn commit(
        &self, expected_version: u64, session: Session, record: AnswerRecord,
    ) -> SessionResult<Session>;

    /// Change only the status, under the same version check as `commit`.
    fn update_status(
        &self, session_id: Uuid, expected_version: u64, status: SessionStatus,
    ) -> SessionResult<Session>;
}

#[derive(Debug)]
struct Entry {
    session: Session,
    records: Vec<AnswerRecord>,
}

/// Process-local [`SessionStore`].
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<Uuid, Entry>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn check_version(session_id: Uuid, expected: u64, stored: &Session) -> SessionResult<()> {
    if stored.version != expected {
        return Err(SessionError::VersionConflict { session_id, expected, found: stored.version });
    }
    Ok(())
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, session: Session) -> SessionResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&session.id) {
            return Err(SessionError::DuplicateSession { session_id: session.id });
        }
        entries.insert(session.id, Entry { session, records: Vec::new() });
        Ok(())
    }

    fn load(&self, session_id: Uuid) -> SessionResult<SessionSnapshot> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(&session_id).ok_or(SessionError::SessionNotFound { session_id })?;
        Ok(SessionSnapshot { session: entry.session.clone(), records: entry.records.clone() })
    }

    fn commit(
        &self, expected_version: u64, mut session: Session, record: AnswerRecord,
    ) -> SessionResult<Session> {
        let session_id = session.id;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry =
            entries.get_mut(&session_id).ok_or(SessionError::SessionNotFound { session_id })?;
        check_version(session_id, expected_version, &entry.session)?;
        session.version = expected_version + 1;
        entry.session = session.clone();
        entry.records.push(record);
        Ok(session)
    }

    fn update_status(
        &self, session_id: Uuid, expected_version: u64, status: SessionStatus,
    ) -> SessionResult<Session> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry =
            entries.get_mut(&session_id).ok_or(SessionError::SessionNotFound { session_id })?;
        check_version(session_id, expected_version, &entry.session)?;
        entry.session.status = status;
        entry.session.last_activity = Utc::now();
        entry.session.version = expected_version + 1;
        Ok(entry.session.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::ItemId;

    fn record(session: &Session, ordinal: u32) -> AnswerRecord {
        AnswerRecord {
            session_id: session.id,
            item_id: ItemId(ordinal as u64),
            selected_option: 0,
            is_correct: true,
            theta_before: 0.0,
            theta_after: 0.5,
            se_before: 1.0,
            se_after: 0.9,
            ordinal,
            estimate_converged: true,
            time_taken_seconds: None,
            answered_at: Utc::now(),
        }
    }

    #[test]
    fn insert_rejects_duplicates_and_load_reports_missing() {
        let store = InMemorySessionStore::new();
        let session = Session::new("u", "algebra");
        store.insert(session.clone()).unwrap();
        assert_eq!(
            store.insert(session.clone()).unwrap_err(),
            SessionError::DuplicateSession { session_id: session.id }
        );
        let missing = Uuid::new_v4();
        assert_eq!(
            store.load(missing).unwrap_err(),
            SessionError::SessionNotFound { session_id: missing }
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    // Purpose
    // -------
    // A commit bumps the version and appends the record; a second commit
    // against the stale version is rejected without writing anything.
    fn commit_enforces_expected_version() {
        // Arrange
        let store = InMemorySessionStore::new();
        let session = Session::new("u", "algebra");
        store.insert(session.clone()).unwrap();

        // Act
        let mut next = session.clone();
        next.question_count = 1;
        let committed = store.commit(0, next.clone(), record(&session, 1)).unwrap();
        let stale = store.commit(0, next, record(&session, 1));

        // Assert
        assert_eq!(committed.version, 1);
        assert_eq!(
            stale.unwrap_err(),
            SessionError::VersionConflict { session_id: session.id, expected: 0, found: 1 }
        );
        let snapshot = store.load(session.id).unwrap();
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.session.question_count, 1);
    }

    #[test]
    fn update_status_changes_status_and_version() {
        let store = InMemorySessionStore::new();
        let session = Session::new("u", "algebra");
        store.insert(session.clone()).unwrap();
        let updated = store.update_status(session.id, 0, SessionStatus::Abandoned).unwrap();
        assert_eq!(updated.status, SessionStatus::Abandoned);
        assert_eq!(updated.version, 1);
        assert!(matches!(
            store.update_status(session.id, 0, SessionStatus::Active),
            Err(SessionError::VersionConflict { .. })
        ));
    }
}
