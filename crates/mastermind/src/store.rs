//! Session and history storage.
//!
//! ## Exclusive steps
//!
//! [`GameStore::apply`] is the only way a stored session changes. The store
//! loads the session while holding its exclusivity guard (a mutex for
//! [`MemoryStore`], an `IMMEDIATE` transaction for
//! [`SqliteStore`](crate::SqliteStore)), hands it to a pure step closure, and
//! persists the step's [`Commit`] before releasing the guard. A step can both
//! commit and fail, which is how lazy timed expiry is recorded.

use crate::error::{ServiceError, StoreError};
use chrono::{DateTime, Utc};
use mastermind_engine::{GameError, GuessRecord, History, Session, SessionId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};

/// State changes produced by one step.
#[derive(Debug, Clone)]
pub struct Commit {
    /// Replacement session snapshot.
    pub session: Session,
    /// History record to append, if the step accepted a guess.
    pub record: Option<GuessRecord>,
    /// When the change happened, as seen by the caller's clock.
    pub updated_at: DateTime<Utc>,
}

/// Output of a step closure: what to persist, and what to report.
#[derive(Debug)]
pub struct Step<T> {
    /// Changes to persist, if any.
    pub commit: Option<Commit>,
    /// Value or rule error returned to the caller after the commit.
    pub result: Result<T, GameError>,
}

impl<T> Step<T> {
    /// A step that persists `commit` and succeeds with `value`.
    pub fn commit(commit: Commit, value: T) -> Self {
        Self {
            commit: Some(commit),
            result: Ok(value),
        }
    }

    /// A step that persists `commit` and then reports `error`.
    pub fn commit_and_fail(commit: Commit, error: GameError) -> Self {
        Self {
            commit: Some(commit),
            result: Err(error),
        }
    }

    /// A step that changes nothing and succeeds with `value`.
    pub fn unchanged(value: T) -> Self {
        Self {
            commit: None,
            result: Ok(value),
        }
    }

    /// A step that changes nothing and reports `error`.
    pub fn reject(error: GameError) -> Self {
        Self {
            commit: None,
            result: Err(error),
        }
    }
}

/// Session store plus append-only history store.
pub trait GameStore: Send + Sync {
    /// Persists a newly created session.
    fn insert_session(&self, session: &Session) -> Result<(), StoreError>;

    /// Loads a session, `None` if it does not exist.
    fn load_session(&self, id: &SessionId) -> Result<Option<Session>, ServiceError>;

    /// Lists every session, newest first.
    fn list_sessions(&self) -> Result<Vec<Session>, ServiceError>;

    /// Reads a session's history, oldest first.
    fn history(&self, id: &SessionId) -> Result<Vec<GuessRecord>, ServiceError>;

    /// Runs `step` on the session under exclusive access and persists its commit.
    ///
    /// The closure receives the current session and the ordinal the next
    /// history record must carry.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::SessionNotFound`] if `id` is unknown, a store error
    /// if persisting fails, or whatever rule error the step reports.
    fn apply<T, F>(&self, id: &SessionId, step: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&Session, u32) -> Step<T>;
}

#[derive(Debug)]
struct Entry {
    session: Session,
    history: History,
}

/// In-memory store backed by a mutex-guarded map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<SessionId, Entry>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory store");
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<SessionId, Entry>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::new("Memory store lock poisoned"))
    }
}

impl GameStore for MemoryStore {
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    fn insert_session(&self, session: &Session) -> Result<(), StoreError> {
        let mut entries = self.lock()?;
        if entries.contains_key(session.id()) {
            warn!("Session already exists");
            return Err(StoreError::new(format!(
                "Session {} already exists",
                session.id()
            )));
        }
        entries.insert(
            *session.id(),
            Entry {
                session: session.clone(),
                history: History::new(),
            },
        );
        debug!("Session stored");
        Ok(())
    }

    #[instrument(skip(self))]
    fn load_session(&self, id: &SessionId) -> Result<Option<Session>, ServiceError> {
        let entries = self.lock()?;
        Ok(entries.get(id).map(|e| e.session.clone()))
    }

    #[instrument(skip(self))]
    fn list_sessions(&self) -> Result<Vec<Session>, ServiceError> {
        let entries = self.lock()?;
        let mut sessions: Vec<Session> =
            entries.values().map(|e| e.session.clone()).collect();
        sessions.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        debug!(count = sessions.len(), "Listed sessions");
        Ok(sessions)
    }

    #[instrument(skip(self))]
    fn history(&self, id: &SessionId) -> Result<Vec<GuessRecord>, ServiceError> {
        let entries = self.lock()?;
        Ok(entries
            .get(id)
            .map(|e| e.history.records().to_vec())
            .unwrap_or_default())
    }

    #[instrument(skip(self, step))]
    fn apply<T, F>(&self, id: &SessionId, step: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&Session, u32) -> Step<T>,
    {
        let mut entries = self.lock()?;
        let entry = entries
            .get_mut(id)
            .ok_or(GameError::SessionNotFound(*id))?;

        let Step { commit, result } = step(&entry.session, entry.history.next_ordinal());

        if let Some(Commit { session, record, .. }) = commit {
            if let Some(record) = record
                && !entry.history.append(record)
            {
                return Err(StoreError::new("History record rejected by ledger").into());
            }
            entry.session = session;
            debug!("Step committed");
        }

        Ok(result?)
    }
}
