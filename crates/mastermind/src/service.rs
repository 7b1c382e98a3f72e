//! Game service: the four caller-facing operations.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use mastermind_engine::{
    GameError, GuessOutcome, GuessRecord, ModeKind, RecordId, RecordSlot, Session, SessionId,
    SessionView, create_session, expire_session, submit_guess,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::ServiceError;
use crate::secret::SecretSupplier;
use crate::store::{Commit, GameStore, Step};

/// Result of an accepted guess.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessResult {
    /// Session after the guess.
    session: SessionView,
    /// The recorded guess and its score.
    record: GuessRecord,
}

/// Current state of a session with its full history.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Session snapshot.
    session: SessionView,
    /// Accepted guesses, oldest first.
    guesses: Vec<GuessRecord>,
}

/// Runs game operations against a store.
///
/// Each mutating call is a single [`GameStore::apply`] step, so the session
/// update and its history append land together or not at all.
#[derive(Clone)]
pub struct GameService<S> {
    store: S,
    supplier: Arc<dyn SecretSupplier>,
    clock: Arc<dyn Clock>,
    time_limit_secs: u32,
}

impl<S> std::fmt::Debug for GameService<S>
where
    S: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameService")
            .field("store", &self.store)
            .field("time_limit_secs", &self.time_limit_secs)
            .finish_non_exhaustive()
    }
}

impl<S: GameStore> GameService<S> {
    /// Creates a service using the system clock.
    #[instrument(skip(store, supplier))]
    pub fn new(store: S, supplier: Arc<dyn SecretSupplier>, time_limit_secs: u32) -> Self {
        info!("Creating GameService");
        Self::with_clock(store, supplier, Arc::new(SystemClock), time_limit_secs)
    }

    /// Creates a service with an explicit clock.
    #[instrument(skip(store, supplier, clock))]
    pub fn with_clock(
        store: S,
        supplier: Arc<dyn SecretSupplier>,
        clock: Arc<dyn Clock>,
        time_limit_secs: u32,
    ) -> Self {
        Self {
            store,
            supplier,
            clock,
            time_limit_secs,
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Starts a new session.
    ///
    /// `time_limit_secs` overrides the configured limit for timed sessions.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::SecretUnavailable`] if the supplier fails or
    /// returns a malformed secret; nothing is stored in that case.
    #[instrument(skip(self))]
    pub async fn create_session(
        &self,
        mode: ModeKind,
        time_limit_secs: Option<u32>,
    ) -> Result<SessionView, ServiceError> {
        let supplied = self.supplier.supply_secret().await.map_err(|e| {
            warn!(error = %e, "Secret supplier failed");
            GameError::SecretUnavailable(e.message)
        })?;

        let limit = match mode {
            ModeKind::Timed => Some(time_limit_secs.unwrap_or(self.time_limit_secs)),
            ModeKind::Classic => None,
        };
        let now = self.now();
        let session = create_session(SessionId::random(), mode, limit, &supplied, now)?;
        self.store.insert_session(&session)?;

        info!(session_id = %session.id(), mode = %mode, "New game started");
        Ok(session.view(now))
    }

    /// Submits a guess.
    ///
    /// # Errors
    ///
    /// Returns the engine's rule errors unchanged. For
    /// [`GameError::TimeExpired`] the session has already been stored as lost.
    #[instrument(skip(self, guess))]
    pub fn submit_guess(&self, id: &SessionId, guess: &[i64]) -> Result<GuessResult, ServiceError> {
        let now = self.now();
        self.store.apply(id, |session, ordinal| {
            let slot = RecordSlot::new(RecordId::random(), ordinal);
            match submit_guess(session, guess, slot, now) {
                Ok(GuessOutcome::Accepted { session, record }) => {
                    let result = GuessResult {
                        session: session.view(now),
                        record: record.clone(),
                    };
                    Step::commit(
                        Commit {
                            session,
                            record: Some(record),
                            updated_at: now,
                        },
                        result,
                    )
                }
                Ok(GuessOutcome::TimedOut { session }) => {
                    let id = *session.id();
                    Step::commit_and_fail(
                        Commit {
                            session,
                            record: None,
                            updated_at: now,
                        },
                        GameError::TimeExpired(id),
                    )
                }
                Err(e) => Step::reject(e),
            }
        })
    }

    /// Returns the session snapshot and its history.
    ///
    /// Read-only: an elapsed timed session is reported as still active until
    /// a guess or an expiry touches it.
    #[instrument(skip(self))]
    pub fn game_state(&self, id: &SessionId) -> Result<GameState, ServiceError> {
        let session = self.load(id)?;
        let guesses = self.store.history(id)?;
        debug!(count = guesses.len(), "Game state loaded");
        Ok(GameState {
            session: session.view(self.now()),
            guesses,
        })
    }

    /// Ends a session as lost. A session that is already over is returned as is.
    #[instrument(skip(self))]
    pub fn expire_session(&self, id: &SessionId) -> Result<SessionView, ServiceError> {
        let now = self.now();
        self.store.apply(id, |session, _| {
            let expired = expire_session(session);
            if expired == *session {
                Step::unchanged(expired.view(now))
            } else {
                let view = expired.view(now);
                Step::commit(
                    Commit {
                        session: expired,
                        record: None,
                        updated_at: now,
                    },
                    view,
                )
            }
        })
    }

    /// Returns a session's guesses, oldest first.
    #[instrument(skip(self))]
    pub fn history(&self, id: &SessionId) -> Result<Vec<GuessRecord>, ServiceError> {
        self.load(id)?;
        self.store.history(id)
    }

    /// Lists every session, newest first.
    #[instrument(skip(self))]
    pub fn list_sessions(&self) -> Result<Vec<SessionView>, ServiceError> {
        let now = self.now();
        Ok(self
            .store
            .list_sessions()?
            .iter()
            .map(|s| s.view(now))
            .collect())
    }

    fn load(&self, id: &SessionId) -> Result<Session, ServiceError> {
        self.store
            .load_session(id)?
            .ok_or_else(|| GameError::SessionNotFound(*id).into())
    }
}
