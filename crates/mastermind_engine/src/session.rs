//! The session record.
//!
//! A [`Session`] is an immutable snapshot. The engine produces new snapshots
//! instead of mutating shared ones, so the only way to observe a secret is
//! [`Session::reveal_secret_if_over`].

use crate::code::Code;
use crate::error::GameError;
use chrono::{DateTime, TimeDelta, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;
use uuid::Uuid;

/// Stand-in for the secret in `Debug` output.
const REDACTED: &str = "<redacted>";

/// Unique identifier for a game session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a fresh random id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Which variant of the game a session plays.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ModeKind {
    /// Limited number of attempts.
    Classic,
    /// Limited wall-clock time.
    Timed,
}

/// Mode-specific session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Mode {
    /// Attempt-limited play.
    Classic {
        /// Guesses still allowed.
        attempts_left: u32,
    },
    /// Time-limited play.
    Timed {
        /// When the session was created.
        start_time: DateTime<Utc>,
        /// Seconds allowed from `start_time`.
        time_limit_secs: u32,
    },
}

impl Mode {
    /// Returns the mode's kind.
    pub fn kind(&self) -> ModeKind {
        match self {
            Self::Classic { .. } => ModeKind::Classic,
            Self::Timed { .. } => ModeKind::Timed,
        }
    }
}

/// Lifecycle position of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    /// Guesses are accepted.
    Active,
    /// The secret was guessed. Terminal.
    Won,
    /// Attempts or time ran out, or the session was expired. Terminal.
    Lost,
}

/// One game instance.
///
/// `Debug` output never includes the secret.
#[derive(Clone, PartialEq, Eq, Getters)]
pub struct Session {
    /// Session identifier.
    id: SessionId,
    #[getter(skip)]
    secret: Code,
    /// Mode and its counters.
    mode: Mode,
    /// Current lifecycle status.
    status: SessionStatus,
    /// Creation time.
    created_at: DateTime<Utc>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("secret", &REDACTED)
            .field("mode", &self.mode)
            .field("status", &self.status)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl Session {
    pub(crate) fn start(
        id: SessionId,
        secret: Code,
        mode: Mode,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            secret,
            mode,
            status: SessionStatus::Active,
            created_at,
        }
    }

    pub(crate) fn secret(&self) -> &Code {
        &self.secret
    }

    pub(crate) fn with_mode(&self, mode: Mode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }

    pub(crate) fn with_status(&self, status: SessionStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Whether the secret has been guessed.
    pub fn is_win(&self) -> bool {
        self.status == SessionStatus::Won
    }

    /// Whether the session has reached a terminal status.
    pub fn is_over(&self) -> bool {
        self.status != SessionStatus::Active
    }

    /// Returns the mode kind.
    pub fn kind(&self) -> ModeKind {
        self.mode.kind()
    }

    /// Attempts left, for classic sessions.
    pub fn attempts_left(&self) -> Option<u32> {
        match self.mode {
            Mode::Classic { attempts_left } => Some(attempts_left),
            Mode::Timed { .. } => None,
        }
    }

    /// Start time, for timed sessions.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        match self.mode {
            Mode::Timed { start_time, .. } => Some(start_time),
            Mode::Classic { .. } => None,
        }
    }

    /// Time limit in seconds, for timed sessions.
    pub fn time_limit_secs(&self) -> Option<u32> {
        match self.mode {
            Mode::Timed {
                time_limit_secs, ..
            } => Some(time_limit_secs),
            Mode::Classic { .. } => None,
        }
    }

    /// Whole seconds left on a timed session's clock, saturating at zero.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<u32> {
        let Mode::Timed {
            start_time,
            time_limit_secs,
        } = self.mode
        else {
            return None;
        };
        let left_ms = i64::from(time_limit_secs) * 1000 - (now - start_time).num_milliseconds();
        Some(u32::try_from(left_ms.div_euclid(1000).max(0)).unwrap_or(u32::MAX))
    }

    /// Whether a timed session's elapsed time is strictly past its limit.
    ///
    /// Always false for classic sessions.
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        match self.mode {
            Mode::Timed {
                start_time,
                time_limit_secs,
            } => now - start_time > TimeDelta::seconds(i64::from(time_limit_secs)),
            Mode::Classic { .. } => false,
        }
    }

    /// Returns the secret once the session is over, `None` while it is active.
    pub fn reveal_secret_if_over(&self) -> Option<&Code> {
        self.is_over().then_some(&self.secret)
    }

    /// Builds the caller-facing snapshot.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn view(&self, now: DateTime<Utc>) -> SessionView {
        SessionView {
            id: self.id,
            mode: self.kind(),
            attempts_left: self.attempts_left(),
            start_time: self.start_time(),
            time_limit: self.time_limit_secs(),
            time_remaining: self
                .time_remaining(now)
                .map(|left| if self.is_over() { 0 } else { left }),
            status: self.status,
            is_win: self.is_win(),
            is_over: self.is_over(),
            created_at: self.created_at,
            secret: self.reveal_secret_if_over().copied(),
        }
    }

    /// Flattens the session for persistence, secret included.
    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            id: self.id,
            secret: self.secret,
            mode: self.kind(),
            attempts_left: self.attempts_left(),
            start_time: self.start_time(),
            time_limit_secs: self.time_limit_secs(),
            is_win: self.is_win(),
            is_over: self.is_over(),
            created_at: self.created_at,
        }
    }

    /// Restores a session from its persisted form.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CorruptRecord`] if the mode fields do not match the
    /// mode, or if the record is marked won without being over.
    #[instrument(skip(record), fields(session_id = %record.id))]
    pub fn from_record(record: SessionRecord) -> Result<Self, GameError> {
        let mode = match (
            record.mode,
            record.attempts_left,
            record.start_time,
            record.time_limit_secs,
        ) {
            (ModeKind::Classic, Some(attempts_left), None, None) => Mode::Classic { attempts_left },
            (ModeKind::Timed, None, Some(start_time), Some(time_limit_secs)) => Mode::Timed {
                start_time,
                time_limit_secs,
            },
            (kind, ..) => {
                return Err(GameError::CorruptRecord(format!(
                    "{} session {} has mismatched mode fields",
                    kind, record.id
                )));
            }
        };

        let status = match (record.is_win, record.is_over) {
            (false, false) => SessionStatus::Active,
            (true, true) => SessionStatus::Won,
            (false, true) => SessionStatus::Lost,
            (true, false) => {
                return Err(GameError::CorruptRecord(format!(
                    "session {} is won but not over",
                    record.id
                )));
            }
        };

        Ok(Self {
            id: record.id,
            secret: record.secret,
            mode,
            status,
            created_at: record.created_at,
        })
    }
}

/// Flat persistence form of a [`Session`].
///
/// Holds the secret unconditionally; never hand it to a caller. `Debug`
/// output redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Session identifier.
    pub id: SessionId,
    /// The secret code.
    pub secret: Code,
    /// Mode kind.
    pub mode: ModeKind,
    /// Attempts left (classic only).
    pub attempts_left: Option<u32>,
    /// Start time (timed only).
    pub start_time: Option<DateTime<Utc>>,
    /// Time limit in seconds (timed only).
    pub time_limit_secs: Option<u32>,
    /// Won flag.
    pub is_win: bool,
    /// Over flag.
    pub is_over: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRecord")
            .field("id", &self.id)
            .field("secret", &REDACTED)
            .field("mode", &self.mode)
            .field("attempts_left", &self.attempts_left)
            .field("start_time", &self.start_time)
            .field("time_limit_secs", &self.time_limit_secs)
            .field("is_win", &self.is_win)
            .field("is_over", &self.is_over)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Caller-facing session snapshot.
///
/// `secret` is populated only for sessions that are over.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    id: SessionId,
    mode: ModeKind,
    attempts_left: Option<u32>,
    start_time: Option<DateTime<Utc>>,
    time_limit: Option<u32>,
    time_remaining: Option<u32>,
    status: SessionStatus,
    is_win: bool,
    is_over: bool,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    secret: Option<Code>,
}
