//! Database rows and their conversions to engine types.

use chrono::{DateTime, NaiveDateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use mastermind_engine::{
    Code, GameError, GuessRecord, ModeKind, RecordId, Score, Session, SessionId, SessionRecord,
};
use tracing::instrument;

use crate::db::schema;
use crate::error::StoreError;

fn corrupt(what: &str, value: &str, err: impl std::fmt::Display) -> GameError {
    GameError::CorruptRecord(format!("invalid {} '{}': {}", what, value, err))
}

#[track_caller]
fn to_column(value: u32, column: &str) -> Result<i32, StoreError> {
    i32::try_from(value)
        .map_err(|_| StoreError::new(format!("{} {} overflows column", column, value)))
}

fn from_column(value: i32, column: &str) -> Result<u32, GameError> {
    u32::try_from(value).map_err(|e| corrupt(column, &value.to_string(), e))
}

/// Stored session row.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::sessions)]
pub(crate) struct SessionRow {
    id: String,
    secret: String,
    mode: String,
    attempts_left: Option<i32>,
    start_time: Option<NaiveDateTime>,
    time_limit_secs: Option<i32>,
    is_win: bool,
    is_over: bool,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl SessionRow {
    /// Parses the row back into a session, re-checking every invariant.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CorruptRecord`] for any unparseable column or
    /// inconsistent flag combination.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub(crate) fn into_session(self) -> Result<Session, GameError> {
        let record = SessionRecord {
            id: self
                .id
                .parse::<SessionId>()
                .map_err(|e| corrupt("session id", &self.id, e))?,
            secret: self
                .secret
                .parse::<Code>()
                .map_err(|e| corrupt("secret", "<hidden>", e))?,
            mode: self
                .mode
                .parse::<ModeKind>()
                .map_err(|e| corrupt("mode", &self.mode, e))?,
            attempts_left: self
                .attempts_left
                .map(|v| from_column(v, "attempts_left"))
                .transpose()?,
            start_time: self.start_time.map(|t| t.and_utc()),
            time_limit_secs: self
                .time_limit_secs
                .map(|v| from_column(v, "time_limit_secs"))
                .transpose()?,
            is_win: self.is_win,
            is_over: self.is_over,
            created_at: self.created_at.and_utc(),
        };
        Session::from_record(record)
    }
}

/// Insertable session row.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::sessions)]
pub(crate) struct NewSessionRow {
    id: String,
    secret: String,
    mode: String,
    attempts_left: Option<i32>,
    start_time: Option<NaiveDateTime>,
    time_limit_secs: Option<i32>,
    is_win: bool,
    is_over: bool,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl NewSessionRow {
    /// Flattens a session into a row.
    #[track_caller]
    pub(crate) fn from_session(session: &Session) -> Result<Self, StoreError> {
        let record = session.to_record();
        let created_at = record.created_at.naive_utc();
        Ok(Self::new(
            record.id.to_string(),
            record.secret.to_string(),
            record.mode.to_string(),
            record
                .attempts_left
                .map(|v| to_column(v, "attempts_left"))
                .transpose()?,
            record.start_time.map(|t| t.naive_utc()),
            record
                .time_limit_secs
                .map(|v| to_column(v, "time_limit_secs"))
                .transpose()?,
            record.is_win,
            record.is_over,
            created_at,
            created_at,
        ))
    }
}

/// Mutable session columns. Only counters and status ever change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::sessions)]
pub(crate) struct SessionChanges {
    attempts_left: Option<i32>,
    is_win: bool,
    is_over: bool,
    updated_at: NaiveDateTime,
}

impl SessionChanges {
    /// Collects the mutable columns of `session`.
    #[track_caller]
    pub(crate) fn from_session(session: &Session, now: DateTime<Utc>) -> Result<Self, StoreError> {
        Ok(Self {
            attempts_left: session
                .attempts_left()
                .map(|v| to_column(v, "attempts_left"))
                .transpose()?,
            is_win: session.is_win(),
            is_over: session.is_over(),
            updated_at: now.naive_utc(),
        })
    }
}

/// Stored guess record row.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::guess_records)]
pub(crate) struct GuessRow {
    id: String,
    session_id: String,
    ordinal: i32,
    guess: String,
    correct_numbers: i32,
    correct_positions: i32,
    created_at: NaiveDateTime,
}

impl GuessRow {
    /// Parses the row back into a guess record.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CorruptRecord`] for any unparseable column.
    #[instrument(skip(self), fields(record_id = %self.id))]
    pub(crate) fn into_record(self) -> Result<GuessRecord, GameError> {
        let count = |v: i32, column: &str| {
            u8::try_from(v).map_err(|e| corrupt(column, &v.to_string(), e))
        };
        Ok(GuessRecord::new(
            self.id
                .parse::<RecordId>()
                .map_err(|e| corrupt("record id", &self.id, e))?,
            self.session_id
                .parse::<SessionId>()
                .map_err(|e| corrupt("session id", &self.session_id, e))?,
            from_column(self.ordinal, "ordinal")?,
            self.guess
                .parse::<Code>()
                .map_err(|e| corrupt("guess", &self.guess, e))?,
            Score::new(
                count(self.correct_positions, "correct_positions")?,
                count(self.correct_numbers, "correct_numbers")?,
            ),
            self.created_at.and_utc(),
        ))
    }
}

/// Insertable guess record row.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::guess_records)]
pub(crate) struct NewGuessRow {
    id: String,
    session_id: String,
    ordinal: i32,
    guess: String,
    correct_numbers: i32,
    correct_positions: i32,
    created_at: NaiveDateTime,
}

impl NewGuessRow {
    /// Flattens a guess record into a row.
    #[track_caller]
    pub(crate) fn from_record(record: &GuessRecord) -> Result<Self, StoreError> {
        Ok(Self::new(
            record.id().to_string(),
            record.session_id().to_string(),
            to_column(*record.ordinal(), "ordinal")?,
            record.guess().to_string(),
            i32::from(*record.score().correct_numbers()),
            i32::from(*record.score().correct_positions()),
            record.created_at().naive_utc(),
        ))
    }
}
