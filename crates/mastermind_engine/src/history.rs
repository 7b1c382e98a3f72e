//! Guess history.

use crate::code::Code;
use crate::scoring::Score;
use crate::session::SessionId;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{instrument, warn};
use uuid::Uuid;

/// Unique identifier for a guess record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generates a fresh random id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// One accepted guess and its score. Never changes once created.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessRecord {
    /// Record identifier.
    id: RecordId,
    /// Owning session.
    session_id: SessionId,
    /// 1-based position of this guess within its session.
    ordinal: u32,
    /// The guess as submitted.
    guess: Code,
    /// Feedback for the guess.
    #[serde(flatten)]
    score: Score,
    /// When the guess was accepted.
    created_at: DateTime<Utc>,
}

impl GuessRecord {
    /// Creates a record. Only the engine and stores restoring persisted rows
    /// should call this.
    pub fn new(
        id: RecordId,
        session_id: SessionId,
        ordinal: u32,
        guess: Code,
        score: Score,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            session_id,
            ordinal,
            guess,
            score,
            created_at,
        }
    }
}

/// Append-only, ordered guess ledger for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    records: Vec<GuessRecord>,
}

impl History {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    ///
    /// Returns `false` and leaves the ledger unchanged if the record belongs to
    /// another session than the ones already held, or does not follow the last
    /// ordinal.
    #[instrument(skip(self, record), fields(record_id = %record.id, ordinal = record.ordinal))]
    pub fn append(&mut self, record: GuessRecord) -> bool {
        let expected = self.next_ordinal();
        if let Some(first) = self.records.first()
            && first.session_id != record.session_id
        {
            warn!(
                session_id = %record.session_id,
                owner = %first.session_id,
                "Record belongs to another session"
            );
            return false;
        }
        if record.ordinal != expected {
            warn!(expected, got = record.ordinal, "Out-of-order history record");
            return false;
        }
        self.records.push(record);
        true
    }

    /// Ordinal the next accepted guess receives.
    pub fn next_ordinal(&self) -> u32 {
        self.records.last().map_or(1, |r| r.ordinal + 1)
    }

    /// Records in acceptance order, oldest first.
    pub fn records(&self) -> &[GuessRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no guess has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
