//! Session state machine.
//!
//! ```text
//! Active(classic) --exact guess--------------> Over(won)
//! Active(classic) --10th miss-----------------> Over(lost)
//! Active(timed)   --exact guess within limit--> Over(won)
//! Active(timed)   --guess after limit---------> Over(lost)  (call fails with TimeExpired)
//! Active(*)       --expire-------------------> Over(lost)
//! ```
//!
//! Every function here is pure: it takes a snapshot plus the current time and
//! returns a new snapshot. Persisting results atomically is the caller's job.

use crate::code::Code;
use crate::error::GameError;
use crate::history::{GuessRecord, RecordId};
use crate::scoring::score;
use crate::session::{Mode, ModeKind, Session, SessionId, SessionStatus};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

/// Attempts granted to a classic session.
pub const CLASSIC_ATTEMPTS: u32 = 10;

/// Time limit used for timed sessions when none is requested.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 60;

/// Result of a guess that passed shape validation and terminal-state guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    /// The guess was scored and recorded.
    Accepted {
        /// Session after the guess.
        session: Session,
        /// The new history record.
        record: GuessRecord,
    },
    /// The timed session's clock had already run out. The returned session is
    /// lost and must be persisted; the guess itself is discarded.
    TimedOut {
        /// Session after expiry.
        session: Session,
    },
}

/// Identity for the record a guess will produce if accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSlot {
    /// Identifier for the new record.
    pub id: RecordId,
    /// 1-based position of the guess in the session's history.
    pub ordinal: u32,
}

impl RecordSlot {
    /// Creates a slot.
    pub fn new(id: RecordId, ordinal: u32) -> Self {
        Self { id, ordinal }
    }
}

/// Starts a session from a supplied secret.
///
/// `time_limit_secs` applies to timed sessions only and defaults to
/// [`DEFAULT_TIME_LIMIT_SECS`].
///
/// # Errors
///
/// Returns [`GameError::SecretUnavailable`] if `supplied` is not exactly four
/// integers in 0-7.
#[instrument(skip(supplied), fields(session_id = %id, mode = %kind))]
pub fn create_session(
    id: SessionId,
    kind: ModeKind,
    time_limit_secs: Option<u32>,
    supplied: &[i64],
    now: DateTime<Utc>,
) -> Result<Session, GameError> {
    let secret = Code::from_raw(supplied).map_err(|e| {
        warn!(error = %e, len = supplied.len(), "Supplier returned a malformed secret");
        GameError::SecretUnavailable(format!("malformed secret: {}", e))
    })?;

    let mode = match kind {
        ModeKind::Classic => {
            if time_limit_secs.is_some() {
                debug!("Ignoring time limit for classic session");
            }
            Mode::Classic {
                attempts_left: CLASSIC_ATTEMPTS,
            }
        }
        ModeKind::Timed => Mode::Timed {
            start_time: now,
            time_limit_secs: time_limit_secs.unwrap_or(DEFAULT_TIME_LIMIT_SECS),
        },
    };

    info!(?mode, "Session created");
    Ok(Session::start(id, secret, mode, now))
}

/// Scores a guess against an active session.
///
/// Checks run in this order: guess shape, timed-mode deadline, classic
/// attempts, terminal status. A late guess on a live timed session yields
/// [`GuessOutcome::TimedOut`] rather than an error so the caller can commit
/// the expiry before reporting [`GameError::TimeExpired`].
///
/// # Errors
///
/// - [`GameError::InvalidGuessShape`] for anything but four digits in 0-7
/// - [`GameError::NoAttemptsRemaining`] for a classic session with no attempts
/// - [`GameError::SessionAlreadyOver`] for any other terminal session
#[instrument(
    skip(session, guess, slot),
    fields(session_id = %session.id(), ordinal = slot.ordinal)
)]
pub fn submit_guess(
    session: &Session,
    guess: &[i64],
    slot: RecordSlot,
    now: DateTime<Utc>,
) -> Result<GuessOutcome, GameError> {
    let guess = Code::from_raw(guess).map_err(|e| {
        warn!(error = %e, "Rejected malformed guess");
        GameError::InvalidGuessShape(e)
    })?;

    match *session.mode() {
        Mode::Timed { .. } if !session.is_over() && session.is_past_deadline(now) => {
            info!("Guess arrived after the time limit; expiring session");
            return Ok(GuessOutcome::TimedOut {
                session: session.with_status(SessionStatus::Lost),
            });
        }
        Mode::Classic { attempts_left } if attempts_left == 0 => {
            warn!("Guess submitted with no attempts remaining");
            return Err(GameError::NoAttemptsRemaining(*session.id()));
        }
        _ => {}
    }

    if session.is_over() {
        warn!(status = %session.status(), "Guess submitted to finished session");
        return Err(GameError::SessionAlreadyOver(*session.id()));
    }

    let result = score(session.secret(), &guess);
    let record = GuessRecord::new(slot.id, *session.id(), slot.ordinal, guess, result, now);

    let mode = match *session.mode() {
        Mode::Classic { attempts_left } => Mode::Classic {
            attempts_left: attempts_left - 1,
        },
        timed @ Mode::Timed { .. } => timed,
    };
    let mut next = session.with_mode(mode);

    if result.is_exact() {
        next = next.with_status(SessionStatus::Won);
    } else if next.attempts_left() == Some(0) {
        next = next.with_status(SessionStatus::Lost);
    }

    info!(
        correct_positions = result.correct_positions(),
        correct_numbers = result.correct_numbers(),
        attempts_left = ?next.attempts_left(),
        status = %next.status(),
        "Guess accepted"
    );

    Ok(GuessOutcome::Accepted {
        session: next,
        record,
    })
}

/// Ends a session as lost unless it is already over.
///
/// Idempotent: a terminal session is returned unchanged.
#[instrument(skip(session), fields(session_id = %session.id()))]
pub fn expire_session(session: &Session) -> Session {
    if session.is_over() {
        debug!(status = %session.status(), "Session already over; expiry is a no-op");
        return session.clone();
    }
    info!("Session expired");
    session.with_status(SessionStatus::Lost)
}
