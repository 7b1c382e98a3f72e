//! Mastermind engine - pure code-breaking rules.
//!
//! A player guesses a hidden four-digit code (digits 0-7, repeats allowed)
//! and receives exact-match and value-match counts after each guess.
//!
//! # Architecture
//!
//! - **Code**: validated digits and four-digit codes
//! - **Scoring**: duplicate-safe two-pass feedback
//! - **Session**: immutable session snapshots, classic or timed
//! - **Engine**: create / guess / expire transitions
//! - **History**: append-only guess records
//!
//! No I/O happens here. Time, identifiers and supplied secrets are passed in,
//! and persisting the returned snapshots is left to the caller.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use mastermind_engine::{
//!     GuessOutcome, ModeKind, RecordId, RecordSlot, SessionId, create_session, submit_guess,
//! };
//!
//! let now = Utc::now();
//! let session = create_session(SessionId::random(), ModeKind::Classic, None, &[4, 2, 6, 1], now)?;
//! assert!(session.reveal_secret_if_over().is_none());
//!
//! let slot = RecordSlot::new(RecordId::random(), 1);
//! match submit_guess(&session, &[4, 2, 6, 1], slot, now)? {
//!     GuessOutcome::Accepted { session, record } => {
//!         assert!(session.is_win());
//!         assert_eq!(*record.score().correct_positions(), 4);
//!     }
//!     GuessOutcome::TimedOut { .. } => unreachable!("classic sessions never time out"),
//! }
//! # Ok::<(), mastermind_engine::GameError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod code;
mod engine;
mod error;
mod history;
mod scoring;
mod session;

pub use code::{CODE_LENGTH, Code, Digit, MAX_DIGIT, ShapeError, raw_digits};
pub use engine::{
    CLASSIC_ATTEMPTS, DEFAULT_TIME_LIMIT_SECS, GuessOutcome, RecordSlot, create_session,
    expire_session, submit_guess,
};
pub use error::GameError;
pub use history::{GuessRecord, History, RecordId};
pub use scoring::{Score, score};
pub use session::{Mode, ModeKind, Session, SessionId, SessionRecord, SessionStatus, SessionView};
