//! Error taxonomy for session operations.

use crate::code::ShapeError;
use crate::session::SessionId;

/// Why a session operation was rejected.
///
/// Every variant except [`GameError::TimeExpired`] is raised before any state
/// changes. `TimeExpired` is reported after the session has been moved to a
/// lost terminal state.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GameError {
    /// The secret supplier failed or produced a malformed sequence.
    #[display("Secret unavailable: {}", _0)]
    SecretUnavailable(String),

    /// The guess is not four digits in 0-7.
    #[display("Invalid guess: {}", _0)]
    InvalidGuessShape(ShapeError),

    /// The session has already ended.
    #[display("Session {} is already over", _0)]
    SessionAlreadyOver(SessionId),

    /// A classic session has no attempts left.
    #[display("No attempts remaining in session {}", _0)]
    NoAttemptsRemaining(SessionId),

    /// A timed session ran past its limit; it is now lost.
    #[display("Time expired for session {}", _0)]
    TimeExpired(SessionId),

    /// No session exists with this id.
    #[display("Session {} not found", _0)]
    SessionNotFound(SessionId),

    /// A stored session record breaks a session invariant.
    #[display("Corrupt session record: {}", _0)]
    CorruptRecord(String),
}

impl std::error::Error for GameError {}
