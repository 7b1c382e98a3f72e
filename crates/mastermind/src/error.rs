//! Service and storage error types.

use derive_more::{Display, Error, From};
use mastermind_engine::GameError;
use tracing::instrument;

/// Storage backend error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Storage error: {} at {}:{}", message, file, line)]
pub struct StoreError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new storage error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<diesel::result::Error> for StoreError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(format!("Diesel error: {}", err))
    }
}

impl From<diesel::ConnectionError> for StoreError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(format!("Connection error: {}", err))
    }
}

/// Any failure a [`GameService`](crate::GameService) operation can report.
#[derive(Debug, Display, From)]
pub enum ServiceError {
    /// The game rules rejected the operation.
    #[display("{}", _0)]
    Game(GameError),
    /// The store failed.
    #[display("{}", _0)]
    Store(StoreError),
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Game(e) => Some(e),
            Self::Store(e) => Some(e),
        }
    }
}

impl ServiceError {
    /// Returns the game-rule error, if that is what this is.
    pub fn as_game(&self) -> Option<&GameError> {
        match self {
            Self::Game(e) => Some(e),
            Self::Store(_) => None,
        }
    }
}

// Lets diesel transaction closures use `?` on queries directly.
impl From<diesel::result::Error> for ServiceError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::Store(StoreError::from(err))
    }
}
