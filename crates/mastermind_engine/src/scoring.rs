//! Guess scoring.

use crate::code::{CODE_LENGTH, Code};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Feedback for one guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Getters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    /// Digits matching in both value and position.
    correct_positions: u8,
    /// Digits present in the secret at another position.
    correct_numbers: u8,
}

impl Score {
    /// Creates a score from raw counts.
    pub fn new(correct_positions: u8, correct_numbers: u8) -> Self {
        Self {
            correct_positions,
            correct_numbers,
        }
    }

    /// Whether every digit is in place.
    pub fn is_exact(&self) -> bool {
        usize::from(self.correct_positions) == CODE_LENGTH
    }
}

/// Scores `guess` against `secret`.
///
/// Exact matches are consumed first so a digit counted in place can never be
/// counted again as a value match. Each remaining guess digit then consumes at
/// most one remaining secret digit of the same value.
#[instrument(level = "trace", skip_all)]
pub fn score(secret: &Code, guess: &Code) -> Score {
    let mut secret_left: [Option<u8>; CODE_LENGTH] = secret.values().map(Some);
    let mut guess_left: [Option<u8>; CODE_LENGTH] = guess.values().map(Some);
    let mut correct_positions = 0;
    let mut correct_numbers = 0;

    for (s, g) in secret_left.iter_mut().zip(guess_left.iter_mut()) {
        if s == g {
            correct_positions += 1;
            *s = None;
            *g = None;
        }
    }

    for g in guess_left.iter().flatten() {
        if let Some(slot) = secret_left.iter_mut().find(|s| **s == Some(*g)) {
            correct_numbers += 1;
            *slot = None;
        }
    }

    Score::new(correct_positions, correct_numbers)
}
