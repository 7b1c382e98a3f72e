//! Digits and four-digit codes.
//!
//! Secrets and guesses share one representation: exactly [`CODE_LENGTH`]
//! digits, each in `0..=MAX_DIGIT`. Raw integer slices coming from outside
//! the engine are checked here before anything else looks at them.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// Number of digits in every code.
pub const CODE_LENGTH: usize = 4;

/// Largest allowed digit value.
pub const MAX_DIGIT: u8 = 7;

/// A single code digit in `0..=7`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "u8")]
pub struct Digit(u8);

impl Digit {
    /// Creates a digit, returning `None` when the value is out of range.
    pub fn new(value: i64) -> Option<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= MAX_DIGIT)
            .map(Self)
    }

    /// Returns the digit's value.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Digit {
    type Error = ShapeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ShapeError::DigitOutOfRange(value))
    }
}

impl From<Digit> for u8 {
    fn from(digit: Digit) -> Self {
        digit.0
    }
}

/// Why a raw sequence is not a valid code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ShapeError {
    /// Sequence did not contain exactly four values.
    #[display("expected {} digits, got {}", CODE_LENGTH, _0)]
    WrongLength(usize),

    /// A value fell outside `0..=7`.
    #[display("digit {} is outside 0-{}", _0, MAX_DIGIT)]
    DigitOutOfRange(i64),

    /// A character in a textual code was not a decimal digit.
    #[display("'{}' is not a digit", _0)]
    NotADigit(char),
}

impl std::error::Error for ShapeError {}

/// An ordered sequence of exactly four digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<u8>")]
pub struct Code([Digit; CODE_LENGTH]);

impl Code {
    /// Validates a raw integer sequence as a code.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] if the slice is not exactly four values in `0..=7`.
    #[instrument(level = "trace")]
    pub fn from_raw(raw: &[i64]) -> Result<Self, ShapeError> {
        if raw.len() != CODE_LENGTH {
            return Err(ShapeError::WrongLength(raw.len()));
        }
        let mut digits = [Digit(0); CODE_LENGTH];
        for (slot, value) in digits.iter_mut().zip(raw) {
            *slot = Digit::try_from(*value)?;
        }
        Ok(Self(digits))
    }

    /// Returns the digit values in order.
    pub fn values(&self) -> [u8; CODE_LENGTH] {
        self.0.map(Digit::value)
    }
}

impl TryFrom<Vec<i64>> for Code {
    type Error = ShapeError;

    fn try_from(raw: Vec<i64>) -> Result<Self, Self::Error> {
        Self::from_raw(&raw)
    }
}

impl From<Code> for Vec<u8> {
    fn from(code: Code) -> Self {
        code.values().to_vec()
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for digit in &self.0 {
            write!(f, "{}", digit)?;
        }
        Ok(())
    }
}

impl FromStr for Code {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_raw(&raw_digits(s)?)
    }
}

/// Splits text such as `"0427"` into raw integers, one per character.
///
/// Surrounding whitespace is ignored. Length and range are not checked here;
/// pass the result to [`Code::from_raw`] for that.
///
/// # Errors
///
/// Returns [`ShapeError::NotADigit`] for the first non-decimal character.
pub fn raw_digits(s: &str) -> Result<Vec<i64>, ShapeError> {
    s.trim()
        .chars()
        .map(|c| {
            c.to_digit(10)
                .map(i64::from)
                .ok_or(ShapeError::NotADigit(c))
        })
        .collect()
}
