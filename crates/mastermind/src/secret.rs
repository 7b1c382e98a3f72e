//! Secret suppliers.
//!
//! A supplier only has to hand back some integers; the engine decides whether
//! they form a valid secret. Nothing here retries.

use async_trait::async_trait;
use derive_more::{Display, Error};
use mastermind_engine::{CODE_LENGTH, MAX_DIGIT};
use rand::Rng;
use tracing::{debug, error, info, instrument};

/// Produces the raw digits for a new secret.
#[async_trait]
pub trait SecretSupplier: Send + Sync {
    /// Fetches four integers intended to lie in 0-7.
    async fn supply_secret(&self) -> Result<Vec<i64>, SupplyError>;
}

/// Supplier failure with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Supply error: {} at {}:{}", message, file, line)]
pub struct SupplyError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SupplyError {
    /// Creates a new supplier error with caller location tracking.
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

/// Fetches secrets from the random.org plain-text integer API.
#[derive(Debug, Clone)]
pub struct RandomOrgSupplier {
    base_url: String,
    client: reqwest::Client,
}

impl RandomOrgSupplier {
    /// Creates a supplier for the given integer-generator URL.
    #[instrument(skip(base_url), fields(base_url = %base_url))]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Full request URL for one secret.
    pub fn request_url(&self) -> String {
        format!(
            "{}?num={}&min=0&max={}&col=1&base=10&format=plain&rnd=new",
            self.base_url, CODE_LENGTH, MAX_DIGIT
        )
    }
}

#[async_trait]
impl SecretSupplier for RandomOrgSupplier {
    #[instrument(skip(self))]
    async fn supply_secret(&self) -> Result<Vec<i64>, SupplyError> {
        let url = self.request_url();
        debug!(url = %url, "Requesting secret from random.org");

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!(error = ?e, "random.org request failed");
            SupplyError::new(format!("random.org request failed: {}", e))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read random.org response");
            SupplyError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, body = %body, "random.org error");
            return Err(SupplyError::new(format!(
                "random.org error {}: {}",
                status,
                body.trim()
            )));
        }

        let numbers = parse_plain_integers(&body)?;
        info!(count = numbers.len(), "Secret received from random.org");
        Ok(numbers)
    }
}

/// Parses a plain-text body of one integer per line.
///
/// # Errors
///
/// Returns [`SupplyError`] if any line is not an integer or the count is not
/// [`CODE_LENGTH`].
#[instrument(skip(body))]
pub fn parse_plain_integers(body: &str) -> Result<Vec<i64>, SupplyError> {
    let numbers = body
        .trim()
        .lines()
        .map(|line| {
            line.trim()
                .parse::<i64>()
                .map_err(|_| SupplyError::new(format!("Invalid line in response: '{}'", line)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if numbers.len() != CODE_LENGTH {
        return Err(SupplyError::new(format!(
            "Expected {} integers, got {}",
            CODE_LENGTH,
            numbers.len()
        )));
    }
    Ok(numbers)
}

/// Draws secrets from the local thread RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSupplier;

#[async_trait]
impl SecretSupplier for ThreadRngSupplier {
    #[instrument(skip(self))]
    async fn supply_secret(&self) -> Result<Vec<i64>, SupplyError> {
        let mut rng = rand::thread_rng();
        let numbers = (0..CODE_LENGTH)
            .map(|_| i64::from(rng.gen_range(0..=MAX_DIGIT)))
            .collect();
        debug!("Secret drawn from thread RNG");
        Ok(numbers)
    }
}
