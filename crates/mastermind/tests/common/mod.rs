//! Shared test doubles: a hand-driven clock and scripted secret suppliers.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use mastermind::{Clock, SecretSupplier, SupplyError};
use std::sync::{Arc, Mutex};

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(
                Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
            )),
        }
    }

    pub fn advance(&self, seconds: i64) {
        let mut now = self.now.lock().unwrap();
        *now += TimeDelta::seconds(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Supplier that always returns the same digits.
#[derive(Debug, Clone)]
pub struct FixedSupplier(pub Vec<i64>);

#[async_trait]
impl SecretSupplier for FixedSupplier {
    async fn supply_secret(&self) -> Result<Vec<i64>, SupplyError> {
        Ok(self.0.clone())
    }
}

/// Supplier that always fails.
#[derive(Debug, Clone, Copy)]
pub struct FailingSupplier;

#[async_trait]
impl SecretSupplier for FailingSupplier {
    async fn supply_secret(&self) -> Result<Vec<i64>, SupplyError> {
        Err(SupplyError::new("random.org unreachable"))
    }
}
