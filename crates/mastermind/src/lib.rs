//! Mastermind - code-breaking game service.
//!
//! Wires the pure [`mastermind_engine`] rules to their collaborators.
//!
//! # Architecture
//!
//! - **Secret**: random.org and local RNG secret suppliers
//! - **Store**: session/history store trait, in-memory and SQLite backends
//! - **Service**: create, guess, state, expire, list
//! - **Config**: TOML configuration with environment overrides
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mastermind::{GameService, MemoryStore, ThreadRngSupplier};
//! use mastermind_engine::ModeKind;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let service = GameService::new(MemoryStore::new(), Arc::new(ThreadRngSupplier), 60);
//! let session = service.create_session(ModeKind::Classic, None).await?;
//! let result = service.submit_guess(session.id(), &[0, 1, 2, 3])?;
//! println!("{:?}", result.record().score());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod clock;
mod config;
mod db;
mod error;
mod secret;
mod service;
mod store;

pub use clock::{Clock, SystemClock};
pub use config::{ConfigError, GameConfig, RANDOM_ORG_URL_VAR, SecretSource};
pub use db::SqliteStore;
pub use error::{ServiceError, StoreError};
pub use secret::{
    RandomOrgSupplier, SecretSupplier, SupplyError, ThreadRngSupplier, parse_plain_integers,
};
pub use service::{GameService, GameState, GuessResult};
pub use store::{Commit, GameStore, MemoryStore, Step};
