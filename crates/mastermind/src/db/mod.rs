//! SQLite persistence for sessions and guess history.

mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use repository::SqliteStore;
