//! relmap store - SQLite persistence for one-to-one aggregates
//!
//! Provides:
//! - Connection management and `StoreConfig`
//! - Value codec between core values and SQLite
//! - Migrations framework plus DDL rendered from aggregate plans
//! - The persistence engine and the typed `Repository` façade

pub mod codec;
pub mod config;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use config::StoreConfig;
pub use db::Database;
pub use errors::Result;
pub use migrations::{apply_migrations, Migration};
pub use repo::{AggregateEngine, Repository, SaveOutcome, SaveState};
