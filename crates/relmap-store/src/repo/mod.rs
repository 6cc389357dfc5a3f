//! Repository layer for persisting aggregates to SQLite

pub mod engine;
pub mod hydration;
pub mod repository;

pub use engine::{AggregateEngine, SaveOutcome, SaveState};
pub use repository::Repository;
