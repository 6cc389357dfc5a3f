//! relmap core - storage-neutral mapping for one-to-one aggregates
//!
//! This crate provides:
//! - Static entity descriptors and the `Entity` / `AggregateRoot` traits
//! - The identifier strategy deciding insert-with-id, insert-generated or update
//! - The aggregate mapper producing cached persistence plans (validated
//!   table shapes plus rendered SQL)
//! - The canonical error facility and structured logging facility
//!
//! Storage itself lives in `relmap-store`.

pub mod errors;
pub mod identifier;
pub mod logging_facility;
pub mod mapper;
pub mod model;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, RelmapError, Result};
pub use identifier::{DefaultIdentifierStrategy, IdentifierDecision, IdentifierStrategy};
pub use mapper::{plan, PersistencePlan, Statements, TablePlan};
pub use model::{
    AggregateRoot, ColumnDescriptor, ColumnKind, Entity, EntityDescriptor, IdColumn,
    IdGeneration, InsertPolicy, OwnedRelation, Record, Value,
};
