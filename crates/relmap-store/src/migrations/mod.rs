//! Schema migrations
//!
//! A migration is an id plus a batch of SQL. Applied migrations are
//! recorded in `schema_version` with a SHA-256 checksum of their SQL.

pub mod checksums;
pub mod ddl;
pub mod runner;

pub use runner::{applied_migrations, apply_migrations};

use relmap_core::{plan, AggregateRoot};

use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub id: String,
    pub sql: String,
}

impl Migration {
    pub fn new(id: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sql: sql.into(),
        }
    }

    /// Migration creating the root and child tables of aggregate `A`
    ///
    /// # Errors
    ///
    /// `ExErrorKind::InvalidMapping` if the aggregate's descriptors do not
    /// validate or describe an id SQLite cannot generate.
    pub fn for_aggregate<A: AggregateRoot>(id: impl Into<String>) -> Result<Self> {
        let plan = plan::<A>()?;
        let sql = ddl::create_tables_sql(&plan)?;
        Ok(Self::new(id, sql))
    }
}
