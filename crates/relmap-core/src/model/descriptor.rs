//! Static mapping descriptors
//!
//! Each entity type declares one `EntityDescriptor` (usually a `static`)
//! naming its table, identifier column and scalar columns. The mapper
//! turns descriptors into a `PersistencePlan`; nothing is discovered at
//! runtime.

use super::value::ColumnKind;

/// Who assigns an entity's identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGeneration {
    /// Application sets the id before save (e.g. a random UUID)
    Client,
    /// Storage assigns the id on insert and it is read back
    Store,
}

/// How a save treats an entity whose id is already present
///
/// `InsertIfIdAbsent` is the general rule: a present id means the row
/// exists and is updated. `AlwaysInsert` is for client-generated ids
/// where a present id says nothing about whether the row exists yet.
/// Under `AlwaysInsert`, saving an already persisted entity again
/// fails with a constraint violation instead of updating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertPolicy {
    AlwaysInsert,
    #[default]
    InsertIfIdAbsent,
}

/// Identifier column of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdColumn {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub generation: IdGeneration,
}

/// A scalar (non-identifier) column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
}

impl ColumnDescriptor {
    pub const fn required(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    pub const fn nullable(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: true,
        }
    }
}

/// Statically declared shape of one entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescriptor {
    /// Entity name used in logs and errors
    pub name: &'static str,
    pub table: &'static str,
    pub id: IdColumn,
    pub insert_policy: InsertPolicy,
    pub columns: &'static [ColumnDescriptor],
}

/// The root's single owned child, linked by a foreign-key column on the
/// child's table that holds the root id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnedRelation {
    pub fk_column: &'static str,
}
