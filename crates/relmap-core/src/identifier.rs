//! Identifier strategy
//!
//! Decides, per entity, whether a save inserts with a known id, inserts
//! and reads a store-generated id back, or updates an existing row. The
//! strategy is injected into the persistence engine so applications can
//! substitute their own rules.

use crate::errors::{RelmapError, Result};
use crate::model::{EntityDescriptor, IdGeneration, InsertPolicy, Value};

/// What the engine must do with an entity's identifier on save
#[derive(Debug, Clone, PartialEq)]
pub enum IdentifierDecision {
    /// Insert the row including this identifier
    InsertWithId(Value),
    /// Omit the identifier column and read the generated value back
    InsertGenerated,
    /// The row exists under this identifier; update it
    Update(Value),
}

impl IdentifierDecision {
    pub fn is_insert(&self) -> bool {
        !matches!(self, IdentifierDecision::Update(_))
    }

    /// Identifier known before the statement runs, if any
    pub fn known_id(&self) -> Option<&Value> {
        match self {
            IdentifierDecision::InsertWithId(id) | IdentifierDecision::Update(id) => Some(id),
            IdentifierDecision::InsertGenerated => None,
        }
    }
}

/// Policy for resolving identifier decisions
pub trait IdentifierStrategy: Send + Sync {
    /// Decide how to persist an aggregate root (or any standalone entity)
    ///
    /// # Errors
    ///
    /// `RelmapError::IdentifierMissing` when the descriptor requires a
    /// client-generated id and none is present.
    fn assign_or_validate(
        &self,
        descriptor: &EntityDescriptor,
        id: Option<&Value>,
    ) -> Result<IdentifierDecision>;

    /// Decide how to persist an owned child
    ///
    /// Owned children are always (re)inserted together with their root,
    /// so this never yields `Update`.
    ///
    /// # Errors
    ///
    /// `RelmapError::IdentifierMissing` for a client-generated child id
    /// that is absent.
    fn owned_decision(
        &self,
        descriptor: &EntityDescriptor,
        id: Option<&Value>,
    ) -> Result<IdentifierDecision> {
        match present(id) {
            Some(id) => Ok(IdentifierDecision::InsertWithId(id.clone())),
            None => match descriptor.id.generation {
                IdGeneration::Store => Ok(IdentifierDecision::InsertGenerated),
                IdGeneration::Client => Err(missing(descriptor)),
            },
        }
    }
}

/// Decision table driven by `IdGeneration` and `InsertPolicy`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultIdentifierStrategy;

impl IdentifierStrategy for DefaultIdentifierStrategy {
    fn assign_or_validate(
        &self,
        descriptor: &EntityDescriptor,
        id: Option<&Value>,
    ) -> Result<IdentifierDecision> {
        let decision = match (present(id), descriptor.id.generation) {
            (None, IdGeneration::Client) => return Err(missing(descriptor)),
            (None, IdGeneration::Store) => IdentifierDecision::InsertGenerated,
            (Some(id), _) => match descriptor.insert_policy {
                InsertPolicy::AlwaysInsert => IdentifierDecision::InsertWithId(id.clone()),
                InsertPolicy::InsertIfIdAbsent => IdentifierDecision::Update(id.clone()),
            },
        };

        tracing::trace!(
            entity = descriptor.name,
            decision = ?decision,
            "Resolved identifier decision"
        );

        Ok(decision)
    }
}

fn present(id: Option<&Value>) -> Option<&Value> {
    id.filter(|v| !v.is_null())
}

fn missing(descriptor: &EntityDescriptor) -> RelmapError {
    RelmapError::IdentifierMissing {
        entity: descriptor.name.to_string(),
    }
}
