use super::descriptor::{EntityDescriptor, OwnedRelation};
use super::value::{Record, Value};
use crate::errors::Result;

/// An entity with a statically declared table mapping
pub trait Entity: Sized {
    /// The entity's mapping; must return the same descriptor on every call
    fn descriptor() -> &'static EntityDescriptor;

    /// Current identifier, `None` when not yet assigned
    fn id_value(&self) -> Option<Value>;

    /// Store a generated identifier back onto the instance
    ///
    /// # Errors
    ///
    /// `RelmapError::UnexpectedValue` if `id` is not of the declared kind.
    fn assign_id(&mut self, id: Value) -> Result<()>;

    /// Scalar columns (everything except the id) keyed by column name
    fn to_record(&self) -> Record;

    /// Rebuild an instance from its id and scalar columns
    ///
    /// # Errors
    ///
    /// `RelmapError::UnexpectedValue` if a column is missing or mistyped.
    fn from_record(id: Value, record: &Record) -> Result<Self>;
}

/// An aggregate root owning zero or one child entity
///
/// The child carries no reference back to the root; the link lives only
/// in the foreign-key column named by `relation()`.
pub trait AggregateRoot: Entity + 'static {
    type Child: Entity;

    fn relation() -> &'static OwnedRelation;

    fn child(&self) -> Option<&Self::Child>;

    fn child_mut(&mut self) -> Option<&mut Self::Child>;

    fn set_child(&mut self, child: Option<Self::Child>);
}
