pub mod descriptor;
pub mod entity;
pub mod value;

pub use descriptor::{
    ColumnDescriptor, EntityDescriptor, IdColumn, IdGeneration, InsertPolicy, OwnedRelation,
};
pub use entity::{AggregateRoot, Entity};
pub use value::{ColumnKind, Record, Value};
