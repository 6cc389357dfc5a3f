#![allow(dead_code)]

use relmap_core::errors::Result;
use relmap_core::model::{
    AggregateRoot, ColumnDescriptor, ColumnKind, Entity, EntityDescriptor, IdColumn,
    IdGeneration, InsertPolicy, OwnedRelation, Record, Value,
};
use relmap_core::RelmapError;
use uuid::Uuid;

pub static PARCEL: EntityDescriptor = EntityDescriptor {
    name: "Parcel",
    table: "parcel",
    id: IdColumn {
        name: "id",
        kind: ColumnKind::Uuid,
        generation: IdGeneration::Client,
    },
    insert_policy: InsertPolicy::AlwaysInsert,
    columns: &[ColumnDescriptor::required("label", ColumnKind::Text)],
};

pub static TAG: EntityDescriptor = EntityDescriptor {
    name: "Tag",
    table: "tag",
    id: IdColumn {
        name: "id",
        kind: ColumnKind::Integer,
        generation: IdGeneration::Store,
    },
    insert_policy: InsertPolicy::InsertIfIdAbsent,
    columns: &[ColumnDescriptor::nullable("note", ColumnKind::Text)],
};

pub static PARCEL_TAG: OwnedRelation = OwnedRelation {
    fk_column: "parcel_id",
};

/// Aggregate root with a client-generated UUID
#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    pub id: Uuid,
    pub label: String,
    pub tag: Option<Tag>,
}

/// Owned child with a store-generated id
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tag {
    pub id: Option<i64>,
    pub note: Option<String>,
}

impl Parcel {
    pub fn new(label: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.to_string(),
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }
}

impl Entity for Parcel {
    fn descriptor() -> &'static EntityDescriptor {
        &PARCEL
    }

    fn id_value(&self) -> Option<Value> {
        Some(Value::Uuid(self.id))
    }

    fn assign_id(&mut self, id: Value) -> Result<()> {
        self.id = id.as_uuid().ok_or_else(|| RelmapError::UnexpectedValue {
            entity: "Parcel".to_string(),
            column: "id".to_string(),
            expected: "uuid".to_string(),
            found: id.kind_name().to_string(),
        })?;
        Ok(())
    }

    fn to_record(&self) -> Record {
        Record::new().with("label", self.label.as_str())
    }

    fn from_record(id: Value, record: &Record) -> Result<Self> {
        Ok(Self {
            id: id.as_uuid().unwrap_or_default(),
            label: record.text("Parcel", "label")?,
            tag: None,
        })
    }
}

impl Entity for Tag {
    fn descriptor() -> &'static EntityDescriptor {
        &TAG
    }

    fn id_value(&self) -> Option<Value> {
        self.id.map(Value::Integer)
    }

    fn assign_id(&mut self, id: Value) -> Result<()> {
        self.id = id.as_i64();
        Ok(())
    }

    fn to_record(&self) -> Record {
        Record::new().with("note", self.note.clone())
    }

    fn from_record(id: Value, record: &Record) -> Result<Self> {
        Ok(Self {
            id: id.as_i64(),
            note: record.opt_text("Tag", "note")?,
        })
    }
}

impl AggregateRoot for Parcel {
    type Child = Tag;

    fn relation() -> &'static OwnedRelation {
        &PARCEL_TAG
    }

    fn child(&self) -> Option<&Tag> {
        self.tag.as_ref()
    }

    fn child_mut(&mut self) -> Option<&mut Tag> {
        self.tag.as_mut()
    }

    fn set_child(&mut self, child: Option<Tag>) {
        self.tag = child;
    }
}
