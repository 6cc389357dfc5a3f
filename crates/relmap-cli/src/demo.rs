//! Demo aggregate managed by the CLI
//!
//! A `Document` (client-generated UUID) owns at most one `Summary`
//! (store-generated integer id).

use relmap_core::errors::{RelmapError, Result};
use relmap_core::{
    AggregateRoot, ColumnDescriptor, ColumnKind, Entity, EntityDescriptor, IdColumn,
    IdGeneration, InsertPolicy, OwnedRelation, Record, Value,
};
use serde::Serialize;
use uuid::Uuid;

static DOCUMENT: EntityDescriptor = EntityDescriptor {
    name: "Document",
    table: "document",
    id: IdColumn {
        name: "id",
        kind: ColumnKind::Uuid,
        generation: IdGeneration::Client,
    },
    insert_policy: InsertPolicy::AlwaysInsert,
    columns: &[ColumnDescriptor::required("title", ColumnKind::Text)],
};

static SUMMARY: EntityDescriptor = EntityDescriptor {
    name: "Summary",
    table: "summary",
    id: IdColumn {
        name: "id",
        kind: ColumnKind::Integer,
        generation: IdGeneration::Store,
    },
    insert_policy: InsertPolicy::InsertIfIdAbsent,
    columns: &[ColumnDescriptor::required("text", ColumnKind::Text)],
};

static DOCUMENT_SUMMARY: OwnedRelation = OwnedRelation {
    fk_column: "document_id",
};

pub const SCHEMA_MIGRATION_ID: &str = "0001_document_summary";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub summary: Option<Summary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub id: Option<i64>,
    pub text: String,
}

impl Document {
    pub fn new(title: impl Into<String>, summary: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            summary: summary.map(|text| Summary { id: None, text }),
        }
    }
}

fn wrong_id(entity: &str, expected: ColumnKind, found: &Value) -> RelmapError {
    RelmapError::UnexpectedValue {
        entity: entity.to_string(),
        column: "id".to_string(),
        expected: expected.name().to_string(),
        found: found.kind_name().to_string(),
    }
}

impl Entity for Document {
    fn descriptor() -> &'static EntityDescriptor {
        &DOCUMENT
    }

    fn id_value(&self) -> Option<Value> {
        Some(Value::Uuid(self.id))
    }

    fn assign_id(&mut self, id: Value) -> Result<()> {
        self.id = id
            .as_uuid()
            .ok_or_else(|| wrong_id(DOCUMENT.name, ColumnKind::Uuid, &id))?;
        Ok(())
    }

    fn to_record(&self) -> Record {
        Record::new().with("title", self.title.as_str())
    }

    fn from_record(id: Value, record: &Record) -> Result<Self> {
        Ok(Self {
            id: id
                .as_uuid()
                .ok_or_else(|| wrong_id(DOCUMENT.name, ColumnKind::Uuid, &id))?,
            title: record.text(DOCUMENT.name, "title")?,
            summary: None,
        })
    }
}

impl Entity for Summary {
    fn descriptor() -> &'static EntityDescriptor {
        &SUMMARY
    }

    fn id_value(&self) -> Option<Value> {
        self.id.map(Value::Integer)
    }

    fn assign_id(&mut self, id: Value) -> Result<()> {
        let id = id
            .as_i64()
            .ok_or_else(|| wrong_id(SUMMARY.name, ColumnKind::Integer, &id))?;
        self.id = Some(id);
        Ok(())
    }

    fn to_record(&self) -> Record {
        Record::new().with("text", self.text.as_str())
    }

    fn from_record(id: Value, record: &Record) -> Result<Self> {
        let id = id
            .as_i64()
            .ok_or_else(|| wrong_id(SUMMARY.name, ColumnKind::Integer, &id))?;
        Ok(Self {
            id: Some(id),
            text: record.text(SUMMARY.name, "text")?,
        })
    }
}

impl AggregateRoot for Document {
    type Child = Summary;

    fn relation() -> &'static OwnedRelation {
        &DOCUMENT_SUMMARY
    }

    fn child(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    fn child_mut(&mut self) -> Option<&mut Summary> {
        self.summary.as_mut()
    }

    fn set_child(&mut self, child: Option<Summary>) {
        self.summary = child;
    }
}
