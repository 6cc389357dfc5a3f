#![allow(dead_code)]

use std::sync::Arc;

use relmap_core::errors::{RelmapError, Result};
use relmap_core::model::{
    AggregateRoot, ColumnDescriptor, ColumnKind, Entity, EntityDescriptor, IdColumn,
    IdGeneration, InsertPolicy, OwnedRelation, Record, Value,
};
use relmap_store::{apply_migrations, Database, Migration};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Parcel: client-generated UUID root, always inserted; store-generated Tag
// ---------------------------------------------------------------------------

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

#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    pub id: Uuid,
    pub label: String,
    pub tag: Option<Tag>,
}

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

impl Tag {
    pub fn note(note: &str) -> Self {
        Self {
            id: None,
            note: Some(note.to_string()),
        }
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
        self.id = id.as_uuid().ok_or_else(|| unexpected("Parcel", "uuid", &id))?;
        Ok(())
    }

    fn to_record(&self) -> Record {
        Record::new().with("label", self.label.as_str())
    }

    fn from_record(id: Value, record: &Record) -> Result<Self> {
        Ok(Self {
            id: id.as_uuid().ok_or_else(|| unexpected("Parcel", "uuid", &id))?,
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
        self.id = Some(id.as_i64().ok_or_else(|| unexpected("Tag", "integer", &id))?);
        Ok(())
    }

    fn to_record(&self) -> Record {
        Record::new().with("note", self.note.clone())
    }

    fn from_record(id: Value, record: &Record) -> Result<Self> {
        Ok(Self {
            id: Some(id.as_i64().ok_or_else(|| unexpected("Tag", "integer", &id))?),
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

// ---------------------------------------------------------------------------
// Ledger: store-generated integer root, updated when its id is present;
// store-generated Entry with real and bool columns
// ---------------------------------------------------------------------------

pub static LEDGER: EntityDescriptor = EntityDescriptor {
    name: "Ledger",
    table: "ledger",
    id: IdColumn {
        name: "id",
        kind: ColumnKind::Integer,
        generation: IdGeneration::Store,
    },
    insert_policy: InsertPolicy::InsertIfIdAbsent,
    columns: &[ColumnDescriptor::required("name", ColumnKind::Text)],
};

pub static ENTRY: EntityDescriptor = EntityDescriptor {
    name: "Entry",
    table: "entry",
    id: IdColumn {
        name: "id",
        kind: ColumnKind::Integer,
        generation: IdGeneration::Store,
    },
    insert_policy: InsertPolicy::InsertIfIdAbsent,
    columns: &[
        ColumnDescriptor::required("amount", ColumnKind::Real),
        ColumnDescriptor::required("settled", ColumnKind::Bool),
    ],
};

pub static LEDGER_ENTRY: OwnedRelation = OwnedRelation {
    fk_column: "ledger_id",
};

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    pub id: Option<i64>,
    pub name: String,
    pub entry: Option<Entry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: Option<i64>,
    pub amount: f64,
    pub settled: bool,
}

impl Ledger {
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            entry: None,
        }
    }

    pub fn with_entry(mut self, amount: f64, settled: bool) -> Self {
        self.entry = Some(Entry {
            id: None,
            amount,
            settled,
        });
        self
    }
}

impl Entity for Ledger {
    fn descriptor() -> &'static EntityDescriptor {
        &LEDGER
    }

    fn id_value(&self) -> Option<Value> {
        self.id.map(Value::Integer)
    }

    fn assign_id(&mut self, id: Value) -> Result<()> {
        self.id = Some(id.as_i64().ok_or_else(|| unexpected("Ledger", "integer", &id))?);
        Ok(())
    }

    fn to_record(&self) -> Record {
        Record::new().with("name", self.name.as_str())
    }

    fn from_record(id: Value, record: &Record) -> Result<Self> {
        Ok(Self {
            id: Some(id.as_i64().ok_or_else(|| unexpected("Ledger", "integer", &id))?),
            name: record.text("Ledger", "name")?,
            entry: None,
        })
    }
}

impl Entity for Entry {
    fn descriptor() -> &'static EntityDescriptor {
        &ENTRY
    }

    fn id_value(&self) -> Option<Value> {
        self.id.map(Value::Integer)
    }

    fn assign_id(&mut self, id: Value) -> Result<()> {
        self.id = Some(id.as_i64().ok_or_else(|| unexpected("Entry", "integer", &id))?);
        Ok(())
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("amount", self.amount)
            .with("settled", self.settled)
    }

    fn from_record(id: Value, record: &Record) -> Result<Self> {
        Ok(Self {
            id: Some(id.as_i64().ok_or_else(|| unexpected("Entry", "integer", &id))?),
            amount: record.real("Entry", "amount")?,
            settled: record.bool("Entry", "settled")?,
        })
    }
}

impl AggregateRoot for Ledger {
    type Child = Entry;

    fn relation() -> &'static OwnedRelation {
        &LEDGER_ENTRY
    }

    fn child(&self) -> Option<&Entry> {
        self.entry.as_ref()
    }

    fn child_mut(&mut self) -> Option<&mut Entry> {
        self.entry.as_mut()
    }

    fn set_child(&mut self, child: Option<Entry>) {
        self.entry = child;
    }
}

// ---------------------------------------------------------------------------
// Voucher: client-generated UUID root that may be missing its id
// ---------------------------------------------------------------------------

pub static VOUCHER: EntityDescriptor = EntityDescriptor {
    name: "Voucher",
    table: "voucher",
    id: IdColumn {
        name: "id",
        kind: ColumnKind::Uuid,
        generation: IdGeneration::Client,
    },
    insert_policy: InsertPolicy::AlwaysInsert,
    columns: &[ColumnDescriptor::required("code", ColumnKind::Text)],
};

pub static STAMP: EntityDescriptor = EntityDescriptor {
    name: "Stamp",
    table: "stamp",
    id: IdColumn {
        name: "id",
        kind: ColumnKind::Integer,
        generation: IdGeneration::Store,
    },
    insert_policy: InsertPolicy::InsertIfIdAbsent,
    columns: &[ColumnDescriptor::required("mark", ColumnKind::Text)],
};

pub static VOUCHER_STAMP: OwnedRelation = OwnedRelation {
    fk_column: "voucher_id",
};

#[derive(Debug, Clone, PartialEq)]
pub struct Voucher {
    pub id: Option<Uuid>,
    pub code: String,
    pub stamp: Option<Stamp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stamp {
    pub id: Option<i64>,
    pub mark: String,
}

impl Voucher {
    pub fn unidentified(code: &str) -> Self {
        Self {
            id: None,
            code: code.to_string(),
            stamp: Some(Stamp {
                id: None,
                mark: "issued".to_string(),
            }),
        }
    }
}

impl Entity for Voucher {
    fn descriptor() -> &'static EntityDescriptor {
        &VOUCHER
    }

    fn id_value(&self) -> Option<Value> {
        self.id.map(Value::Uuid)
    }

    fn assign_id(&mut self, id: Value) -> Result<()> {
        self.id = Some(id.as_uuid().ok_or_else(|| unexpected("Voucher", "uuid", &id))?);
        Ok(())
    }

    fn to_record(&self) -> Record {
        Record::new().with("code", self.code.as_str())
    }

    fn from_record(id: Value, record: &Record) -> Result<Self> {
        Ok(Self {
            id: Some(id.as_uuid().ok_or_else(|| unexpected("Voucher", "uuid", &id))?),
            code: record.text("Voucher", "code")?,
            stamp: None,
        })
    }
}

impl Entity for Stamp {
    fn descriptor() -> &'static EntityDescriptor {
        &STAMP
    }

    fn id_value(&self) -> Option<Value> {
        self.id.map(Value::Integer)
    }

    fn assign_id(&mut self, id: Value) -> Result<()> {
        self.id = Some(id.as_i64().ok_or_else(|| unexpected("Stamp", "integer", &id))?);
        Ok(())
    }

    fn to_record(&self) -> Record {
        Record::new().with("mark", self.mark.as_str())
    }

    fn from_record(id: Value, record: &Record) -> Result<Self> {
        Ok(Self {
            id: Some(id.as_i64().ok_or_else(|| unexpected("Stamp", "integer", &id))?),
            mark: record.text("Stamp", "mark")?,
        })
    }
}

impl AggregateRoot for Voucher {
    type Child = Stamp;

    fn relation() -> &'static OwnedRelation {
        &VOUCHER_STAMP
    }

    fn child(&self) -> Option<&Stamp> {
        self.stamp.as_ref()
    }

    fn child_mut(&mut self) -> Option<&mut Stamp> {
        self.stamp.as_mut()
    }

    fn set_child(&mut self, child: Option<Stamp>) {
        self.stamp = child;
    }
}

fn unexpected(entity: &str, expected: &str, found: &Value) -> RelmapError {
    RelmapError::UnexpectedValue {
        entity: entity.to_string(),
        column: "id".to_string(),
        expected: expected.to_string(),
        found: found.kind_name().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Database helpers
// ---------------------------------------------------------------------------

pub fn migrations() -> Vec<Migration> {
    vec![
        Migration::for_aggregate::<Parcel>("0001_parcel").unwrap(),
        Migration::for_aggregate::<Ledger>("0002_ledger").unwrap(),
        Migration::for_aggregate::<Voucher>("0003_voucher").unwrap(),
    ]
}

pub fn migrate(db: &Database) {
    let mut conn = db.acquire().unwrap();
    apply_migrations(&mut conn, &migrations()).unwrap();
}

/// Fresh in-memory database with both fixture schemas
pub fn setup_db() -> Arc<Database> {
    let db = Database::in_memory().unwrap();
    migrate(&db);
    Arc::new(db)
}

/// Child rows referencing a root, read straight from SQLite
pub fn child_rows(db: &Database, table: &str, fk_column: &str, root_id: &Value) -> i64 {
    let conn = db.acquire().unwrap();
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", table, fk_column),
        [relmap_store::codec::to_sql(root_id)],
        |row| row.get(0),
    )
    .unwrap()
}
