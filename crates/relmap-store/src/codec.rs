//! Conversion between core `Value`s and SQLite values
//!
//! UUIDs are stored as hyphenated TEXT and booleans as 0/1 INTEGER.
//! Decoding is driven by the column kind declared in the plan, since
//! SQLite's own storage class cannot tell a UUID from any other text.

use relmap_core::errors::{RelmapError, Result};
use relmap_core::{ColumnKind, Record, TablePlan, Value};
use rusqlite::types::Value as SqlValue;
use rusqlite::Row;
use uuid::Uuid;

/// Encode a core value as a SQLite parameter
pub fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(v) => SqlValue::Integer(*v),
        Value::Real(v) => SqlValue::Real(*v),
        Value::Text(v) => SqlValue::Text(v.clone()),
        Value::Bool(v) => SqlValue::Integer(i64::from(*v)),
        Value::Uuid(v) => SqlValue::Text(v.hyphenated().to_string()),
    }
}

/// Decode a SQLite value as the declared column kind
///
/// # Errors
///
/// `RelmapError::UnexpectedValue` when the stored value cannot represent
/// the declared kind (e.g. a malformed UUID string).
pub fn from_sql(entity: &str, column: &str, kind: ColumnKind, raw: SqlValue) -> Result<Value> {
    let decoded = match (kind, raw) {
        (_, SqlValue::Null) => Some(Value::Null),
        (ColumnKind::Integer, SqlValue::Integer(v)) => Some(Value::Integer(v)),
        (ColumnKind::Real, SqlValue::Real(v)) => Some(Value::Real(v)),
        (ColumnKind::Real, SqlValue::Integer(v)) => Some(Value::Real(v as f64)),
        (ColumnKind::Text, SqlValue::Text(v)) => Some(Value::Text(v)),
        (ColumnKind::Bool, SqlValue::Integer(v)) => Some(Value::Bool(v != 0)),
        (ColumnKind::Uuid, SqlValue::Text(v)) => Uuid::parse_str(&v).ok().map(Value::Uuid),
        (ColumnKind::Uuid, SqlValue::Blob(v)) => Uuid::from_slice(&v).ok().map(Value::Uuid),
        _ => None,
    };

    decoded.ok_or_else(|| RelmapError::UnexpectedValue {
        entity: entity.to_string(),
        column: column.to_string(),
        expected: kind.name().to_string(),
        found: "incompatible stored value".to_string(),
    })
}

/// Read the first `width` columns of a row without interpreting them
pub fn read_raw(row: &Row<'_>, width: usize) -> rusqlite::Result<Vec<SqlValue>> {
    (0..width).map(|i| row.get(i)).collect()
}

/// Split a raw `id, col1, col2, ...` row into the id and a `Record`
///
/// # Errors
///
/// `RelmapError::UnexpectedValue` if any column fails to decode or the
/// row is narrower than the table plan.
pub fn decode_row(table: &TablePlan, raw: Vec<SqlValue>) -> Result<(Value, Record)> {
    let missing = |column: &str, kind: ColumnKind| RelmapError::UnexpectedValue {
        entity: table.entity.to_string(),
        column: column.to_string(),
        expected: kind.name().to_string(),
        found: "missing column".to_string(),
    };
    let mut values = raw.into_iter();

    let id_raw = values
        .next()
        .ok_or_else(|| missing(table.id_column, table.id_kind))?;
    let id = from_sql(table.entity, table.id_column, table.id_kind, id_raw)?;

    let mut record = Record::new();
    for column in &table.columns {
        let raw = values
            .next()
            .ok_or_else(|| missing(column.name, column.kind))?;
        record.insert(
            column.name,
            from_sql(table.entity, column.name, column.kind, raw)?,
        );
    }

    Ok((id, record))
}
