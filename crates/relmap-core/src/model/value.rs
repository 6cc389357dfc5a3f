use crate::errors::{RelmapError, Result};
use serde::Serialize;
use uuid::Uuid;

/// Storage type of a mapped column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
    Bool,
    Uuid,
}

impl ColumnKind {
    /// Human-readable kind name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Real => "real",
            ColumnKind::Text => "text",
            ColumnKind::Bool => "bool",
            ColumnKind::Uuid => "uuid",
        }
    }
}

/// A single column value crossing the core/storage boundary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Bool(bool),
    Uuid(Uuid),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The kind this value satisfies, `None` for `Null`
    pub fn kind(&self) -> Option<ColumnKind> {
        match self {
            Value::Null => None,
            Value::Integer(_) => Some(ColumnKind::Integer),
            Value::Real(_) => Some(ColumnKind::Real),
            Value::Text(_) => Some(ColumnKind::Text),
            Value::Bool(_) => Some(ColumnKind::Bool),
            Value::Uuid(_) => Some(ColumnKind::Uuid),
        }
    }

    /// Name used when reporting a value of the wrong kind
    pub fn kind_name(&self) -> &'static str {
        self.kind().map(|k| k.name()).unwrap_or("null")
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(v) => Some(*v),
            _ => None,
        }
    }

    /// Treat `Null` as absence, used for identifier fields
    pub fn non_null(self) -> Option<Value> {
        if self.is_null() {
            None
        } else {
            Some(self)
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Real(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Uuid(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Ordered column-name/value pairs for one entity's scalar attributes
///
/// Entities produce a `Record` on save and are rebuilt from one on load.
/// Column order is irrelevant; the mapper reorders by descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Insert or replace a column value
    pub fn insert(&mut self, column: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| name == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column.to_string(), value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn text(&self, entity: &str, column: &str) -> Result<String> {
        self.required(entity, column, ColumnKind::Text, |v| {
            v.as_str().map(str::to_string)
        })
    }

    pub fn opt_text(&self, entity: &str, column: &str) -> Result<Option<String>> {
        self.optional(entity, column, ColumnKind::Text, |v| {
            v.as_str().map(str::to_string)
        })
    }

    pub fn integer(&self, entity: &str, column: &str) -> Result<i64> {
        self.required(entity, column, ColumnKind::Integer, Value::as_i64)
    }

    pub fn opt_integer(&self, entity: &str, column: &str) -> Result<Option<i64>> {
        self.optional(entity, column, ColumnKind::Integer, Value::as_i64)
    }

    pub fn real(&self, entity: &str, column: &str) -> Result<f64> {
        self.required(entity, column, ColumnKind::Real, Value::as_f64)
    }

    pub fn bool(&self, entity: &str, column: &str) -> Result<bool> {
        self.required(entity, column, ColumnKind::Bool, Value::as_bool)
    }

    pub fn uuid(&self, entity: &str, column: &str) -> Result<Uuid> {
        self.required(entity, column, ColumnKind::Uuid, Value::as_uuid)
    }

    fn required<T>(
        &self,
        entity: &str,
        column: &str,
        expected: ColumnKind,
        extract: impl Fn(&Value) -> Option<T>,
    ) -> Result<T> {
        self.optional(entity, column, expected, extract)?
            .ok_or_else(|| unexpected(entity, column, expected, "null"))
    }

    fn optional<T>(
        &self,
        entity: &str,
        column: &str,
        expected: ColumnKind,
        extract: impl Fn(&Value) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.get(column) {
            None => Err(unexpected(entity, column, expected, "missing column")),
            Some(Value::Null) => Ok(None),
            Some(value) => extract(value)
                .map(Some)
                .ok_or_else(|| unexpected(entity, column, expected, value.kind_name())),
        }
    }
}

fn unexpected(entity: &str, column: &str, expected: ColumnKind, found: &str) -> RelmapError {
    RelmapError::UnexpectedValue {
        entity: entity.to_string(),
        column: column.to_string(),
        expected: expected.name().to_string(),
        found: found.to_string(),
    }
}
