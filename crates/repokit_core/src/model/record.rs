//! Bound record contract.
//!
//! # Responsibility
//! - Describe a persisted record type: table, key column, fillable columns.
//! - Convert records to and from `FieldMap` without loss.
//!
//! # Invariants
//! - `FILLABLE` never contains the key column; keys are owned by persistence.
//! - `fill` only touches fields present in the map.

use crate::model::capability::Sortable;
use crate::model::field::{FieldError, FieldMap};
use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Primary-key value of a persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordKey {
    /// Rowid-style key assigned by the store on insert.
    Integer(i64),
    /// Caller/record assigned key, e.g. a UUID string.
    Text(String),
}

impl RecordKey {
    /// Generates a random UUID v4 text key.
    pub fn new_uuid() -> Self {
        Self::Text(Uuid::new_v4().to_string())
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Integer(_) => None,
            Self::Text(value) => Some(value.as_str()),
        }
    }

    /// Converts a stored key column value; `None` for null/real/blob.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Integer(value) => Some(Self::Integer(value)),
            Value::Text(value) => Some(Self::Text(value)),
            Value::Null | Value::Real(_) | Value::Blob(_) => None,
        }
    }
}

impl Display for RecordKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl ToSql for RecordKey {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Integer(value) => value.to_sql(),
            Self::Text(value) => value.to_sql(),
        }
    }
}

impl From<i64> for RecordKey {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<String> for RecordKey {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for RecordKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Uuid> for RecordKey {
    fn from(value: Uuid) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<RecordKey> for Value {
    fn from(value: RecordKey) -> Self {
        match value {
            RecordKey::Integer(value) => Value::Integer(value),
            RecordKey::Text(value) => Value::Text(value),
        }
    }
}

/// A record type a repository can be bound to.
///
/// Implementors describe their storage shape with associated constants and
/// provide `fill` / `to_fields` conversions; everything else has defaults.
pub trait Record: Sized {
    /// Backing table name.
    const TABLE: &'static str;
    /// Primary-key column name.
    const KEY: &'static str = "id";
    /// Columns accepted by mass assignment and written on persist.
    const FILLABLE: &'static [&'static str];

    /// Blank, not yet persisted instance.
    fn blank() -> Self;

    /// Primary key; `None` until the record has been persisted.
    fn key(&self) -> Option<RecordKey>;

    fn set_key(&mut self, key: RecordKey);

    /// Assigns every field present in `fields`, leaving the rest untouched.
    fn fill(&mut self, fields: &FieldMap) -> Result<(), FieldError>;

    /// Current attribute values for all fillable columns.
    fn to_fields(&self) -> FieldMap;

    /// Key assigned before insert. `None` lets the store assign a rowid.
    fn new_key() -> Option<RecordKey> {
        None
    }

    /// Sort capability. `None` means listings ignore caller sort params.
    fn sortable() -> Option<Sortable> {
        None
    }

    /// Rebuilds a persisted record from its key and stored fields.
    fn from_fields(key: RecordKey, fields: &FieldMap) -> Result<Self, FieldError> {
        let mut record = Self::blank();
        record.set_key(key);
        record.fill(fields)?;
        Ok(record)
    }
}
