//! Column-name to value maps used for fill and persistence.

use rusqlite::types::Value;
use std::collections::{btree_map, BTreeMap, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Ordered mapping of column name to SQLite value.
///
/// Produced from update payloads and by `Record::to_fields`; consumed by
/// `Record::fill` through the typed accessors below.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    fields: BTreeMap<String, Value>,
}

/// Typed access failures while filling a record from a field map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    UnexpectedNull {
        field: String,
    },
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeMismatch {
                field,
                expected,
                found,
            } => write!(f, "field `{field}` expected {expected}, found {found}"),
            Self::UnexpectedNull { field } => write!(f, "field `{field}` must not be null"),
        }
    }
}

impl Error for FieldError {}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Splits off every field not in `allowed`, returning the discarded names.
    pub fn retain_columns(&mut self, allowed: &[&str]) -> Vec<String> {
        let discarded: Vec<String> = self
            .fields
            .keys()
            .filter(|name| !allowed.contains(&name.as_str()))
            .cloned()
            .collect();
        for name in &discarded {
            self.fields.remove(name);
        }
        discarded
    }

    /// Non-null text field. `Ok(None)` when absent.
    pub fn text(&self, name: &str) -> Result<Option<String>, FieldError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Text(value)) => Ok(Some(value.clone())),
            Some(Value::Null) => Err(null(name)),
            Some(other) => Err(mismatch(name, "text", other)),
        }
    }

    /// Nullable text field. Outer `None` when absent, inner `None` for null.
    pub fn nullable_text(&self, name: &str) -> Result<Option<Option<String>>, FieldError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Null) => Ok(Some(None)),
            Some(Value::Text(value)) => Ok(Some(Some(value.clone()))),
            Some(other) => Err(mismatch(name, "text", other)),
        }
    }

    pub fn integer(&self, name: &str) -> Result<Option<i64>, FieldError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Integer(value)) => Ok(Some(*value)),
            Some(Value::Null) => Err(null(name)),
            Some(other) => Err(mismatch(name, "integer", other)),
        }
    }

    pub fn nullable_integer(&self, name: &str) -> Result<Option<Option<i64>>, FieldError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Null) => Ok(Some(None)),
            Some(Value::Integer(value)) => Ok(Some(Some(*value))),
            Some(other) => Err(mismatch(name, "integer", other)),
        }
    }

    /// Real field; integers widen to `f64`.
    pub fn real(&self, name: &str) -> Result<Option<f64>, FieldError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Real(value)) => Ok(Some(*value)),
            Some(Value::Integer(value)) => Ok(Some(*value as f64)),
            Some(Value::Null) => Err(null(name)),
            Some(other) => Err(mismatch(name, "real", other)),
        }
    }

    /// Boolean stored as integer `0` / `1`.
    pub fn boolean(&self, name: &str) -> Result<Option<bool>, FieldError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Integer(0)) => Ok(Some(false)),
            Some(Value::Integer(1)) => Ok(Some(true)),
            Some(Value::Null) => Err(null(name)),
            Some(other) => Err(mismatch(name, "boolean (0 or 1)", other)),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl From<BTreeMap<String, Value>> for FieldMap {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl From<HashMap<String, Value>> for FieldMap {
    fn from(fields: HashMap<String, Value>) -> Self {
        fields.into_iter().collect()
    }
}

/// Human-readable SQLite storage class of a value.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Integer(_) => "integer",
        Value::Real(_) => "real",
        Value::Text(_) => "text",
        Value::Blob(_) => "blob",
    }
}

fn mismatch(name: &str, expected: &'static str, found: &Value) -> FieldError {
    FieldError::TypeMismatch {
        field: name.to_string(),
        expected,
        found: value_kind(found),
    }
}

fn null(name: &str) -> FieldError {
    FieldError::UnexpectedNull {
        field: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldError, FieldMap};
    use rusqlite::types::Value;

    #[test]
    fn absent_fields_read_as_none() {
        let fields = FieldMap::new();
        assert_eq!(fields.text("name").unwrap(), None);
        assert_eq!(fields.nullable_integer("age").unwrap(), None);
        assert_eq!(fields.boolean("active").unwrap(), None);
    }

    #[test]
    fn nullable_accessors_distinguish_null_from_absent() {
        let fields = FieldMap::new().with("email", Value::Null);
        assert_eq!(fields.nullable_text("email").unwrap(), Some(None));

        let err = fields.text("email").unwrap_err();
        assert_eq!(
            err,
            FieldError::UnexpectedNull {
                field: "email".to_string()
            }
        );
    }

    #[test]
    fn type_mismatch_names_field_and_kinds() {
        let fields = FieldMap::new().with("age", "forty".to_string());
        let err = fields.integer("age").unwrap_err();
        assert_eq!(
            err.to_string(),
            "field `age` expected integer, found text"
        );
    }

    #[test]
    fn boolean_accepts_only_zero_and_one() {
        let fields = FieldMap::new()
            .with("yes", 1_i64)
            .with("no", 0_i64)
            .with("maybe", 2_i64);
        assert_eq!(fields.boolean("yes").unwrap(), Some(true));
        assert_eq!(fields.boolean("no").unwrap(), Some(false));
        assert!(fields.boolean("maybe").is_err());
    }

    #[test]
    fn real_widens_integers() {
        let fields = FieldMap::new().with("score", 3_i64);
        assert_eq!(fields.real("score").unwrap(), Some(3.0));
    }

    #[test]
    fn retain_columns_reports_discarded_names() {
        let mut fields = FieldMap::new()
            .with("name", "Ada".to_string())
            .with("is_admin", 1_i64)
            .with("id", 7_i64);

        let discarded = fields.retain_columns(&["name"]);
        assert_eq!(discarded, vec!["id".to_string(), "is_admin".to_string()]);
        assert_eq!(fields.len(), 1);
        assert!(fields.contains("name"));
    }
}
