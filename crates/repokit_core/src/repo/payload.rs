//! Save payload conversion.
//!
//! Anything that can become a flat column map is a valid payload. Values that
//! serialize to something else (arrays, scalars, nested objects) are rejected
//! with `RepoError::InvalidPayload`.

use crate::model::field::FieldMap;
use crate::repo::error::{RepoError, RepoResult};
use rusqlite::types::Value;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};

/// Conversion into the field map applied by `save`.
pub trait IntoFieldMap {
    fn into_field_map(self) -> RepoResult<FieldMap>;
}

/// Wraps any `Serialize` value so it can be used as a save payload.
///
/// ```ignore
/// repo.create(Serialized(&form))?;
/// ```
#[derive(Debug)]
pub struct Serialized<'a, T: ?Sized>(pub &'a T);

impl IntoFieldMap for FieldMap {
    fn into_field_map(self) -> RepoResult<FieldMap> {
        Ok(self)
    }
}

impl IntoFieldMap for &FieldMap {
    fn into_field_map(self) -> RepoResult<FieldMap> {
        Ok(self.clone())
    }
}

impl IntoFieldMap for HashMap<String, Value> {
    fn into_field_map(self) -> RepoResult<FieldMap> {
        Ok(FieldMap::from(self))
    }
}

impl IntoFieldMap for BTreeMap<String, Value> {
    fn into_field_map(self) -> RepoResult<FieldMap> {
        Ok(FieldMap::from(self))
    }
}

impl<K: Into<String>, V: Into<Value>> IntoFieldMap for Vec<(K, V)> {
    fn into_field_map(self) -> RepoResult<FieldMap> {
        Ok(self.into_iter().collect())
    }
}

impl IntoFieldMap for JsonValue {
    fn into_field_map(self) -> RepoResult<FieldMap> {
        match self {
            JsonValue::Object(map) => map.into_field_map(),
            other => Err(RepoError::InvalidPayload(format!(
                "expected an object of fields, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl IntoFieldMap for Map<String, JsonValue> {
    fn into_field_map(self) -> RepoResult<FieldMap> {
        let mut fields = FieldMap::new();
        for (name, value) in self {
            let value = json_to_sql(&name, value)?;
            fields.insert(name, value);
        }
        Ok(fields)
    }
}

impl<T: Serialize + ?Sized> IntoFieldMap for Serialized<'_, T> {
    fn into_field_map(self) -> RepoResult<FieldMap> {
        let value = serde_json::to_value(self.0)
            .map_err(|err| RepoError::InvalidPayload(format!("payload failed to serialize: {err}")))?;
        value.into_field_map()
    }
}

fn json_to_sql(name: &str, value: JsonValue) -> RepoResult<Value> {
    match value {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(flag) => Ok(Value::Integer(i64::from(flag))),
        JsonValue::String(text) => Ok(Value::Text(text)),
        JsonValue::Number(number) => {
            if let Some(integer) = number.as_i64() {
                Ok(Value::Integer(integer))
            } else if number.is_u64() {
                Err(RepoError::InvalidPayload(format!(
                    "field `{name}` is out of integer range: {number}"
                )))
            } else {
                number.as_f64().map(Value::Real).ok_or_else(|| {
                    RepoError::InvalidPayload(format!("field `{name}` is not a finite number"))
                })
            }
        }
        nested @ (JsonValue::Array(_) | JsonValue::Object(_)) => Err(RepoError::InvalidPayload(
            format!("field `{name}` holds a nested {}", json_kind(&nested)),
        )),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{IntoFieldMap, Serialized};
    use crate::repo::error::RepoError;
    use rusqlite::types::Value;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct SignupForm {
        name: String,
        age: u8,
        newsletter: bool,
        nickname: Option<String>,
    }

    #[test]
    fn serialized_struct_becomes_field_map() {
        let form = SignupForm {
            name: "Ada".to_string(),
            age: 36,
            newsletter: true,
            nickname: None,
        };

        let fields = Serialized(&form).into_field_map().unwrap();
        assert_eq!(fields.get("name"), Some(&Value::Text("Ada".to_string())));
        assert_eq!(fields.get("age"), Some(&Value::Integer(36)));
        assert_eq!(fields.get("newsletter"), Some(&Value::Integer(1)));
        assert_eq!(fields.get("nickname"), Some(&Value::Null));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = json!(["name", "Ada"]).into_field_map().unwrap_err();
        assert!(matches!(err, RepoError::InvalidPayload(message) if message.contains("array")));

        let err = Serialized(&42).into_field_map().unwrap_err();
        assert!(matches!(err, RepoError::InvalidPayload(_)));
    }

    #[test]
    fn nested_values_are_rejected() {
        let err = json!({ "name": "Ada", "tags": ["a", "b"] })
            .into_field_map()
            .unwrap_err();
        assert!(matches!(err, RepoError::InvalidPayload(message) if message.contains("tags")));
    }

    #[test]
    fn floats_map_to_real_values() {
        let fields = json!({ "score": 4.5 }).into_field_map().unwrap();
        assert_eq!(fields.get("score"), Some(&Value::Real(4.5)));
    }

    #[test]
    fn pair_vectors_are_payloads() {
        let fields = vec![("name", "Ada".to_string())].into_field_map().unwrap();
        assert_eq!(fields.len(), 1);
    }
}
