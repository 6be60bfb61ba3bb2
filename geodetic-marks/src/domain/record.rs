//! Decoded mark records.

use serde_json::{Map, Value};

/// Prefix marking fields that are internal to the geodetic database.
const INTERNAL_PREFIX: char = '_';

/// Error returned when a payload cannot be decoded into a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid mark payload: {0}")]
pub struct InvalidPayload(pub String);

/// A geodetic mark record as returned by the database.
///
/// The database returns a free-form JSON document whose fields vary between
/// marks, so the record is an explicit field-name mapping rather than a fixed
/// struct. Internal fields (names starting with `_`) are removed at every
/// level when the record is built.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkRecord {
    fields: Map<String, Value>,
}

impl MarkRecord {
    /// Decode a raw JSON payload.
    ///
    /// Returns `Ok(None)` for an empty body or JSON `null`, which is how the
    /// database reports a mark that does not exist.
    pub fn from_json(payload: &str) -> Result<Option<Self>, InvalidPayload> {
        let trimmed = payload.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let value: Value =
            serde_json::from_str(trimmed).map_err(|e| InvalidPayload(e.to_string()))?;

        match strip_internal(value) {
            Value::Null => Ok(None),
            Value::Object(fields) => Ok(Some(Self { fields })),
            other => Err(InvalidPayload(format!(
                "expected a JSON object, got {}",
                kind(&other)
            ))),
        }
    }

    /// Build a record from an already decoded JSON object.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        match strip_internal(Value::Object(fields)) {
            Value::Object(fields) => Self { fields },
            _ => Self { fields: Map::new() },
        }
    }

    /// Look up a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Look up a string field.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Look up a nested object field as a record.
    pub fn get_record(&self, field: &str) -> Option<MarkRecord> {
        self.get(field)
            .and_then(Value::as_object)
            .map(|fields| MarkRecord {
                fields: fields.clone(),
            })
    }

    /// Whether the record has the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Field names in the record.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate over `(field, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Borrow the underlying mapping.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consume the record, returning the underlying mapping.
    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }
}

/// Recursively drop internal fields from objects, including objects inside arrays.
fn strip_internal(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| !k.starts_with(INTERNAL_PREFIX))
                .map(|(k, v)| (k, strip_internal(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_internal).collect()),
        other => other,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_object() {
        let record = MarkRecord::from_json(r#"{"code":"ABCD","name":"Trig A"}"#)
            .unwrap()
            .unwrap();

        assert_eq!(record.get_str("code"), Some("ABCD"));
        assert_eq!(record.get_str("name"), Some("Trig A"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn null_and_empty_mean_no_record() {
        assert_eq!(MarkRecord::from_json("null").unwrap(), None);
        assert_eq!(MarkRecord::from_json("").unwrap(), None);
        assert_eq!(MarkRecord::from_json("  \n").unwrap(), None);
    }

    #[test]
    fn rejects_non_object() {
        let err = MarkRecord::from_json("[1,2,3]").unwrap_err();
        assert!(err.to_string().contains("an array"));

        assert!(MarkRecord::from_json("\"ABCD\"").is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(MarkRecord::from_json("{\"code\":").is_err());
    }

    #[test]
    fn strips_internal_fields_at_every_level() {
        let payload = json!({
            "code": "ABCD",
            "_id": 17,
            "coordinate": {"lat": -41.2, "_srid": 4167},
            "marks": [{"name": "A", "_private": true}, 3]
        });

        let record = MarkRecord::from_json(&payload.to_string()).unwrap().unwrap();

        assert!(!record.contains("_id"));
        let coord = record.get_record("coordinate").unwrap();
        assert!(coord.contains("lat"));
        assert!(!coord.contains("_srid"));
        assert_eq!(record.get("marks"), Some(&json!([{"name": "A"}, 3])));
    }

    #[test]
    fn from_map_strips_internal_fields() {
        let mut map = Map::new();
        map.insert("code".into(), json!("ABCD"));
        map.insert("_hidden".into(), json!(1));

        let record = MarkRecord::from_map(map);
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["code"]);
    }

    #[test]
    fn nested_non_object_is_not_a_record() {
        let record = MarkRecord::from_json(r#"{"code":"ABCD"}"#).unwrap().unwrap();
        assert!(record.get_record("code").is_none());
        assert!(record.get_record("missing").is_none());
    }
}
