//! Record data model.
//!
//! A record is an ordered mapping from field name to a JSON value. Field
//! values are usually strings, but may be `null` or structured data (lists,
//! nested maps) which the encryption layers never touch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque record identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a new random identifier (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A stored record belonging to exactly one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record identifier.
    pub id: RecordId,
    /// Handle of the owning collection.
    pub collection: String,
    /// Field values in insertion order.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Creates an empty record with a freshly generated ID.
    pub fn new(collection: impl Into<String>) -> Self {
        Self::with_id(RecordId::generate(), collection)
    }

    /// Creates an empty record with the given ID.
    pub fn with_id(id: impl Into<RecordId>, collection: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            collection: collection.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the raw value of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns the value of a field if it is a string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Sets a field value, keeping its position if it already exists.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(RecordId::generate(), RecordId::generate());
    }

    #[test]
    fn get_str_ignores_structured_values() {
        let record = Record::with_id("r1", "contact")
            .field("name", "John Doe")
            .field("tags", json!(["a", "b"]))
            .field("phone", Value::Null);

        assert_eq!(record.get_str("name"), Some("John Doe"));
        assert_eq!(record.get_str("tags"), None);
        assert_eq!(record.get_str("phone"), None);
        assert_eq!(record.get_str("missing"), None);
    }

    #[test]
    fn set_preserves_field_order() {
        let mut record = Record::with_id("r1", "contact")
            .field("name", "John Doe")
            .field("email", "john@example.com")
            .field("message", "Hello!");

        record.set("email", "changed");

        let names: Vec<&str> = record.fields.keys().map(String::as_str).collect();
        assert_eq!(names, ["name", "email", "message"]);
    }

    #[test]
    fn json_shape() {
        let record = Record::with_id("r1", "contact").field("email", "a@b.c");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            json!({"id": "r1", "collection": "contact", "fields": {"email": "a@b.c"}})
        );
    }
}
