//! Collection schemas and the schema collaborator interface.
//!
//! A schema lists a collection's fields and flags the sensitive ones. The
//! core never owns schemas; it asks a [`SchemaSource`] for them.

use crate::error::{CoreError, CoreResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One field in a collection schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name as stored in records.
    pub handle: String,
    /// Field type (e.g. `text`, `textarea`).
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    /// Whether the field's string values are encrypted at rest.
    #[serde(default)]
    pub sensitive: bool,
}

fn default_field_type() -> String {
    "text".to_string()
}

impl FieldDefinition {
    /// A non-sensitive text field.
    pub fn text(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            field_type: default_field_type(),
            sensitive: false,
        }
    }

    /// Marks the field sensitive.
    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// Schema of one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Collection handle.
    pub handle: String,
    /// Human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            title: None,
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Names of the sensitive fields, in declaration order, without duplicates.
    #[must_use]
    pub fn sensitive_field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for field in self.fields.iter().filter(|f| f.sensitive) {
            if !names.contains(&field.handle) {
                names.push(field.handle.clone());
            }
        }
        names
    }
}

/// Supplies collection schemas to the core.
pub trait SchemaSource: Send + Sync {
    /// Handles of every known collection, in a stable order.
    fn collections(&self) -> Vec<String>;

    /// The schema of a collection, or `None` if it is unknown.
    fn schema(&self, handle: &str) -> Option<Schema>;

    /// Ordered sensitive field names; empty for unknown collections.
    fn sensitive_field_names(&self, handle: &str) -> Vec<String> {
        self.schema(handle)
            .map(|schema| schema.sensitive_field_names())
            .unwrap_or_default()
    }

    /// Returns `true` if the collection is known.
    fn contains(&self, handle: &str) -> bool {
        self.schema(handle).is_some()
    }
}

#[derive(Debug, Deserialize)]
struct SchemaFile {
    collections: Vec<Schema>,
}

/// In-memory [`SchemaSource`], loadable from JSON.
///
/// ```json
/// { "collections": [
///     { "handle": "contact", "fields": [
///         { "handle": "name" },
///         { "handle": "email", "sensitive": true }
///     ] }
/// ] }
/// ```
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<BTreeMap<String, Schema>>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the given schemas.
    #[must_use]
    pub fn with_schemas(schemas: impl IntoIterator<Item = Schema>) -> Self {
        let registry = Self::new();
        for schema in schemas {
            registry.insert(schema);
        }
        registry
    }

    /// Parses a registry from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid JSON or duplicate collection handles.
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let file: SchemaFile =
            serde_json::from_str(json).map_err(|e| CoreError::invalid_schema(e.to_string()))?;

        let registry = Self::new();
        for schema in file.collections {
            if schema.handle.is_empty() {
                return Err(CoreError::invalid_schema("collection handle is empty"));
            }
            if let Some(previous) = registry.insert(schema) {
                return Err(CoreError::invalid_schema(format!(
                    "duplicate collection '{}'",
                    previous.handle
                )));
            }
        }
        Ok(registry)
    }

    /// Reads a registry from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            CoreError::invalid_schema(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// Adds or replaces a schema, returning the previous one.
    ///
    /// Callers caching resolved fields must invalidate them afterwards.
    pub fn insert(&self, schema: Schema) -> Option<Schema> {
        self.schemas.write().insert(schema.handle.clone(), schema)
    }

    /// Removes a schema.
    pub fn remove(&self, handle: &str) -> Option<Schema> {
        self.schemas.write().remove(handle)
    }
}

impl SchemaSource for SchemaRegistry {
    fn collections(&self) -> Vec<String> {
        self.schemas.read().keys().cloned().collect()
    }

    fn schema(&self, handle: &str) -> Option<Schema> {
        self.schemas.read().get(handle).cloned()
    }
}
