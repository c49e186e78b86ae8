//! Records and record identity.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An opaque record identifier, unique within its list.
///
/// Ids are assigned by the storage adapter on create; the engine never
/// inspects their contents, only compares them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create an id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The string form of this id.
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
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Field values keyed by field name, as exchanged with storage adapters.
pub type FieldValues = BTreeMap<String, Value>;

/// A stored record: an id plus its field values.
///
/// The engine treats records as adapter-owned documents. It re-reads them
/// from storage before and after mutation rather than holding onto
/// in-memory references, so a `Record` is always a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The record's id within its list.
    pub id: RecordId,
    /// The record's field values. Missing relationship entries read as empty.
    pub values: FieldValues,
}

impl Record {
    /// Create a record from an id and values.
    pub fn new(id: RecordId, values: FieldValues) -> Self {
        Self { id, values }
    }

    /// Get a field value, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Get a field value, treating a missing entry as `Null`.
    pub fn value_or_null(&self, field: &str) -> &Value {
        self.values.get(field).unwrap_or(&Value::Null)
    }

    /// The foreign ids a relationship field currently references.
    ///
    /// A missing entry reads as no references.
    pub fn references(&self, field: &str) -> &[RecordId] {
        self.value_or_null(field).referenced_ids()
    }

    /// Set a field value, returning the previous one if any.
    pub fn set(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(field.into(), value)
    }
}
