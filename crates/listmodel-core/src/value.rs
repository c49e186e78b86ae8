//! Dynamic field values.

use crate::record::RecordId;
use serde::{Deserialize, Serialize};

/// A dynamically-typed field value.
///
/// This enum represents every value a list field can hold. Relationship
/// fields store foreign ids: a single [`Value::Id`] for single-reference
/// fields, an ordered [`Value::IdList`] for to-many fields (insertion order
/// is connection order; duplicates are not permitted within one value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent / null value
    Null,

    /// Boolean value
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit floating point
    Float(f64),

    /// Text string
    Text(String),

    /// Single foreign id (single-reference relationship field)
    Id(RecordId),

    /// Ordered foreign ids (to-many relationship field)
    IdList(Vec<RecordId>),
}

impl Value {
    /// Check if this value is null.
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the type name of this value.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::Int(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::Text(_) => "TEXT",
            Value::Id(_) => "ID",
            Value::IdList(_) => "ID LIST",
        }
    }

    /// Try to convert this value to a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            Value::Int(v) => Some(*v != 0),
            _ => None,
        }
    }

    /// Try to convert this value to an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bool(v) => Some(if *v { 1 } else { 0 }),
            _ => None,
        }
    }

    /// Try to convert this value to an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a single record id.
    pub fn as_id(&self) -> Option<&RecordId> {
        match self {
            Value::Id(id) => Some(id),
            _ => None,
        }
    }

    /// The foreign ids this value references.
    ///
    /// `Id` yields a one-element slice, `IdList` its contents, everything
    /// else (including `Null`) an empty slice.
    pub fn referenced_ids(&self) -> &[RecordId] {
        match self {
            Value::Id(id) => std::slice::from_ref(id),
            Value::IdList(ids) => ids,
            _ => &[],
        }
    }

    /// Check whether this value references the given id.
    pub fn references(&self, id: &RecordId) -> bool {
        self.referenced_ids().contains(id)
    }

    /// Build a relationship value from resolved ids for the given arity.
    ///
    /// To-many fields always store an `IdList` (possibly empty); single
    /// fields store the first id or `Null`.
    pub fn from_ids(ids: Vec<RecordId>, many: bool) -> Self {
        if many {
            Value::IdList(ids)
        } else {
            match ids.into_iter().next() {
                Some(id) => Value::Id(id),
                None => Value::Null,
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<RecordId> for Value {
    fn from(v: RecordId) -> Self {
        Value::Id(v)
    }
}

impl From<Vec<RecordId>> for Value {
    fn from(v: Vec<RecordId>) -> Self {
        Value::IdList(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}
