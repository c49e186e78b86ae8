//! Field descriptors and the field type registry.
//!
//! Field kinds form a closed set — a tagged [`FieldType`] enum rather than
//! open-ended dynamic dispatch — so consumers can exhaustively enumerate
//! relationship fields without runtime type inspection.

use crate::relationship::RelationshipDef;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// The scalar types a plain field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarType {
    /// Boolean values.
    Bool,
    /// 64-bit signed integers.
    Int,
    /// 64-bit floating point numbers.
    Float,
    /// Text strings.
    Text,
}

impl ScalarType {
    /// The type name used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            ScalarType::Bool => "BOOLEAN",
            ScalarType::Int => "INTEGER",
            ScalarType::Float => "FLOAT",
            ScalarType::Text => "TEXT",
        }
    }

    /// Whether the given value is storable in a field of this type.
    ///
    /// `Null` is accepted by every scalar type; integers are accepted by
    /// float fields.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (ScalarType::Bool, Value::Bool(_)) => true,
            (ScalarType::Int, Value::Int(_)) => true,
            (ScalarType::Float, Value::Float(_) | Value::Int(_)) => true,
            (ScalarType::Text, Value::Text(_)) => true,
            _ => false,
        }
    }
}

/// The kind of a declared field: plain scalar or relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldType {
    /// A plain scalar field.
    Scalar(ScalarType),
    /// A relationship field referencing records of another (or the same) list.
    Relationship(RelationshipDef),
}

impl FieldType {
    /// Whether this is a relationship field.
    pub fn is_relationship(&self) -> bool {
        matches!(self, FieldType::Relationship(_))
    }

    /// The relationship declaration, if this is a relationship field.
    pub fn as_relationship(&self) -> Option<&RelationshipDef> {
        match self {
            FieldType::Relationship(def) => Some(def),
            FieldType::Scalar(_) => None,
        }
    }

    /// The scalar type, if this is a scalar field.
    pub fn as_scalar(&self) -> Option<ScalarType> {
        match self {
            FieldType::Scalar(ty) => Some(*ty),
            FieldType::Relationship(_) => None,
        }
    }
}

/// A declared field: a name plus its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// The field name, unique within its list.
    pub name: String,
    /// The field's kind and kind-specific declaration.
    pub field_type: FieldType,
}

impl FieldDescriptor {
    /// Declare a scalar field.
    pub fn scalar(name: impl Into<String>, scalar_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Scalar(scalar_type),
        }
    }

    /// Declare a boolean field.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarType::Bool)
    }

    /// Declare an integer field.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarType::Int)
    }

    /// Declare a float field.
    pub fn float(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarType::Float)
    }

    /// Declare a text field.
    pub fn text(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarType::Text)
    }

    /// Declare a relationship field.
    pub fn relationship(name: impl Into<String>, def: RelationshipDef) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Relationship(def),
        }
    }

    /// Whether this is a relationship field.
    pub fn is_relationship(&self) -> bool {
        self.field_type.is_relationship()
    }

    /// The relationship declaration, if any.
    pub fn as_relationship(&self) -> Option<&RelationshipDef> {
        self.field_type.as_relationship()
    }
}
