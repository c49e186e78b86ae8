//! Core types and traits for ListModel Rust.
//!
//! This crate provides the foundational abstractions for schema-driven
//! lists with relationship fields:
//!
//! - `Value` and `Record` for dynamically-typed field data
//! - `FieldDescriptor` / `FieldType` for declared field kinds
//! - `RelationshipDef` and `Cardinality` for relationship declarations
//! - `ListStore` trait for storage adapters
//! - `Outcome` re-export from asupersync for cancel-correct operations
//! - `Cx` context for structured concurrency

// Re-export asupersync primitives for structured concurrency
pub use asupersync::{Cx, Outcome};

pub mod error;
pub mod field;
pub mod record;
pub mod relationship;
pub mod store;
pub mod value;

pub use error::{
    Error, FieldValidationError, NotFoundError, Result, SchemaError, SchemaErrorKind,
    StorageError, ValidationError, ValidationErrorKind,
};
pub use field::{FieldDescriptor, FieldType, ScalarType};
pub use record::{FieldValues, Record, RecordId};
pub use relationship::{Cardinality, RelationshipDef};
pub use store::{Filter, ListStore};
pub use value::Value;
