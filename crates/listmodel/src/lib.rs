//! ListModel Rust - schema-driven lists with bidirectional relationships.
//!
//! ListModel lets an application declare record types ("lists") with typed
//! fields, including two-way relationship fields, and exposes
//! create/update/delete operations that keep both sides of every
//! relationship consistent over a plain CRUD storage adapter:
//!
//! - Declarative schemas with build-time validation
//! - Nested mutations: connect / disconnect / disconnectAll / create,
//!   nested arbitrarily deep (bounded by a depth guard)
//! - Back-reference propagation for every touched edge, applied before the
//!   mutation returns
//! - Cascade cleanup of dangling references on delete, one-way edges
//!   included
//!
//! # Quick Start
//!
//! ```ignore
//! use listmodel::prelude::*;
//! use std::sync::Arc;
//!
//! let schema = Arc::new(
//!     SchemaBuilder::new()
//!         .list(
//!             ListDescriptor::new("Student")
//!                 .field(FieldDescriptor::text("name"))
//!                 .field(FieldDescriptor::relationship(
//!                     "teachers",
//!                     RelationshipDef::to("Teacher").counterpart("students").many(true),
//!                 )),
//!         )
//!         .list(
//!             ListDescriptor::new("Teacher")
//!                 .field(FieldDescriptor::text("name"))
//!                 .field(FieldDescriptor::relationship(
//!                     "students",
//!                     RelationshipDef::to("Student").counterpart("teachers").many(true),
//!                 )),
//!         )
//!         .build()?,
//! );
//!
//! let mut engine = Engine::new(schema);
//! engine.register_store("Student", MemoryStore::new("Student"))?;
//! engine.register_store("Teacher", MemoryStore::new("Teacher"))?;
//!
//! // Create a student connected to two (new) teachers; both teachers'
//! // `students` fields now list the student's id.
//! let student = engine
//!     .create(
//!         &cx,
//!         "Student",
//!         &MutationData::new().set("name", "Ada").relationship(
//!             "teachers",
//!             RelationshipInput::new()
//!                 .create(MutationData::new().set("name", "A"))
//!                 .create(MutationData::new().set("name", "B")),
//!         ),
//!     )
//!     .await?;
//! ```

// Re-export asupersync primitives for structured concurrency
pub use asupersync::{Cx, Outcome};

pub use listmodel_core::{
    Cardinality, Error, FieldDescriptor, FieldType, FieldValidationError, FieldValues, Filter,
    ListStore, NotFoundError, Record, RecordId, RelationshipDef, Result, ScalarType, SchemaError,
    SchemaErrorKind, StorageError, ValidationError, ValidationErrorKind, Value,
};
pub use listmodel_engine::{
    Engine, FieldInput, MAX_NESTED_DEPTH, MutationData, RelationshipInput,
};
pub use listmodel_memory::MemoryStore;
pub use listmodel_schema::{Edge, ListDescriptor, SchemaBuilder, SchemaRegistry};

/// Commonly used imports.
///
/// ```ignore
/// use listmodel::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Cardinality, Cx, Edge, Engine, Error, FieldDescriptor, FieldInput, FieldValues, Filter,
        ListDescriptor, ListStore, MemoryStore, MutationData, Outcome, Record, RecordId,
        RelationshipDef, RelationshipInput, Result, ScalarType, SchemaBuilder, SchemaRegistry,
        Value,
    };
}
