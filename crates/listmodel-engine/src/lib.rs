//! Nested mutation engine for ListModel Rust.
//!
//! `listmodel-engine` is the **mutation resolution layer**. It accepts a
//! root create/update/delete whose operation tree may contain nested
//! connect/disconnect/create operations on relationship fields, executes it
//! against per-list storage adapters, and propagates back-reference updates
//! so both sides of every two-way relationship stay consistent.
//!
//! # Role In The Architecture
//!
//! - **Validation**: operation trees are checked in full before any write.
//! - **Nested creates**: materialized bottom-up so parents can reference
//!   their children's ids.
//! - **Diff-driven updates**: writes and propagation follow the diff
//!   against current state, making connect/disconnect idempotent.
//! - **Cascade on delete**: every edge targeting the deleted record's list
//!   is scanned and stripped, one-way edges included.
//!
//! # Example
//!
//! ```ignore
//! let mut engine = Engine::new(schema);
//! engine.register_store("Student", MemoryStore::new("Student"))?;
//! engine.register_store("Teacher", MemoryStore::new("Teacher"))?;
//!
//! let student = engine
//!     .create(
//!         &cx,
//!         "Student",
//!         &MutationData::new()
//!             .set("name", "Ada")
//!             .relationship("teachers", RelationshipInput::new().connect(t1.clone())),
//!     )
//!     .await?;
//! // t1's `students` field now lists the new student's id.
//! ```

pub mod engine;
pub mod input;
mod propagate;

pub use engine::{Engine, MAX_NESTED_DEPTH};
pub use input::{FieldInput, MutationData, RelationshipInput};
