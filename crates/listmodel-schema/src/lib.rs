//! Schema registry and relationship edge resolution for ListModel Rust.
//!
//! This crate compiles list declarations into the process-wide immutable
//! [`SchemaRegistry`]:
//!
//! - [`ListDescriptor`] — one record type: name + ordered typed fields
//! - [`SchemaBuilder`] — declare lists, validate, build the registry
//! - [`Edge`] — the mutation-time view of a relationship field, resolved
//!   on demand and never cached
//!
//! Schema validation happens entirely at build time; asymmetric counterpart
//! declarations, unknown targets, and malformed names never survive to
//! mutation handling.

pub mod edge;
pub mod list;
pub mod registry;

pub use edge::Edge;
pub use list::ListDescriptor;
pub use registry::{SchemaBuilder, SchemaRegistry};
