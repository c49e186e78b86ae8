//! In-memory storage adapter for ListModel Rust.
//!
//! This crate provides [`MemoryStore`], a `ListStore` implementation backed
//! by a mutex-protected map. It is the reference adapter used by the test
//! suites and works for embedded/single-process deployments.
//!
//! # Consistency
//!
//! Each operation takes the store lock once, so single operations are
//! atomic and read-your-writes holds trivially. There is no cross-mutation
//! isolation: two concurrent read-modify-write sequences on the same record
//! can lose updates, exactly as the storage contract allows.
//!
//! # Example
//!
//! ```rust,ignore
//! use listmodel_memory::MemoryStore;
//! use listmodel_core::{Cx, FieldValues, Filter, ListStore, Outcome, Value};
//!
//! let store = MemoryStore::new("Student");
//! let cx = Cx::for_testing();
//! let mut values = FieldValues::new();
//! values.insert("name".to_string(), Value::from("Ada"));
//! match store.create(&cx, values).await {
//!     Outcome::Ok(record) => println!("created {}", record.id),
//!     Outcome::Err(e) => eprintln!("error: {}", e),
//!     _ => {}
//! }
//! ```

pub mod store;

pub use store::MemoryStore;
