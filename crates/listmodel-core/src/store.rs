//! Storage adapter contract.
//!
//! The engine consumes a minimal per-list CRUD contract; everything else
//! (relationship resolution, back-reference propagation, cascade cleanup)
//! is layered on top of it. All operations integrate with asupersync's
//! structured concurrency via `Cx` for proper cancellation handling.
//!
//! The contract offers no cross-mutation isolation: concurrent mutations of
//! one record are resolved read-modify-write, and any stronger guarantee
//! (per-record compare-and-swap, transactions) is the adapter's business.

use crate::error::Error;
use crate::record::{FieldValues, Record, RecordId};
use asupersync::{Cx, Outcome};
use std::future::Future;

/// A filter for [`ListStore::find_all`].
///
/// Only the shapes the engine needs exist; `FieldReferences` powers the
/// dangling-reference scan on delete.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Match every record.
    All,
    /// Match records whose named field references the given id.
    FieldReferences {
        /// The relationship field to inspect.
        field: String,
        /// The id the field must reference.
        id: RecordId,
    },
}

impl Filter {
    /// Build a field-references filter.
    pub fn field_references(field: impl Into<String>, id: RecordId) -> Self {
        Filter::FieldReferences {
            field: field.into(),
            id,
        }
    }

    /// Whether the given record matches this filter.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Filter::All => true,
            Filter::FieldReferences { field, id } => record.value_or_null(field).references(id),
        }
    }
}

/// Per-list storage adapter.
///
/// One instance serves exactly one list. Implementations must be
/// `Send + Sync`; within one mutation's lifetime the adapter must offer at
/// least read-your-writes consistency.
///
/// # Example
///
/// ```rust,ignore
/// let store = MemoryStore::new("Student");
/// let cx = Cx::for_testing();
/// match store.create(&cx, FieldValues::new()).await {
///     Outcome::Ok(record) => println!("created {}", record.id),
///     Outcome::Err(e) => eprintln!("error: {}", e),
///     _ => {}
/// }
/// ```
pub trait ListStore: Send + Sync {
    /// Insert a new record, assigning it a fresh id.
    fn create(
        &self,
        cx: &Cx,
        values: FieldValues,
    ) -> impl Future<Output = Outcome<Record, Error>> + Send;

    /// Fetch a record by id. Absence is `Ok(None)`, not an error.
    fn find_by_id(
        &self,
        cx: &Cx,
        id: &RecordId,
    ) -> impl Future<Output = Outcome<Option<Record>, Error>> + Send;

    /// Merge the given field values into an existing record.
    ///
    /// Fails with `NotFound` if the id is absent. Fields not named in
    /// `values` keep their stored value.
    fn update(
        &self,
        cx: &Cx,
        id: &RecordId,
        values: FieldValues,
    ) -> impl Future<Output = Outcome<Record, Error>> + Send;

    /// Delete a record. Fails with `NotFound` if the id is absent.
    fn delete(&self, cx: &Cx, id: &RecordId) -> impl Future<Output = Outcome<(), Error>> + Send;

    /// Fetch every record matching the filter, in insertion order.
    fn find_all(
        &self,
        cx: &Cx,
        filter: &Filter,
    ) -> impl Future<Output = Outcome<Vec<Record>, Error>> + Send;
}
