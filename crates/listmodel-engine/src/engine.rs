//! The nested mutation engine.
//!
//! A root mutation (create, update, delete) walks its operation tree
//! depth-first, performs the storage writes, and runs back-reference
//! propagation for every relationship edge it touches before returning.
//!
//! Execution is phased so that invalid input never causes a partial write:
//!
//! 1. **Validate** — a pure walk of the operation tree (shape, field kinds,
//!    single-reference arity, nesting depth). Aborts before any read.
//! 2. **Verify** — every `connect` target in the tree is looked up at its
//!    target list; a missing id aborts before any write.
//! 3. **Apply** — nested creates bottom-up, then the root write, then
//!    propagation per touched edge. A storage failure here can leave
//!    earlier writes applied; rollback is the adapter's business, not ours.

use crate::input::{FieldInput, MutationData};
use asupersync::{Cx, Outcome};
use listmodel_core::{
    Error, FieldType, FieldValues, Filter, ListStore, NotFoundError, Record, RecordId,
    SchemaError, SchemaErrorKind, ValidationError, Value,
};
use listmodel_schema::SchemaRegistry;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Maximum nesting depth for `create` operations inside an operation tree.
///
/// Trees deeper than this are rejected with a `ValidationError` during the
/// validation phase, before any write.
pub const MAX_NESTED_DEPTH: usize = 16;

/// Which root mutation a tree belongs to; disconnect operations are only
/// valid under update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MutationKind {
    Create,
    Update,
}

/// The nested mutation engine: an immutable schema plus one storage adapter
/// handle per list.
///
/// The engine holds no other state and is safe to share across concurrent
/// mutations of unrelated records. It offers no cross-mutation isolation;
/// see the storage contract.
pub struct Engine<S: ListStore> {
    schema: Arc<SchemaRegistry>,
    stores: BTreeMap<String, S>,
}

impl<S: ListStore> Engine<S> {
    /// Create an engine over a built schema, with no adapters yet.
    pub fn new(schema: Arc<SchemaRegistry>) -> Self {
        Self {
            schema,
            stores: BTreeMap::new(),
        }
    }

    /// Register the storage adapter for a list, replacing any previous one.
    ///
    /// Fails with a `SchemaError` if the list is not part of the schema.
    #[allow(clippy::result_large_err)]
    pub fn register_store(&mut self, list: &str, store: S) -> Result<(), Error> {
        if !self.schema.has_list(list) {
            return Err(SchemaError::new(
                SchemaErrorKind::UnknownList,
                format!("cannot register adapter for unknown list '{list}'"),
            )
            .into());
        }
        self.stores.insert(list.to_string(), store);
        Ok(())
    }

    /// The schema this engine serves.
    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    /// The adapter for a list.
    #[allow(clippy::result_large_err)]
    pub fn store(&self, list: &str) -> Result<&S, Error> {
        self.stores.get(list).ok_or_else(|| {
            SchemaError::new(
                SchemaErrorKind::MissingAdapter,
                format!("no storage adapter registered for list '{list}'"),
            )
            .into()
        })
    }

    // ------------------------------------------------------------------
    // Phase 1: validation (pure)
    // ------------------------------------------------------------------

    #[allow(clippy::result_large_err)]
    fn validate_tree(
        &self,
        list_name: &str,
        data: &MutationData,
        kind: MutationKind,
        depth: usize,
        errors: &mut ValidationError,
    ) -> Result<(), Error> {
        let list = self.schema.list(list_name)?;

        for (field_name, input) in data.iter() {
            let Some(field) = list.field_named(field_name) else {
                errors.add_unknown_field(field_name, list_name);
                continue;
            };

            match (input, &field.field_type) {
                (FieldInput::Scalar(value), FieldType::Scalar(scalar_type)) => {
                    if !scalar_type.accepts(value) {
                        errors.add_wrong_value_type(
                            field_name,
                            scalar_type.type_name(),
                            value.type_name(),
                        );
                    }
                }
                (FieldInput::Scalar(_), FieldType::Relationship(_)) => {
                    errors.add_input_kind_mismatch(
                        field_name,
                        "relationship field takes connect/disconnect/create operations, not a scalar value",
                    );
                }
                (FieldInput::Relationship(_), FieldType::Scalar(_)) => {
                    errors.add_input_kind_mismatch(
                        field_name,
                        "scalar field cannot take relationship operations",
                    );
                }
                (FieldInput::Relationship(rel), FieldType::Relationship(def)) => {
                    if kind == MutationKind::Create
                        && (!rel.disconnect.is_empty() || rel.disconnect_all)
                    {
                        errors.add_disconnect_on_create(field_name);
                    }
                    if rel.disconnect_all && !rel.disconnect.is_empty() {
                        errors.add_conflicting_operations(field_name);
                    }
                    if !def.many {
                        let resolved = rel.connect.len() + rel.create.len();
                        if resolved > 1 {
                            errors.add_too_many_references(field_name, resolved);
                        }
                    }
                    for nested in &rel.create {
                        if depth + 1 > MAX_NESTED_DEPTH {
                            errors.add_nesting_too_deep(field_name, MAX_NESTED_DEPTH);
                        } else {
                            self.validate_tree(
                                &def.target_list,
                                nested,
                                MutationKind::Create,
                                depth + 1,
                                errors,
                            )?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Phase 2: connect-target verification (reads only)
    // ------------------------------------------------------------------

    #[allow(clippy::result_large_err)]
    fn collect_connect_targets(
        &self,
        list_name: &str,
        data: &MutationData,
        out: &mut Vec<(String, RecordId)>,
    ) -> Result<(), Error> {
        let list = self.schema.list(list_name)?;
        for (field_name, input) in data.iter() {
            let FieldInput::Relationship(rel) = input else {
                continue;
            };
            let Some(def) = list.field_named(field_name).and_then(|f| f.as_relationship()) else {
                continue;
            };
            for id in &rel.connect {
                out.push((def.target_list.clone(), id.clone()));
            }
            for nested in &rel.create {
                self.collect_connect_targets(&def.target_list, nested, out)?;
            }
        }
        Ok(())
    }

    async fn verify_connect_targets(
        &self,
        cx: &Cx,
        targets: &[(String, RecordId)],
    ) -> Outcome<(), Error> {
        for (list, id) in targets {
            let store = match self.store(list) {
                Ok(store) => store,
                Err(e) => return Outcome::Err(e),
            };
            match store.find_by_id(cx, id).await {
                Outcome::Ok(Some(_)) => {}
                Outcome::Ok(None) => {
                    return Outcome::Err(Error::NotFound(NotFoundError::new(list, id.clone())));
                }
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            }
        }
        Outcome::Ok(())
    }

    // ------------------------------------------------------------------
    // Phase 3: apply
    // ------------------------------------------------------------------

    /// Materialize a create tree bottom-up and return the new record's id.
    ///
    /// Boxed because the future recurses through nested creates.
    fn apply_create<'a>(
        &'a self,
        cx: &'a Cx,
        list_name: &'a str,
        data: &'a MutationData,
    ) -> Pin<Box<dyn Future<Output = Outcome<RecordId, Error>> + Send + 'a>> {
        Box::pin(async move {
            let list = match self.schema.list(list_name) {
                Ok(list) => list,
                Err(e) => return Outcome::Err(e),
            };

            let mut values = FieldValues::new();
            let mut touched: Vec<(String, Vec<RecordId>)> = Vec::new();

            for (field_name, input) in data.iter() {
                let Some(field) = list.field_named(field_name) else {
                    continue;
                };
                match (input, &field.field_type) {
                    (FieldInput::Scalar(value), FieldType::Scalar(_)) => {
                        values.insert(field_name.to_string(), value.clone());
                    }
                    (FieldInput::Relationship(rel), FieldType::Relationship(def)) => {
                        // Connect targets first, then created records, each
                        // group in request order; duplicates collapse.
                        let mut ids: Vec<RecordId> = Vec::new();
                        for id in &rel.connect {
                            if !ids.contains(id) {
                                ids.push(id.clone());
                            }
                        }
                        for nested in &rel.create {
                            match self.apply_create(cx, &def.target_list, nested).await {
                                Outcome::Ok(id) => {
                                    if !ids.contains(&id) {
                                        ids.push(id);
                                    }
                                }
                                Outcome::Err(e) => return Outcome::Err(e),
                                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                                Outcome::Panicked(p) => return Outcome::Panicked(p),
                            }
                        }
                        values.insert(
                            field_name.to_string(),
                            Value::from_ids(ids.clone(), def.many),
                        );
                        if !ids.is_empty() {
                            touched.push((field_name.to_string(), ids));
                        }
                    }
                    _ => {}
                }
            }

            let store = match self.store(list_name) {
                Ok(store) => store,
                Err(e) => return Outcome::Err(e),
            };
            let record = match store.create(cx, values).await {
                Outcome::Ok(record) => record,
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            };
            tracing::debug!(list = list_name, id = %record.id, "created record");

            for (field_name, added) in &touched {
                let edge = match self.schema.resolve_edge(list_name, field_name) {
                    Ok(edge) => edge,
                    Err(e) => return Outcome::Err(e),
                };
                match self.propagate(cx, &edge, &record.id, added, &[]).await {
                    Outcome::Ok(()) => {}
                    Outcome::Err(e) => return Outcome::Err(e),
                    Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                    Outcome::Panicked(p) => return Outcome::Panicked(p),
                }
            }

            Outcome::Ok(record.id)
        })
    }

    /// Read the finished record back so the caller never observes
    /// pre-propagation state.
    async fn reload(&self, cx: &Cx, list_name: &str, id: &RecordId) -> Outcome<Record, Error> {
        let store = match self.store(list_name) {
            Ok(store) => store,
            Err(e) => return Outcome::Err(e),
        };
        match store.find_by_id(cx, id).await {
            Outcome::Ok(Some(record)) => Outcome::Ok(record),
            Outcome::Ok(None) => {
                Outcome::Err(Error::NotFound(NotFoundError::new(list_name, id.clone())))
            }
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    // ------------------------------------------------------------------
    // Public operations
    // ------------------------------------------------------------------

    /// Create a record, resolving nested relationship operations.
    #[tracing::instrument(level = "debug", skip(self, cx, data))]
    pub async fn create(
        &self,
        cx: &Cx,
        list_name: &str,
        data: &MutationData,
    ) -> Outcome<Record, Error> {
        let mut errors = ValidationError::new();
        if let Err(e) = self.validate_tree(list_name, data, MutationKind::Create, 0, &mut errors) {
            return Outcome::Err(e);
        }
        if let Err(invalid) = errors.into_result() {
            return Outcome::Err(Error::Validation(invalid));
        }

        let mut targets = Vec::new();
        if let Err(e) = self.collect_connect_targets(list_name, data, &mut targets) {
            return Outcome::Err(e);
        }
        match self.verify_connect_targets(cx, &targets).await {
            Outcome::Ok(()) => {}
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        }

        let id = match self.apply_create(cx, list_name, data).await {
            Outcome::Ok(id) => id,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };
        self.reload(cx, list_name, &id).await
    }

    /// Update a record, resolving nested relationship operations.
    ///
    /// Relationship writes are driven by the diff against the record's
    /// current value, so connecting an already-connected id or
    /// disconnecting an absent one is a no-op with no propagation.
    #[tracing::instrument(level = "debug", skip(self, cx, data))]
    pub async fn update(
        &self,
        cx: &Cx,
        list_name: &str,
        id: &RecordId,
        data: &MutationData,
    ) -> Outcome<Record, Error> {
        let mut errors = ValidationError::new();
        if let Err(e) = self.validate_tree(list_name, data, MutationKind::Update, 0, &mut errors) {
            return Outcome::Err(e);
        }
        if let Err(invalid) = errors.into_result() {
            return Outcome::Err(Error::Validation(invalid));
        }

        let mut targets = Vec::new();
        if let Err(e) = self.collect_connect_targets(list_name, data, &mut targets) {
            return Outcome::Err(e);
        }
        match self.verify_connect_targets(cx, &targets).await {
            Outcome::Ok(()) => {}
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        }

        let list = match self.schema.list(list_name) {
            Ok(list) => list,
            Err(e) => return Outcome::Err(e),
        };
        let store = match self.store(list_name) {
            Ok(store) => store,
            Err(e) => return Outcome::Err(e),
        };
        let current = match store.find_by_id(cx, id).await {
            Outcome::Ok(Some(record)) => record,
            Outcome::Ok(None) => {
                return Outcome::Err(Error::NotFound(NotFoundError::new(list_name, id.clone())));
            }
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        let mut values = FieldValues::new();
        let mut touched: Vec<(String, Vec<RecordId>, Vec<RecordId>)> = Vec::new();

        for (field_name, input) in data.iter() {
            let Some(field) = list.field_named(field_name) else {
                continue;
            };
            match (input, &field.field_type) {
                (FieldInput::Scalar(value), FieldType::Scalar(_)) => {
                    values.insert(field_name.to_string(), value.clone());
                }
                (FieldInput::Relationship(rel), FieldType::Relationship(def)) => {
                    let current_ids: Vec<RecordId> = current.references(field_name).to_vec();

                    let removed_requested: Vec<RecordId> = if rel.disconnect_all {
                        current_ids.clone()
                    } else {
                        rel.disconnect
                            .iter()
                            .filter(|d| current_ids.contains(d))
                            .cloned()
                            .collect()
                    };
                    let survivors: Vec<RecordId> = current_ids
                        .iter()
                        .filter(|c| !removed_requested.contains(c))
                        .cloned()
                        .collect();

                    let mut requested: Vec<RecordId> = Vec::new();
                    for connect_id in &rel.connect {
                        if !requested.contains(connect_id) {
                            requested.push(connect_id.clone());
                        }
                    }
                    for nested in &rel.create {
                        match self.apply_create(cx, &def.target_list, nested).await {
                            Outcome::Ok(created) => {
                                if !requested.contains(&created) {
                                    requested.push(created);
                                }
                            }
                            Outcome::Err(e) => return Outcome::Err(e),
                            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                            Outcome::Panicked(p) => return Outcome::Panicked(p),
                        }
                    }

                    let final_ids: Vec<RecordId> = if def.many {
                        let mut ids = survivors;
                        for requested_id in requested {
                            if !ids.contains(&requested_id) {
                                ids.push(requested_id);
                            }
                        }
                        ids
                    } else if let Some(first) = requested.first() {
                        // A new reference replaces whatever the single
                        // field currently holds.
                        vec![first.clone()]
                    } else {
                        survivors
                    };

                    let added: Vec<RecordId> = final_ids
                        .iter()
                        .filter(|f| !current_ids.contains(f))
                        .cloned()
                        .collect();
                    let removed: Vec<RecordId> = current_ids
                        .iter()
                        .filter(|c| !final_ids.contains(c))
                        .cloned()
                        .collect();

                    values.insert(field_name.to_string(), Value::from_ids(final_ids, def.many));
                    if !added.is_empty() || !removed.is_empty() {
                        touched.push((field_name.to_string(), added, removed));
                    }
                }
                _ => {}
            }
        }

        match store.update(cx, id, values).await {
            Outcome::Ok(_) => {}
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        }
        tracing::debug!(list = list_name, id = %id, edges = touched.len(), "updated record");

        for (field_name, added, removed) in &touched {
            let edge = match self.schema.resolve_edge(list_name, field_name) {
                Ok(edge) => edge,
                Err(e) => return Outcome::Err(e),
            };
            match self.propagate(cx, &edge, id, added, removed).await {
                Outcome::Ok(()) => {}
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            }
        }

        self.reload(cx, list_name, id).await
    }

    /// Delete a record after stripping every reference to it, schema-wide.
    ///
    /// The scan covers every relationship field on every list whose edge
    /// targets the deleted record's list — one-way edges from other lists
    /// hold dangling references too, so the deleted record's own declared
    /// fields are not enough.
    #[tracing::instrument(level = "debug", skip(self, cx))]
    pub async fn delete(&self, cx: &Cx, list_name: &str, id: &RecordId) -> Outcome<Record, Error> {
        let store = match self.store(list_name) {
            Ok(store) => store,
            Err(e) => return Outcome::Err(e),
        };
        let record = match store.find_by_id(cx, id).await {
            Outcome::Ok(Some(record)) => record,
            Outcome::Ok(None) => {
                return Outcome::Err(Error::NotFound(NotFoundError::new(list_name, id.clone())));
            }
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        for edge in self.schema.edges_targeting(list_name) {
            let source_store = match self.store(&edge.source_list) {
                Ok(store) => store,
                Err(e) => return Outcome::Err(e),
            };
            let filter = Filter::field_references(&edge.source_field, id.clone());
            let referencing = match source_store.find_all(cx, &filter).await {
                Outcome::Ok(records) => records,
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            };
            for referrer in referencing {
                if edge.source_list == list_name && referrer.id == *id {
                    continue;
                }
                let remaining: Vec<RecordId> = referrer
                    .references(&edge.source_field)
                    .iter()
                    .filter(|r| *r != id)
                    .cloned()
                    .collect();
                let mut values = FieldValues::new();
                values.insert(
                    edge.source_field.clone(),
                    Value::from_ids(remaining, edge.source_many),
                );
                match source_store.update(cx, &referrer.id, values).await {
                    Outcome::Ok(_) => {}
                    Outcome::Err(e) => return Outcome::Err(e),
                    Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                    Outcome::Panicked(p) => return Outcome::Panicked(p),
                }
                tracing::trace!(
                    list = %edge.source_list,
                    field = %edge.source_field,
                    referrer = %referrer.id,
                    "stripped dangling reference"
                );
            }
        }

        match store.delete(cx, id).await {
            Outcome::Ok(()) => {}
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        }
        tracing::debug!(list = list_name, id = %id, "deleted record");
        Outcome::Ok(record)
    }
}
