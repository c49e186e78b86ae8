//! Back-reference propagation.
//!
//! Given "record A's relationship field now includes/excludes record B",
//! the propagator applies the mirror-side update on B's counterpart field.
//! A relationship value on one side only ever moves between two states —
//! absent and connected — and every transition here is idempotent, so
//! re-propagating an already-applied change writes nothing.
//!
//! All propagated writes for one root mutation are applied before the
//! mutation returns; a caller observing the result afterwards never sees a
//! partially-propagated state relative to that mutation.

use crate::engine::Engine;
use asupersync::{Cx, Outcome};
use listmodel_core::{
    Error, FieldValues, ListStore, NotFoundError, RecordId, Value,
};
use listmodel_schema::Edge;

impl<S: ListStore> Engine<S> {
    /// Apply the mirror-side updates for one touched edge.
    ///
    /// `added` and `removed` are the diff of the forward field against its
    /// previous value; for a one-way edge there is no mirror and this is a
    /// no-op.
    pub(crate) async fn propagate(
        &self,
        cx: &Cx,
        edge: &Edge,
        record_id: &RecordId,
        added: &[RecordId],
        removed: &[RecordId],
    ) -> Outcome<(), Error> {
        let Some(counterpart_field) = edge.counterpart_field.as_deref() else {
            return Outcome::Ok(());
        };
        let counterpart_many = edge.cardinality.counterpart_is_many();
        let target_store = match self.store(&edge.target_list) {
            Ok(store) => store,
            Err(e) => return Outcome::Err(e),
        };

        for other_id in added {
            // Connect targets were verified before the first write, so the
            // counterpart must still exist within this mutation.
            let other = match target_store.find_by_id(cx, other_id).await {
                Outcome::Ok(Some(record)) => record,
                Outcome::Ok(None) => {
                    return Outcome::Err(Error::NotFound(NotFoundError::new(
                        &edge.target_list,
                        other_id.clone(),
                    )));
                }
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            };
            let current = other.references(counterpart_field);

            if counterpart_many {
                if current.contains(record_id) {
                    continue;
                }
                let mut ids = current.to_vec();
                ids.push(record_id.clone());
                match self
                    .write_field(cx, &edge.target_list, other_id, counterpart_field, Value::IdList(ids))
                    .await
                {
                    Outcome::Ok(()) => {}
                    Outcome::Err(e) => return Outcome::Err(e),
                    Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                    Outcome::Panicked(p) => return Outcome::Panicked(p),
                }
                tracing::trace!(
                    target = %edge.target_list,
                    record = %other_id,
                    field = counterpart_field,
                    back_ref = %record_id,
                    "appended back-reference"
                );
            } else {
                let previous = current.first().cloned();
                if previous.as_ref() == Some(record_id) {
                    continue;
                }
                match self
                    .write_field(
                        cx,
                        &edge.target_list,
                        other_id,
                        counterpart_field,
                        Value::Id(record_id.clone()),
                    )
                    .await
                {
                    Outcome::Ok(()) => {}
                    Outcome::Err(e) => return Outcome::Err(e),
                    Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                    Outcome::Panicked(p) => return Outcome::Panicked(p),
                }
                tracing::trace!(
                    target = %edge.target_list,
                    record = %other_id,
                    field = counterpart_field,
                    back_ref = %record_id,
                    "overwrote single back-reference"
                );

                // The overwrite stole the counterpart from its previous
                // holder; that holder's forward field still names the
                // counterpart and must shed it.
                if let Some(previous_holder) = previous {
                    match self
                        .remove_reference(
                            cx,
                            &edge.source_list,
                            &edge.source_field,
                            edge.source_many,
                            &previous_holder,
                            other_id,
                        )
                        .await
                    {
                        Outcome::Ok(()) => {}
                        Outcome::Err(e) => return Outcome::Err(e),
                        Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                        Outcome::Panicked(p) => return Outcome::Panicked(p),
                    }
                }
            }
        }

        for other_id in removed {
            // Disconnect of a vanished counterpart is a no-op, not an error.
            let other = match target_store.find_by_id(cx, other_id).await {
                Outcome::Ok(Some(record)) => record,
                Outcome::Ok(None) => continue,
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            };
            let current = other.references(counterpart_field);
            if !current.contains(record_id) {
                continue;
            }
            let remaining: Vec<RecordId> = current
                .iter()
                .filter(|c| *c != record_id)
                .cloned()
                .collect();
            match self
                .write_field(
                    cx,
                    &edge.target_list,
                    other_id,
                    counterpart_field,
                    Value::from_ids(remaining, counterpart_many),
                )
                .await
            {
                Outcome::Ok(()) => {}
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            }
            tracing::trace!(
                target = %edge.target_list,
                record = %other_id,
                field = counterpart_field,
                back_ref = %record_id,
                "removed back-reference"
            );
        }

        Outcome::Ok(())
    }

    /// Remove `target` from `holder`'s relationship field, if present.
    ///
    /// Used when a single-reference overwrite steals a counterpart from its
    /// previous holder. A missing holder or an already-absent reference is
    /// a no-op.
    async fn remove_reference(
        &self,
        cx: &Cx,
        list_name: &str,
        field_name: &str,
        many: bool,
        holder: &RecordId,
        target: &RecordId,
    ) -> Outcome<(), Error> {
        let store = match self.store(list_name) {
            Ok(store) => store,
            Err(e) => return Outcome::Err(e),
        };
        let holder_record = match store.find_by_id(cx, holder).await {
            Outcome::Ok(Some(record)) => record,
            Outcome::Ok(None) => return Outcome::Ok(()),
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };
        let current = holder_record.references(field_name);
        if !current.contains(target) {
            return Outcome::Ok(());
        }
        let remaining: Vec<RecordId> = current.iter().filter(|c| *c != target).cloned().collect();
        tracing::trace!(
            list = list_name,
            record = %holder,
            field = field_name,
            stolen = %target,
            "removed stolen reference from previous holder"
        );
        self.write_field(cx, list_name, holder, field_name, Value::from_ids(remaining, many))
            .await
    }

    /// Write a single field of a record.
    async fn write_field(
        &self,
        cx: &Cx,
        list_name: &str,
        id: &RecordId,
        field_name: &str,
        value: Value,
    ) -> Outcome<(), Error> {
        let store = match self.store(list_name) {
            Ok(store) => store,
            Err(e) => return Outcome::Err(e),
        };
        let mut values = FieldValues::new();
        values.insert(field_name.to_string(), value);
        match store.update(cx, id, values).await {
            Outcome::Ok(_) => Outcome::Ok(()),
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }
}
