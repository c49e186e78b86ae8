//! Mutation input: the operation tree handed to the engine.
//!
//! The request layer (out of scope here) parses its surface syntax into
//! these types; the engine consumes them read-only. Per relationship field
//! the vocabulary is `{connect, disconnect, disconnect_all, create}`, where
//! `create` entries nest full [`MutationData`] trees of their own.

use listmodel_core::{RecordId, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Operations on one relationship field within a mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipInput {
    /// Existing records to connect, in request order.
    pub connect: Vec<RecordId>,
    /// Currently-connected records to disconnect. Ids not currently
    /// connected are idempotent no-ops, not errors.
    pub disconnect: Vec<RecordId>,
    /// Clear the field entirely. Mutually exclusive with `disconnect`.
    pub disconnect_all: bool,
    /// Records to create and connect, in request order.
    pub create: Vec<MutationData>,
}

impl RelationshipInput {
    /// Create an empty input (no operations).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an id to connect.
    #[must_use]
    pub fn connect(mut self, id: impl Into<RecordId>) -> Self {
        self.connect.push(id.into());
        self
    }

    /// Add an id to disconnect.
    #[must_use]
    pub fn disconnect(mut self, id: impl Into<RecordId>) -> Self {
        self.disconnect.push(id.into());
        self
    }

    /// Set the disconnect-all flag.
    #[must_use]
    pub fn disconnect_all(mut self, value: bool) -> Self {
        self.disconnect_all = value;
        self
    }

    /// Add a nested create.
    #[must_use]
    pub fn create(mut self, data: MutationData) -> Self {
        self.create.push(data);
        self
    }

    /// Whether no operation was requested.
    pub fn is_empty(&self) -> bool {
        self.connect.is_empty()
            && self.disconnect.is_empty()
            && !self.disconnect_all
            && self.create.is_empty()
    }
}

/// Input for one field of a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldInput {
    /// A scalar value to store.
    Scalar(Value),
    /// Relationship operations to resolve.
    Relationship(RelationshipInput),
}

/// The field inputs of one create or update mutation.
///
/// Field order is not semantically significant between fields; iteration
/// order is kept deterministic (name order) so propagation order is
/// reproducible across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationData {
    fields: BTreeMap<String, FieldInput>,
}

impl MutationData {
    /// Create an empty mutation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a scalar field value.
    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields
            .insert(field.into(), FieldInput::Scalar(value.into()));
        self
    }

    /// Set relationship operations for a field.
    #[must_use]
    pub fn relationship(mut self, field: impl Into<String>, input: RelationshipInput) -> Self {
        self.fields
            .insert(field.into(), FieldInput::Relationship(input));
        self
    }

    /// Get the input for a field.
    pub fn get(&self, field: &str) -> Option<&FieldInput> {
        self.fields.get(field)
    }

    /// Iterate the field inputs in deterministic (name) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldInput)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether no field was provided.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_input_builder() {
        let input = RelationshipInput::new()
            .connect("t1")
            .connect("t2")
            .disconnect("t3")
            .create(MutationData::new().set("name", "A"));

        assert_eq!(input.connect, vec![RecordId::new("t1"), RecordId::new("t2")]);
        assert_eq!(input.disconnect, vec![RecordId::new("t3")]);
        assert!(!input.disconnect_all);
        assert_eq!(input.create.len(), 1);
        assert!(!input.is_empty());
    }

    #[test]
    fn empty_input_reports_empty() {
        assert!(RelationshipInput::new().is_empty());
        assert!(!RelationshipInput::new().disconnect_all(true).is_empty());
        assert!(MutationData::new().is_empty());
    }

    #[test]
    fn mutation_data_accessors() {
        let data = MutationData::new()
            .set("name", "Ada")
            .relationship("teachers", RelationshipInput::new().connect("t1"));

        assert_eq!(
            data.get("name"),
            Some(&FieldInput::Scalar(Value::from("Ada")))
        );
        assert!(matches!(
            data.get("teachers"),
            Some(FieldInput::Relationship(_))
        ));
        assert!(data.get("missing").is_none());

        let names: Vec<_> = data.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["name", "teachers"]);
    }

    #[test]
    fn serde_roundtrip() {
        let data = MutationData::new()
            .set("age", 7_i64)
            .relationship(
                "teachers",
                RelationshipInput::new().connect("t1").disconnect_all(false),
            );
        let json = serde_json::to_string(&data).unwrap();
        let back: MutationData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }
}
