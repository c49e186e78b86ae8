//! Relationship edge resolution.
//!
//! An [`Edge`] is the mutation-time view of a relationship field: the two
//! endpoint lists, the optional counterpart field, and the derived
//! cardinality. Edges are recomputed from the registry on every resolution
//! and never cached — the schema is immutable, recomputation is cheap, and
//! a cache would be a second source of truth.

use crate::registry::SchemaRegistry;
use listmodel_core::{Cardinality, Error, SchemaError, SchemaErrorKind};

/// A resolved relationship edge.
///
/// Lives for the duration of a single mutation resolution; not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// The list declaring the resolved field.
    pub source_list: String,
    /// The declaring field.
    pub source_field: String,
    /// The list the field targets.
    pub target_list: String,
    /// The mirror field on the target list; `None` for one-way edges.
    pub counterpart_field: Option<String>,
    /// Whether the declaring field holds many references.
    pub source_many: bool,
    /// The edge's cardinality, derived from both `many` flags.
    pub cardinality: Cardinality,
}

impl Edge {
    /// Whether mutations on this edge write a mirror value.
    pub fn is_two_way(&self) -> bool {
        self.counterpart_field.is_some()
    }
}

impl SchemaRegistry {
    /// Resolve the edge for a relationship field.
    ///
    /// Fails with a `SchemaError` if the field does not exist or is not a
    /// relationship. Counterpart symmetry was verified at build time but is
    /// re-validated defensively here.
    #[allow(clippy::result_large_err)]
    pub fn resolve_edge(&self, list_name: &str, field_name: &str) -> Result<Edge, Error> {
        let list = self.list(list_name)?;
        let Some(field) = list.field_named(field_name) else {
            return Err(SchemaError::new(
                SchemaErrorKind::UnknownField,
                format!("no field '{field_name}' on list '{list_name}'"),
            )
            .into());
        };
        let Some(def) = field.as_relationship() else {
            return Err(SchemaError::new(
                SchemaErrorKind::NotARelationship,
                format!("field '{list_name}.{field_name}' is not a relationship"),
            )
            .into());
        };

        let target = self.get_list(&def.target_list).ok_or_else(|| {
            SchemaError::new(
                SchemaErrorKind::UnknownTarget,
                format!(
                    "{list_name}.{field_name} targets unregistered list '{}'",
                    def.target_list
                ),
            )
        })?;

        let counterpart_many = match &def.counterpart {
            None => None,
            Some(counterpart_name) => {
                let counterpart_def = target
                    .field_named(counterpart_name)
                    .and_then(|f| f.as_relationship())
                    .ok_or_else(|| {
                        SchemaError::new(
                            SchemaErrorKind::MissingCounterpart,
                            format!(
                                "{list_name}.{field_name} names counterpart '{}.{counterpart_name}' \
                                 which is missing or not a relationship",
                                target.name()
                            ),
                        )
                    })?;
                let points_back = counterpart_def.target_list == list_name
                    && counterpart_def.counterpart.as_deref() == Some(field_name);
                if !points_back {
                    return Err(SchemaError::new(
                        SchemaErrorKind::AsymmetricCounterpart,
                        format!(
                            "{list_name}.{field_name} and '{}.{counterpart_name}' are not mirrors",
                            target.name()
                        ),
                    )
                    .into());
                }
                Some(counterpart_def.many)
            }
        };

        Ok(Edge {
            source_list: list_name.to_string(),
            source_field: field_name.to_string(),
            target_list: def.target_list.clone(),
            counterpart_field: def.counterpart.clone(),
            source_many: def.many,
            cardinality: Cardinality::from_flags(def.many, counterpart_many),
        })
    }

    /// Every relationship field on any list whose edge targets `list_name`.
    ///
    /// This is the edge set the cascade-on-delete scan walks: one-way edges
    /// from other lists still hold dangling references, so the enumeration
    /// must cover the full schema, not just the deleted record's own fields.
    pub fn edges_targeting(&self, list_name: &str) -> Vec<Edge> {
        let mut edges = Vec::new();
        for list in self.lists() {
            for (field, def) in list.relationship_fields() {
                if def.target_list == list_name {
                    if let Ok(edge) = self.resolve_edge(list.name(), &field.name) {
                        edges.push(edge);
                    }
                }
            }
        }
        edges
    }
}
