//! List descriptors.

use listmodel_core::{FieldDescriptor, RelationshipDef};
use serde::{Deserialize, Serialize};

/// The compiled representation of one record type.
///
/// A descriptor is assembled with the builder-style [`field`](Self::field)
/// calls and becomes immutable once its schema registry is built. Field
/// order is declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDescriptor {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl ListDescriptor {
    /// Start declaring a list.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field declaration.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// The list name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared fields, in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field_named(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The relationship fields of this list, in declaration order.
    pub fn relationship_fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &RelationshipDef)> {
        self.fields
            .iter()
            .filter_map(|f| f.as_relationship().map(|def| (f, def)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listmodel_core::RelationshipDef;

    fn student() -> ListDescriptor {
        ListDescriptor::new("Student")
            .field(FieldDescriptor::text("name"))
            .field(FieldDescriptor::relationship(
                "teachers",
                RelationshipDef::to("Teacher").counterpart("students").many(true),
            ))
    }

    #[test]
    fn fields_keep_declaration_order() {
        let list = student();
        assert_eq!(list.name(), "Student");
        let names: Vec<_> = list.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "teachers"]);
    }

    #[test]
    fn field_lookup() {
        let list = student();
        assert!(list.field_named("name").is_some());
        assert!(list.field_named("teachers").is_some());
        assert!(list.field_named("missing").is_none());
    }

    #[test]
    fn relationship_fields_filters_scalars() {
        let list = student();
        let rels: Vec<_> = list.relationship_fields().collect();
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].0.name, "teachers");
        assert_eq!(rels[0].1.target_list, "Teacher");
    }
}
