//! Schema building and the immutable registry.
//!
//! Lists are declared once at startup through [`SchemaBuilder`]; `build`
//! validates every declaration and produces the process-wide immutable
//! [`SchemaRegistry`]. There is no runtime re-registration, so registry
//! reads during mutation handling need no synchronization.

use crate::list::ListDescriptor;
use listmodel_core::{Error, SchemaError, SchemaErrorKind};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Identifier grammar for list and field names.
fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("static identifier pattern compiles")
    })
}

/// Accumulates list declarations before validation.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    lists: Vec<ListDescriptor>,
}

impl SchemaBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a list.
    #[must_use]
    pub fn list(mut self, list: ListDescriptor) -> Self {
        self.lists.push(list);
        self
    }

    /// Validate every declaration and produce the immutable registry.
    ///
    /// Violations are [`SchemaError`]s: invalid identifiers, duplicate list
    /// or field names, relationship targets that are not registered, and
    /// counterpart declarations that do not point back at the declaring
    /// field (asymmetric declarations are a configuration error caught
    /// here, not at mutation time).
    #[allow(clippy::result_large_err)]
    pub fn build(self) -> Result<SchemaRegistry, Error> {
        let mut by_name: BTreeMap<String, usize> = BTreeMap::new();

        for (index, list) in self.lists.iter().enumerate() {
            if !name_regex().is_match(list.name()) {
                return Err(SchemaError::new(
                    SchemaErrorKind::InvalidName,
                    format!("invalid list name '{}'", list.name()),
                )
                .into());
            }
            if by_name.insert(list.name().to_string(), index).is_some() {
                return Err(SchemaError::new(
                    SchemaErrorKind::DuplicateList,
                    format!("list '{}' is registered twice", list.name()),
                )
                .into());
            }

            let mut seen_fields = BTreeMap::new();
            for field in list.fields() {
                if !name_regex().is_match(&field.name) {
                    return Err(SchemaError::new(
                        SchemaErrorKind::InvalidName,
                        format!("invalid field name '{}.{}'", list.name(), field.name),
                    )
                    .into());
                }
                if seen_fields.insert(field.name.clone(), ()).is_some() {
                    return Err(SchemaError::new(
                        SchemaErrorKind::DuplicateField,
                        format!("field '{}.{}' is declared twice", list.name(), field.name),
                    )
                    .into());
                }
            }
        }

        let registry = SchemaRegistry {
            lists: self.lists,
            by_name,
        };
        registry.check_relationships()?;
        tracing::debug!(lists = registry.lists.len(), "schema registry built");
        Ok(registry)
    }
}

/// The process-wide immutable schema: every declared list, by name.
#[derive(Debug)]
pub struct SchemaRegistry {
    lists: Vec<ListDescriptor>,
    by_name: BTreeMap<String, usize>,
}

impl SchemaRegistry {
    /// Look up a list descriptor, failing with a schema error if absent.
    #[allow(clippy::result_large_err)]
    pub fn list(&self, name: &str) -> Result<&ListDescriptor, Error> {
        self.get_list(name).ok_or_else(|| {
            SchemaError::new(
                SchemaErrorKind::UnknownList,
                format!("no list '{name}' registered"),
            )
            .into()
        })
    }

    /// Look up a list descriptor.
    pub fn get_list(&self, name: &str) -> Option<&ListDescriptor> {
        self.by_name.get(name).map(|&i| &self.lists[i])
    }

    /// Whether a list is registered.
    pub fn has_list(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Every registered list, in declaration order.
    pub fn lists(&self) -> impl Iterator<Item = &ListDescriptor> {
        self.lists.iter()
    }

    /// Validate every relationship declaration across the registry.
    #[allow(clippy::result_large_err)]
    fn check_relationships(&self) -> Result<(), Error> {
        for list in &self.lists {
            for (field, def) in list.relationship_fields() {
                let Some(target) = self.get_list(&def.target_list) else {
                    return Err(SchemaError::new(
                        SchemaErrorKind::UnknownTarget,
                        format!(
                            "{}.{} targets unregistered list '{}'",
                            list.name(),
                            field.name,
                            def.target_list
                        ),
                    )
                    .into());
                };

                let Some(counterpart_name) = &def.counterpart else {
                    continue;
                };

                let Some(counterpart) = target.field_named(counterpart_name) else {
                    return Err(SchemaError::new(
                        SchemaErrorKind::MissingCounterpart,
                        format!(
                            "{}.{} names counterpart '{}.{}' which does not exist",
                            list.name(),
                            field.name,
                            target.name(),
                            counterpart_name
                        ),
                    )
                    .into());
                };

                let Some(counterpart_def) = counterpart.as_relationship() else {
                    return Err(SchemaError::new(
                        SchemaErrorKind::NotARelationship,
                        format!(
                            "{}.{} names counterpart '{}.{}' which is not a relationship field",
                            list.name(),
                            field.name,
                            target.name(),
                            counterpart_name
                        ),
                    )
                    .into());
                };

                let points_back = counterpart_def.target_list == list.name()
                    && counterpart_def.counterpart.as_deref() == Some(field.name.as_str());
                if !points_back {
                    return Err(SchemaError::new(
                        SchemaErrorKind::AsymmetricCounterpart,
                        format!(
                            "{}.{} has counterpart '{}.{}' but that field points at '{}.{}'",
                            list.name(),
                            field.name,
                            target.name(),
                            counterpart_name,
                            counterpart_def.target_list,
                            counterpart_def.counterpart.as_deref().unwrap_or("<none>")
                        ),
                    )
                    .into());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listmodel_core::{FieldDescriptor, RelationshipDef, SchemaErrorKind};

    fn schema_error_kind(err: &Error) -> SchemaErrorKind {
        match err {
            Error::Schema(e) => e.kind,
            other => panic!("expected schema error, got {other}"),
        }
    }

    fn student_teacher() -> SchemaBuilder {
        SchemaBuilder::new()
            .list(
                ListDescriptor::new("Student")
                    .field(FieldDescriptor::text("name"))
                    .field(FieldDescriptor::relationship(
                        "teachers",
                        RelationshipDef::to("Teacher").counterpart("students").many(true),
                    )),
            )
            .list(
                ListDescriptor::new("Teacher")
                    .field(FieldDescriptor::text("name"))
                    .field(FieldDescriptor::relationship(
                        "students",
                        RelationshipDef::to("Student").counterpart("teachers").many(true),
                    )),
            )
    }

    #[test]
    fn valid_schema_builds() {
        let registry = student_teacher().build().unwrap();
        assert!(registry.has_list("Student"));
        assert!(registry.has_list("Teacher"));
        assert!(!registry.has_list("Ghost"));
        assert_eq!(registry.lists().count(), 2);
        assert!(registry.list("Ghost").is_err());
    }

    #[test]
    fn lists_iterate_in_declaration_order() {
        let registry = student_teacher().build().unwrap();
        let names: Vec<_> = registry.lists().map(ListDescriptor::name).collect();
        assert_eq!(names, vec!["Student", "Teacher"]);
    }

    #[test]
    fn duplicate_list_rejected() {
        let err = SchemaBuilder::new()
            .list(ListDescriptor::new("User"))
            .list(ListDescriptor::new("User"))
            .build()
            .unwrap_err();
        assert_eq!(schema_error_kind(&err), SchemaErrorKind::DuplicateList);
    }

    #[test]
    fn duplicate_field_rejected() {
        let err = SchemaBuilder::new()
            .list(
                ListDescriptor::new("User")
                    .field(FieldDescriptor::text("name"))
                    .field(FieldDescriptor::text("name")),
            )
            .build()
            .unwrap_err();
        assert_eq!(schema_error_kind(&err), SchemaErrorKind::DuplicateField);
    }

    #[test]
    fn invalid_names_rejected() {
        let err = SchemaBuilder::new()
            .list(ListDescriptor::new("2Fast"))
            .build()
            .unwrap_err();
        assert_eq!(schema_error_kind(&err), SchemaErrorKind::InvalidName);

        let err = SchemaBuilder::new()
            .list(ListDescriptor::new("User").field(FieldDescriptor::text("bad name")))
            .build()
            .unwrap_err();
        assert_eq!(schema_error_kind(&err), SchemaErrorKind::InvalidName);
    }

    #[test]
    fn unknown_target_rejected() {
        let err = SchemaBuilder::new()
            .list(ListDescriptor::new("Student").field(FieldDescriptor::relationship(
                "teachers",
                RelationshipDef::to("Teacher").many(true),
            )))
            .build()
            .unwrap_err();
        assert_eq!(schema_error_kind(&err), SchemaErrorKind::UnknownTarget);
    }

    #[test]
    fn missing_counterpart_rejected() {
        let err = SchemaBuilder::new()
            .list(ListDescriptor::new("Student").field(FieldDescriptor::relationship(
                "teachers",
                RelationshipDef::to("Teacher").counterpart("students").many(true),
            )))
            .list(ListDescriptor::new("Teacher").field(FieldDescriptor::text("name")))
            .build()
            .unwrap_err();
        assert_eq!(schema_error_kind(&err), SchemaErrorKind::MissingCounterpart);
    }

    #[test]
    fn scalar_counterpart_rejected() {
        let err = SchemaBuilder::new()
            .list(ListDescriptor::new("Student").field(FieldDescriptor::relationship(
                "teachers",
                RelationshipDef::to("Teacher").counterpart("name").many(true),
            )))
            .list(ListDescriptor::new("Teacher").field(FieldDescriptor::text("name")))
            .build()
            .unwrap_err();
        assert_eq!(schema_error_kind(&err), SchemaErrorKind::NotARelationship);
    }

    #[test]
    fn asymmetric_counterpart_rejected() {
        // Teacher.students points back at Student.advisors, not Student.teachers.
        let err = SchemaBuilder::new()
            .list(ListDescriptor::new("Student").field(FieldDescriptor::relationship(
                "teachers",
                RelationshipDef::to("Teacher").counterpart("students").many(true),
            )))
            .list(ListDescriptor::new("Teacher").field(FieldDescriptor::relationship(
                "students",
                RelationshipDef::to("Student").counterpart("advisors").many(true),
            )))
            .build()
            .unwrap_err();
        assert_eq!(
            schema_error_kind(&err),
            SchemaErrorKind::AsymmetricCounterpart
        );
    }

    #[test]
    fn one_way_relationship_builds() {
        let registry = SchemaBuilder::new()
            .list(ListDescriptor::new("Post").field(FieldDescriptor::relationship(
                "author",
                RelationshipDef::to("User"),
            )))
            .list(ListDescriptor::new("User").field(FieldDescriptor::text("name")))
            .build()
            .unwrap();
        assert!(registry.has_list("Post"));
    }

    #[test]
    fn self_referential_counterpart_builds() {
        // A field that is its own counterpart on the same list.
        let registry = SchemaBuilder::new()
            .list(ListDescriptor::new("User").field(FieldDescriptor::relationship(
                "friends",
                RelationshipDef::to("User").counterpart("friends").many(true),
            )))
            .build()
            .unwrap();
        assert!(registry.has_list("User"));
    }
}
