//! Error types for ListModel operations.

use crate::record::RecordId;
use std::fmt;

/// The primary error type for all ListModel operations.
#[derive(Debug)]
pub enum Error {
    /// Malformed or inconsistent schema declarations.
    ///
    /// Fatal at schema-build time; a mutation-time occurrence means the
    /// registry was bypassed or corrupted and is never recoverable.
    Schema(SchemaError),
    /// Invalid mutation shape; the mutation is aborted before any write.
    Validation(ValidationError),
    /// A record id that was required to exist does not.
    NotFound(NotFoundError),
    /// Storage adapter failure, propagated as-is (no retry).
    Storage(StorageError),
    /// Operation was cancelled via asupersync.
    Cancelled,
    /// Custom error with message.
    Custom(String),
}

/// Schema declaration error.
#[derive(Debug, Clone)]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// List not registered.
    UnknownList,
    /// Field not declared on the list.
    UnknownField,
    /// Field exists but is not a relationship.
    NotARelationship,
    /// Relationship targets a list that is not registered.
    UnknownTarget,
    /// Declared counterpart field does not exist on the target list.
    MissingCounterpart,
    /// Counterpart exists but does not point back at the declaring field.
    AsymmetricCounterpart,
    /// Two lists registered under the same name.
    DuplicateList,
    /// Two fields declared under the same name on one list.
    DuplicateField,
    /// List or field name does not match the identifier grammar.
    InvalidName,
    /// No storage adapter registered for the list.
    MissingAdapter,
}

impl SchemaError {
    /// Create a new schema error.
    pub fn new(kind: SchemaErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// A record lookup that was required to succeed came back empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundError {
    /// The list that was searched.
    pub list: String,
    /// The id that was not found.
    pub id: RecordId,
}

impl NotFoundError {
    /// Create a new not-found error.
    pub fn new(list: impl Into<String>, id: RecordId) -> Self {
        Self {
            list: list.into(),
            id,
        }
    }
}

/// Storage adapter error.
#[derive(Debug)]
pub struct StorageError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a storage error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }
}

/// Validation error for mutation input.
///
/// Collects every violation found while walking an operation tree so the
/// caller sees the full picture in one round trip.
#[derive(Debug, Clone, Default)]
pub struct ValidationError {
    /// The errors, each tagged with the offending field.
    pub errors: Vec<FieldValidationError>,
}

/// A single validation error for a field.
#[derive(Debug, Clone)]
pub struct FieldValidationError {
    /// The field name that failed validation.
    pub field: String,
    /// The kind of validation that failed.
    pub kind: ValidationErrorKind,
    /// Human-readable error message.
    pub message: String,
}

/// The type of input constraint that was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// `disconnect` / `disconnect_all` inside a create mutation.
    DisconnectOnCreate,
    /// `disconnect_all` combined with `disconnect` on the same field.
    ConflictingOperations,
    /// Field is not declared on the list.
    UnknownField,
    /// Relationship operations supplied for a scalar field, or vice versa.
    InputKindMismatch,
    /// More than one reference resolved for a single-reference field.
    TooManyReferences,
    /// Nested creates exceed the maximum depth.
    NestingTooDeep,
    /// Scalar value does not match the field's declared type.
    WrongValueType,
}

impl ValidationError {
    /// Create a new empty validation error container.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Check if there are any validation errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add a field validation error.
    pub fn add(
        &mut self,
        field: impl Into<String>,
        kind: ValidationErrorKind,
        message: impl Into<String>,
    ) {
        self.errors.push(FieldValidationError {
            field: field.into(),
            kind,
            message: message.into(),
        });
    }

    /// Add a disconnect-on-create error.
    pub fn add_disconnect_on_create(&mut self, field: impl Into<String>) {
        self.add(
            field,
            ValidationErrorKind::DisconnectOnCreate,
            "disconnect is not valid in a create mutation",
        );
    }

    /// Add a conflicting-operations error.
    pub fn add_conflicting_operations(&mut self, field: impl Into<String>) {
        self.add(
            field,
            ValidationErrorKind::ConflictingOperations,
            "disconnect_all cannot be combined with disconnect",
        );
    }

    /// Add an unknown-field error.
    pub fn add_unknown_field(&mut self, field: impl Into<String>, list: &str) {
        let field = field.into();
        let message = format!("field '{field}' is not declared on list '{list}'");
        self.add(field, ValidationErrorKind::UnknownField, message);
    }

    /// Add an input-kind mismatch error.
    pub fn add_input_kind_mismatch(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.add(field, ValidationErrorKind::InputKindMismatch, message);
    }

    /// Add a too-many-references error for a single-reference field.
    pub fn add_too_many_references(&mut self, field: impl Into<String>, count: usize) {
        self.add(
            field,
            ValidationErrorKind::TooManyReferences,
            format!("single-reference field resolves {count} references, at most 1 allowed"),
        );
    }

    /// Add a nesting-too-deep error.
    pub fn add_nesting_too_deep(&mut self, field: impl Into<String>, max_depth: usize) {
        self.add(
            field,
            ValidationErrorKind::NestingTooDeep,
            format!("nested creates exceed the maximum depth of {max_depth}"),
        );
    }

    /// Add a wrong-value-type error.
    pub fn add_wrong_value_type(
        &mut self,
        field: impl Into<String>,
        expected: &str,
        actual: &str,
    ) {
        self.add(
            field,
            ValidationErrorKind::WrongValueType,
            format!("expected {expected}, got {actual}"),
        );
    }

    /// Convert to Result, returning Ok(()) if no errors, Err(self) otherwise.
    pub fn into_result(self) -> std::result::Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Error {
    /// Is this a not-found error?
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Is this a validation error?
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Is this a schema error?
    pub fn is_schema(&self) -> bool {
        matches!(self, Error::Schema(_))
    }

    /// Convenience constructor for storage errors.
    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage(StorageError::new(message))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Schema(e) => write!(f, "Schema error: {}", e.message),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::NotFound(e) => write!(f, "Not found: {}", e),
            Error::Storage(e) => write!(f, "Storage error: {}", e.message),
            Error::Cancelled => write!(f, "Operation cancelled"),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Storage(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SchemaError {}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no record with id '{}' in list '{}'", self.id, self.list)
    }
}

impl std::error::Error for NotFoundError {}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            write!(f, "validation passed")
        } else if self.errors.len() == 1 {
            let err = &self.errors[0];
            write!(f, "validation error on '{}': {}", err.field, err.message)
        } else {
            writeln!(f, "validation errors:")?;
            for err in &self.errors {
                writeln!(f, "  - {}: {}", err.field, err.message)?;
            }
            Ok(())
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Error::Schema(err)
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err)
    }
}

impl From<NotFoundError> for Error {
    fn from(err: NotFoundError) -> Self {
        Error::NotFound(err)
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Error::Storage(err)
    }
}

/// Result type alias for ListModel operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_collects_and_converts() {
        let mut errors = ValidationError::new();
        assert!(errors.is_empty());
        assert!(errors.clone().into_result().is_ok());

        errors.add_disconnect_on_create("teachers");
        errors.add_too_many_references("team", 3);

        assert_eq!(errors.errors.len(), 2);
        assert_eq!(
            errors.errors[0].kind,
            ValidationErrorKind::DisconnectOnCreate
        );
        assert_eq!(errors.errors[1].kind, ValidationErrorKind::TooManyReferences);
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn validation_error_display_single_and_multiple() {
        let mut single = ValidationError::new();
        single.add_unknown_field("nme", "Student");
        let rendered = single.to_string();
        assert!(rendered.contains("validation error on 'nme'"));
        assert!(rendered.contains("Student"));

        let mut multiple = ValidationError::new();
        multiple.add_conflicting_operations("teachers");
        multiple.add_wrong_value_type("name", "TEXT", "INTEGER");
        let rendered = multiple.to_string();
        assert!(rendered.contains("validation errors:"));
        assert!(rendered.contains("teachers"));
        assert!(rendered.contains("name"));
    }

    #[test]
    fn not_found_display_names_list_and_id() {
        let err = Error::from(NotFoundError::new("Teacher", RecordId::new("t1")));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: no record with id 't1' in list 'Teacher'");
    }

    #[test]
    fn error_kind_predicates() {
        let schema = Error::from(SchemaError::new(
            SchemaErrorKind::UnknownList,
            "no list 'Ghost' registered",
        ));
        assert!(schema.is_schema());
        assert!(!schema.is_validation());

        let storage = Error::storage("disk full");
        assert!(!storage.is_not_found());
        assert_eq!(storage.to_string(), "Storage error: disk full");
    }
}
