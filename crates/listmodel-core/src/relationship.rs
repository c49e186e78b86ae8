//! Relationship declarations and cardinality.
//!
//! A relationship field declares the list it targets, an optional
//! counterpart field on that list (making the relationship two-way), and
//! whether it holds many references or a single one. The two `many` flags
//! of a two-way pair determine the edge's [`Cardinality`].

use serde::{Deserialize, Serialize};

/// Declaration of a relationship field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDef {
    /// Name of the target list.
    pub target_list: String,

    /// The field on the target list that mirrors this one.
    ///
    /// Absence makes the relationship one-way: mutations on this field
    /// never attempt to write a mirror value.
    pub counterpart: Option<String>,

    /// Whether this field holds an ordered collection of references
    /// rather than a single one.
    pub many: bool,
}

impl RelationshipDef {
    /// Declare a single-reference, one-way relationship to a list.
    pub fn to(target_list: impl Into<String>) -> Self {
        Self {
            target_list: target_list.into(),
            counterpart: None,
            many: false,
        }
    }

    /// Set the counterpart field on the target list.
    #[must_use]
    pub fn counterpart(mut self, field: impl Into<String>) -> Self {
        self.counterpart = Some(field.into());
        self
    }

    /// Set whether this side holds many references.
    #[must_use]
    pub fn many(mut self, value: bool) -> Self {
        self.many = value;
        self
    }

    /// Whether a counterpart field is declared.
    pub fn is_two_way(&self) -> bool {
        self.counterpart.is_some()
    }
}

/// Cardinality of a relationship edge, seen from the declaring side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Single reference on both sides.
    OneToOne,
    /// Many references here, single reference (or no field) on the other side.
    OneToMany,
    /// Single reference here, many references (or no field) on the other side.
    ManyToOne,
    /// Many references on both sides.
    ManyToMany,
}

impl Cardinality {
    /// Derive the cardinality from the two `many` flags.
    ///
    /// `counterpart_many` is `None` for one-way edges; the one-way cases
    /// classify by the declaring side alone since no mirror field exists.
    pub fn from_flags(source_many: bool, counterpart_many: Option<bool>) -> Self {
        match (source_many, counterpart_many) {
            (true, Some(true)) => Cardinality::ManyToMany,
            (true, Some(false) | None) => Cardinality::OneToMany,
            (false, Some(true) | None) => Cardinality::ManyToOne,
            (false, Some(false)) => Cardinality::OneToOne,
        }
    }

    /// Whether the declaring side holds many references.
    pub fn source_is_many(&self) -> bool {
        matches!(self, Cardinality::OneToMany | Cardinality::ManyToMany)
    }

    /// Whether the counterpart side holds many references.
    pub fn counterpart_is_many(&self) -> bool {
        matches!(self, Cardinality::ManyToOne | Cardinality::ManyToMany)
    }
}
