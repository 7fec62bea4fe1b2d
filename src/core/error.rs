//! Error types for model mutations

use derive_more::Display;

use super::ids::{FieldId, MeasureId, RelationshipId, TableId};

/// Entity referenced by a mutation that does not resolve in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Reference {
    #[display("table {_0}")]
    Table(TableId),
    #[display("field {field} of table {table}")]
    Field { table: TableId, field: FieldId },
    #[display("relationship {_0}")]
    Relationship(RelationshipId),
    #[display("measure {_0}")]
    Measure(MeasureId),
}

/// Kind of entity a name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NameKind {
    #[display("Table")]
    Table,
    #[display("Field")]
    Field,
    #[display("Measure")]
    Measure,
}

/// Structural errors rejected by the mutation API.
///
/// A mutation that returns an error leaves the store exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid reference: {0} does not exist")]
    InvalidReference(Reference),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("{0} name cannot be empty")]
    EmptyName(NameKind),

    #[error("{kind} name is too long ({actual} chars, max {max})")]
    NameTooLong {
        kind: NameKind,
        max: usize,
        actual: usize,
    },

    #[error("{kind} name is invalid: {reason}")]
    InvalidName { kind: NameKind, reason: String },
}

impl ModelError {
    pub fn unknown_table(id: TableId) -> Self {
        Self::InvalidReference(Reference::Table(id))
    }

    pub fn unknown_field(table: TableId, field: FieldId) -> Self {
        Self::InvalidReference(Reference::Field { table, field })
    }

    pub fn unknown_relationship(id: RelationshipId) -> Self {
        Self::InvalidReference(Reference::Relationship(id))
    }

    pub fn unknown_measure(id: MeasureId) -> Self {
        Self::InvalidReference(Reference::Measure(id))
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
