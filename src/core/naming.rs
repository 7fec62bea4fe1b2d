//! Name checks for tables, fields and measures
//!
//! Model names are display names ("Total Sales", "Order Date"), so spaces and punctuation are
//! accepted. Only names that cannot be shown or referenced at all are rejected.

use super::error::{ModelError, ModelResult, NameKind};

/// Maximum length for entity names
pub const MAX_NAME_LENGTH: usize = 128;

/// Problems detected in a name
#[derive(Debug, Clone, PartialEq)]
pub enum NameProblem {
    /// Name is empty or whitespace only
    Empty,
    /// Name is too long
    TooLong { max: usize, actual: usize },
    /// Name contains control characters (newlines, tabs, ...)
    ControlCharacters,
    /// Name has leading or trailing whitespace
    SurroundingWhitespace,
    /// Name contains `[` or `]`, which clashes with `Table[Column]` references in formulas
    Brackets,
}

impl std::fmt::Display for NameProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameProblem::Empty => write!(f, "Name cannot be empty"),
            NameProblem::TooLong { max, actual } => {
                write!(f, "Name is too long ({} chars, max {})", actual, max)
            }
            NameProblem::ControlCharacters => write!(f, "Name contains control characters"),
            NameProblem::SurroundingWhitespace => {
                write!(f, "Name has leading or trailing whitespace")
            }
            NameProblem::Brackets => {
                write!(f, "Name contains square brackets, which break formula references")
            }
        }
    }
}

/// Result of checking a name: errors reject the name, warnings are advisory
#[derive(Debug, Clone, Default)]
pub struct NameCheck {
    pub errors: Vec<NameProblem>,
    pub warnings: Vec<NameProblem>,
}

impl NameCheck {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Convert the first error into a [`ModelError`] for the given entity kind
    pub fn into_result(self, kind: NameKind) -> ModelResult<()> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            Some(NameProblem::Empty) => Err(ModelError::EmptyName(kind)),
            Some(NameProblem::TooLong { max, actual }) => {
                Err(ModelError::NameTooLong { kind, max, actual })
            }
            Some(problem) => Err(ModelError::InvalidName {
                kind,
                reason: problem.to_string(),
            }),
        }
    }
}

pub fn check_name(name: &str) -> NameCheck {
    let mut check = NameCheck::default();

    let trimmed = name.trim();
    if trimmed.is_empty() {
        check.errors.push(NameProblem::Empty);
        return check;
    }

    let length = trimmed.chars().count();
    if length > MAX_NAME_LENGTH {
        check.errors.push(NameProblem::TooLong {
            max: MAX_NAME_LENGTH,
            actual: length,
        });
    }

    if trimmed.chars().any(char::is_control) {
        check.errors.push(NameProblem::ControlCharacters);
    }

    if trimmed.len() != name.len() {
        check.warnings.push(NameProblem::SurroundingWhitespace);
    }

    if trimmed.contains(['[', ']']) {
        check.warnings.push(NameProblem::Brackets);
    }

    check
}

/// Reject names that cannot be stored
pub fn validate_name(name: &str, kind: NameKind) -> ModelResult<()> {
    check_name(name).into_result(kind)
}
