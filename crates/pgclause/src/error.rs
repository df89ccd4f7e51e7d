//! Error types for pgclause

use crate::clause::ClauseKind;
use thiserror::Error;

/// Result type alias for statement construction and rendering.
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors raised while constructing a statement or rendering its clauses.
///
/// Construction errors are stored on the [`Statement`](crate::Statement) and
/// returned unchanged by every later build, so the type is `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The statement skeleton was given an empty table name
    #[error("missing table name in query")]
    MissingTable,

    /// INSERT/UPDATE/SELECT skeleton was given no columns
    #[error("missing columns in query")]
    MissingColumns,

    /// A table or column name is not a valid SQL identifier
    #[error("invalid identifier '{ident}': {reason}")]
    InvalidIdentifier { ident: String, reason: String },

    /// Field name not present in the allow-list
    #[error("invalid field name: field '{field}' not found")]
    InvalidField { field: String },

    /// Operator text that does not map to a known operator
    #[error("unknown operator '{operator}'")]
    UnknownOperator { operator: String },

    /// ORDER BY clause without sort items
    #[error("sort items cannot be empty in ORDER BY clause")]
    EmptySort,

    /// FROM clause with an empty expression
    #[error("expression in FROM clause cannot be empty")]
    EmptyFrom,

    /// GROUP BY clause without columns
    #[error("columns cannot be empty in GROUP BY clause")]
    EmptyGroupBy,

    /// Pagination with a page number below 1
    #[error("page must be >= 1, got {0}")]
    InvalidPage(i64),

    /// Two clauses of the same kind rendered in one build
    #[error("cannot have duplicated sql clauses: {0}")]
    DuplicateClause(ClauseKind),
}

impl BuildError {
    /// Create an invalid field error
    pub fn invalid_field(field: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
        }
    }

    /// Create an unknown operator error
    pub fn unknown_operator(operator: impl Into<String>) -> Self {
        Self::UnknownOperator {
            operator: operator.into(),
        }
    }

    /// Create an invalid identifier error
    pub fn invalid_identifier(ident: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            ident: ident.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error was raised while constructing the skeleton
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Self::MissingTable | Self::MissingColumns | Self::InvalidIdentifier { .. }
        )
    }

    /// Check if this is an allow-list rejection
    pub fn is_invalid_field(&self) -> bool {
        matches!(self, Self::InvalidField { .. })
    }

    /// Check if this is a duplicate clause error
    pub fn is_duplicate_clause(&self) -> bool {
        matches!(self, Self::DuplicateClause(_))
    }
}
