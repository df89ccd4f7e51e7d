//! Statement skeletons.
//!
//! A [`Statement`] is the fixed prefix of a query (`INSERT INTO t (...)
//! VALUES (...)`, `UPDATE t SET ...`, `DELETE FROM t`, `SELECT ... FROM t` or
//! caller-supplied raw SQL) plus the placeholders that prefix already uses and
//! a list of default clauses rendered before any caller overrides.
//!
//! Construction never fails eagerly: an invalid skeleton stores its error and
//! every [`build`](Statement::build) returns it without rendering a clause.
//!
//! # Example
//! ```ignore
//! use pgclause::{Filter, delete, with_returning};
//!
//! let q = delete("users")
//!     .filter([Filter::eq("email", "a@b.com")])
//!     .build(&[with_returning(["id"])])?;
//!
//! assert_eq!(q.sql, "DELETE FROM users WHERE email = $1 RETURNING id");
//! ```

mod delete;
mod insert;
mod raw;
mod select;
mod update;

pub use delete::delete;
pub use insert::insert;
pub use raw::raw;
pub use select::select;
pub use update::update;

use crate::build::{BuiltQuery, build};
use crate::clause::{Clause, with_from, with_returning};
use crate::error::{BuildError, BuildResult};
use crate::filter::{AllowedColumns, Filter};
use crate::ident::Ident;
use crate::predicate::{with_safe_where, with_where};
use std::sync::Arc;

/// The kind of SQL statement a skeleton produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Insert,
    Update,
    Delete,
    Select,
    Raw,
}

/// A statement skeleton with its default clauses.
///
/// Cloning is cheap (clauses are shared), and every method that adds a
/// default clause returns a new `Statement`, leaving `self` untouched.
#[derive(Debug, Clone)]
#[must_use]
pub struct Statement {
    kind: StatementKind,
    sql: String,
    param_count: usize,
    where_present: bool,
    defaults: Vec<Clause>,
    error: Option<BuildError>,
}

impl Statement {
    pub(crate) fn new(kind: StatementKind, sql: String, param_count: usize) -> Self {
        Self {
            kind,
            sql,
            param_count,
            where_present: false,
            defaults: Vec::new(),
            error: None,
        }
    }

    pub(crate) fn failed(kind: StatementKind, error: BuildError) -> Self {
        Self {
            error: Some(error),
            ..Self::new(kind, String::new(), 0)
        }
    }

    pub(crate) fn from_result(kind: StatementKind, result: BuildResult<(String, usize)>) -> Self {
        match result {
            Ok((sql, param_count)) => Self::new(kind, sql, param_count),
            Err(error) => Self::failed(kind, error),
        }
    }

    pub(crate) fn where_already_present(mut self, present: bool) -> Self {
        self.where_present = present;
        self
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Skeleton SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Placeholders consumed by the skeleton itself (e.g. one per INSERT column).
    pub fn param_count(&self) -> usize {
        self.param_count
    }

    /// Whether the skeleton text already carries a `WHERE` keyword.
    pub fn where_present(&self) -> bool {
        self.where_present
    }

    pub fn default_clauses(&self) -> &[Clause] {
        &self.defaults
    }

    /// Construction error, if the skeleton was invalid.
    pub fn error(&self) -> Option<&BuildError> {
        self.error.as_ref()
    }

    /// New statement with `clause` appended to the defaults.
    pub fn with(&self, clause: Clause) -> Self {
        let mut next = self.clone();
        next.defaults.push(clause);
        next
    }

    /// New statement with every clause of `clauses` appended to the defaults.
    pub fn with_all(&self, clauses: impl IntoIterator<Item = Clause>) -> Self {
        let mut next = self.clone();
        next.defaults.extend(clauses);
        next
    }

    /// Default `RETURNING` clause.
    pub fn returning<I, S>(&self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(with_returning(columns))
    }

    /// Default `FROM` clause.
    pub fn from(&self, expression: impl Into<String>) -> Self {
        self.with(with_from(expression))
    }

    /// Default `WHERE` clause from unvalidated field names.
    pub fn filter(&self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.with(with_where(filters))
    }

    /// Default `WHERE` clause resolved through an allow-list.
    pub fn safe_filter(
        &self,
        allowed: impl Into<Arc<AllowedColumns>>,
        filters: impl IntoIterator<Item = Filter>,
    ) -> Self {
        self.with(with_safe_where(allowed, filters))
    }

    /// Render the statement with its defaults followed by `overrides`.
    pub fn build(&self, overrides: &[Clause]) -> BuildResult<BuiltQuery> {
        build(self, overrides)
    }
}

pub(crate) fn require_table(table: &str) -> BuildResult<&str> {
    let table = table.trim();
    if table.is_empty() {
        return Err(BuildError::MissingTable);
    }
    Ok(table)
}

/// Column list that must be non-empty.
pub(crate) fn require_columns<I, S>(columns: I) -> BuildResult<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let columns: Vec<String> = columns
        .into_iter()
        .map(|c| c.as_ref().trim().to_string())
        .collect();
    if columns.is_empty() {
        return Err(BuildError::MissingColumns);
    }
    Ok(columns)
}

/// Column list whose entries are assignment targets and must be identifiers.
pub(crate) fn require_target_columns<I, S>(columns: I) -> BuildResult<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    require_columns(columns)?
        .iter()
        .map(|c| Ident::parse(c).map(|ident| ident.to_sql()))
        .collect()
}
