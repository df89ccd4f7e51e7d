//! ORDER BY clause.

use crate::clause::{Clause, ClauseKind, Fragment};
use crate::error::{BuildError, BuildResult};
use crate::filter::AllowedColumns;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// Error returned when parsing a [`SortDir`] from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSortDirError(pub String);

impl fmt::Display for ParseSortDirError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid sort direction '{}', expected ASC or DESC", self.0)
    }
}

impl std::error::Error for ParseSortDirError {}

impl FromStr for SortDir {
    type Err = ParseSortDirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "asc" => Ok(SortDir::Asc),
            "desc" => Ok(SortDir::Desc),
            _ => Err(ParseSortDirError(s.to_string())),
        }
    }
}

/// A single ORDER BY item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortItem {
    pub field: String,
    pub dir: SortDir,
}

impl SortItem {
    pub fn new(field: impl Into<String>, dir: SortDir) -> Self {
        Self {
            field: field.into(),
            dir,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDir::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDir::Desc)
    }
}

/// `ORDER BY a ASC, b DESC` from unvalidated field names.
///
/// Field names are written into the SQL as given; see [`with_safe_sort`] for
/// fields that come from user input. No items fails the build.
pub fn with_sort<I>(items: I) -> Clause
where
    I: IntoIterator<Item = SortItem>,
{
    let items: Vec<SortItem> = items.into_iter().collect();
    Clause::new(ClauseKind::Order, move |_| render_sort(&items, None).map(Some))
}

/// `ORDER BY ...` with every field resolved through `allowed`.
///
/// A field missing from the allow-list fails the build with
/// [`BuildError::InvalidField`].
pub fn with_safe_sort<A, I>(allowed: A, items: I) -> Clause
where
    A: Into<Arc<AllowedColumns>>,
    I: IntoIterator<Item = SortItem>,
{
    let allowed = allowed.into();
    let items: Vec<SortItem> = items.into_iter().collect();
    Clause::new(ClauseKind::Order, move |_| {
        render_sort(&items, Some(&*allowed)).map(Some)
    })
}

fn render_sort(items: &[SortItem], allowed: Option<&AllowedColumns>) -> BuildResult<Fragment> {
    if items.is_empty() {
        return Err(BuildError::EmptySort);
    }

    let mut sql = String::from("ORDER BY ");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        let column = match allowed {
            Some(allowed) => allowed
                .resolve(&item.field)
                .ok_or_else(|| BuildError::invalid_field(&item.field))?,
            None => item.field.as_str(),
        };
        sql.push_str(column);
        sql.push(' ');
        sql.push_str(item.dir.as_sql());
    }
    Ok(Fragment::text(sql))
}
