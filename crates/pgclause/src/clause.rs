//! Clauses: deferred, composable SQL fragments.
//!
//! A [`Clause`] is a pure function from a [`RenderContext`] to an optional
//! [`Fragment`]. Returning `Ok(None)` means "omit this clause"; the pipeline
//! then skips it without consuming placeholders.

use crate::context::RenderContext;
use crate::error::{BuildError, BuildResult};
use crate::param::Param;
use std::fmt;
use std::sync::Arc;

/// Kind tag of a clause, used for duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    Where,
    Returning,
    Order,
    Limit,
    Offset,
    From,
    GroupBy,
    Pagination,
}

impl ClauseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ClauseKind::Where => "WHERE",
            ClauseKind::Returning => "RETURNING",
            ClauseKind::Order => "ORDER BY",
            ClauseKind::Limit => "LIMIT",
            ClauseKind::Offset => "OFFSET",
            ClauseKind::From => "FROM",
            ClauseKind::GroupBy => "GROUP BY",
            ClauseKind::Pagination => "PAGINATION",
        }
    }

    /// Whether a clause of this kind cannot render alongside one of `other`.
    ///
    /// WHERE never conflicts: a later WHERE continues the earlier condition.
    /// Pagination renders LIMIT and OFFSET itself.
    pub fn conflicts_with(self, other: ClauseKind) -> bool {
        use ClauseKind::*;
        match (self, other) {
            (Where, _) | (_, Where) => false,
            (Pagination, Limit | Offset) | (Limit | Offset, Pagination) => true,
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendered output of one clause.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    pub sql: String,
    /// Arguments bound to the placeholders in `sql`, in order.
    pub params: Vec<Param>,
}

impl Fragment {
    pub fn new(sql: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// A fragment without placeholders.
    pub fn text(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }
}

type RenderFn = dyn Fn(&RenderContext) -> BuildResult<Option<Fragment>> + Send + Sync;

/// A unit of statement composition.
#[derive(Clone)]
pub struct Clause {
    kind: ClauseKind,
    render: Arc<RenderFn>,
}

impl Clause {
    /// Create a clause from a render function.
    ///
    /// The function must number its placeholders from
    /// `ctx.placeholders()` and return exactly one param per placeholder.
    pub fn new<F>(kind: ClauseKind, render: F) -> Self
    where
        F: Fn(&RenderContext) -> BuildResult<Option<Fragment>> + Send + Sync + 'static,
    {
        Self {
            kind,
            render: Arc::new(render),
        }
    }

    pub fn kind(&self) -> ClauseKind {
        self.kind
    }

    /// Render against `ctx`.
    pub fn render(&self, ctx: &RenderContext) -> BuildResult<Option<Fragment>> {
        (self.render)(ctx)
    }
}

impl fmt::Debug for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clause").field("kind", &self.kind).finish_non_exhaustive()
    }
}

fn join_columns<I, S>(columns: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    columns.into_iter().map(Into::into).collect()
}

/// `RETURNING a, b`. No columns means `RETURNING *`.
pub fn with_returning<I, S>(columns: I) -> Clause
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let columns = join_columns(columns);
    let sql = if columns.is_empty() {
        "RETURNING *".to_string()
    } else {
        format!("RETURNING {}", columns.join(", "))
    };
    Clause::new(ClauseKind::Returning, move |_| Ok(Some(Fragment::text(sql.clone()))))
}

/// `FROM expression`, e.g. `FROM roles r` on an UPDATE.
///
/// An empty expression fails the build. Not intended for subqueries.
pub fn with_from(expression: impl Into<String>) -> Clause {
    let expression = expression.into();
    Clause::new(ClauseKind::From, move |_| {
        if expression.trim().is_empty() {
            return Err(BuildError::EmptyFrom);
        }
        Ok(Some(Fragment::text(format!("FROM {expression}"))))
    })
}

/// `GROUP BY a, b`. No columns fails the build.
pub fn with_group_by<I, S>(columns: I) -> Clause
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let columns = join_columns(columns);
    Clause::new(ClauseKind::GroupBy, move |_| {
        if columns.is_empty() {
            return Err(BuildError::EmptyGroupBy);
        }
        Ok(Some(Fragment::text(format!("GROUP BY {}", columns.join(", ")))))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(clause: &Clause) -> BuildResult<Option<Fragment>> {
        clause.render(&RenderContext::default())
    }

    #[test]
    fn returning_lists_columns() {
        let f = render(&with_returning(["id", "created_at"])).unwrap().unwrap();
        assert_eq!(f.sql, "RETURNING id, created_at");
        assert!(f.params.is_empty());
    }

    #[test]
    fn returning_defaults_to_star() {
        let f = render(&with_returning(Vec::<String>::new())).unwrap().unwrap();
        assert_eq!(f.sql, "RETURNING *");
    }

    #[test]
    fn from_keeps_alias() {
        let f = render(&with_from("roles r")).unwrap().unwrap();
        assert_eq!(f.sql, "FROM roles r");
    }

    #[test]
    fn from_rejects_empty_expression() {
        assert_eq!(render(&with_from("")).unwrap_err(), BuildError::EmptyFrom);
    }

    #[test]
    fn group_by() {
        let f = render(&with_group_by(["u.id", "u.name"])).unwrap().unwrap();
        assert_eq!(f.sql, "GROUP BY u.id, u.name");
        assert_eq!(
            render(&with_group_by(Vec::<&str>::new())).unwrap_err(),
            BuildError::EmptyGroupBy
        );
    }

    #[test]
    fn clause_can_be_rendered_repeatedly() {
        let clause = with_returning(["id"]);
        assert_eq!(render(&clause).unwrap().unwrap().sql, "RETURNING id");
        assert_eq!(render(&clause.clone()).unwrap().unwrap().sql, "RETURNING id");
        assert_eq!(clause.kind(), ClauseKind::Returning);
    }

    #[test]
    fn conflicts() {
        use ClauseKind::*;
        assert!(Returning.conflicts_with(Returning));
        assert!(!Where.conflicts_with(Where));
        assert!(Pagination.conflicts_with(Limit));
        assert!(Offset.conflicts_with(Pagination));
        assert!(!Limit.conflicts_with(Offset));
    }
}
