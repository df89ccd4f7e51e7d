//! The composition pipeline.
//!
//! [`build`] renders a [`Statement`]'s default clauses followed by the
//! caller's overrides, one at a time, each against a fresh
//! [`RenderContext`] seeded with the placeholders consumed so far. The
//! output is either complete SQL with its aligned arguments or an error;
//! partial text is never returned.

use crate::clause::{Clause, ClauseKind};
use crate::config::{BuildConfig, DuplicatePolicy};
use crate::context::RenderContext;
use crate::error::{BuildError, BuildResult};
use crate::param::Param;
use crate::statement::Statement;
use tokio_postgres::types::ToSql;

/// Final SQL text plus the arguments bound to its placeholders.
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub sql: String,
    /// Clause arguments, in placeholder order. Skeleton placeholders
    /// (INSERT values, UPDATE SET values) come first and are bound by the
    /// caller.
    pub params: Vec<Param>,
}

impl BuiltQuery {
    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(Param::as_ref).collect()
    }

    pub fn into_parts(self) -> (String, Vec<Param>) {
        (self.sql, self.params)
    }
}

/// Render `statement` with the default [`BuildConfig`].
pub fn build(statement: &Statement, overrides: &[Clause]) -> BuildResult<BuiltQuery> {
    build_with(&BuildConfig::default(), statement, overrides)
}

/// Render `statement` with its default clauses followed by `overrides`.
pub fn build_with(
    config: &BuildConfig,
    statement: &Statement,
    overrides: &[Clause],
) -> BuildResult<BuiltQuery> {
    if let Some(err) = statement.error() {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "pgclause.build",
            kind = ?statement.kind(),
            error = %err,
            "statement has a construction error"
        );
        return Err(err.clone());
    }

    let result = render_clauses(config, statement, overrides);
    #[cfg(feature = "tracing")]
    log_outcome(config, statement, overrides.len(), &result);
    result
}

#[cfg(feature = "tracing")]
fn log_outcome(
    config: &BuildConfig,
    statement: &Statement,
    overrides: usize,
    result: &BuildResult<BuiltQuery>,
) {
    let clauses = statement.default_clauses().len() + overrides;
    match result {
        Ok(query) => tracing::debug!(
            target: "pgclause.build",
            kind = ?statement.kind(),
            clauses,
            sql = config.loggable_sql(&query.sql),
            params = query.params.len(),
            "built statement"
        ),
        Err(err) => tracing::debug!(
            target: "pgclause.build",
            kind = ?statement.kind(),
            clauses,
            error = %err,
            "build failed"
        ),
    }
}

fn render_clauses(
    config: &BuildConfig,
    statement: &Statement,
    overrides: &[Clause],
) -> BuildResult<BuiltQuery> {
    let mut sql = statement.sql().to_string();
    let mut params: Vec<Param> = Vec::new();
    let mut where_present = statement.where_present();
    let mut rendered: Vec<ClauseKind> = Vec::new();

    for clause in statement.default_clauses().iter().chain(overrides) {
        let ctx = RenderContext::new(statement.param_count() + params.len())
            .with_where_present(where_present);

        let Some(fragment) = clause.render(&ctx)? else {
            continue;
        };
        if fragment.sql.trim().is_empty() {
            continue;
        }

        let kind = clause.kind();
        if config.duplicate_policy == DuplicatePolicy::Reject
            && rendered.iter().any(|seen| seen.conflicts_with(kind))
        {
            return Err(BuildError::DuplicateClause(kind));
        }
        rendered.push(kind);

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: "pgclause.build",
            clause = %kind,
            offset = ctx.offset(),
            params = fragment.params.len(),
            "rendered clause"
        );

        if kind == ClauseKind::Where {
            where_present = true;
        }
        sql.push(' ');
        sql.push_str(&fragment.sql);
        params.extend(fragment.params);
    }

    Ok(BuiltQuery { sql, params })
}
