//! Build configuration.

/// What the pipeline does when two clauses of conflicting kinds render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail with [`BuildError::DuplicateClause`](crate::BuildError::DuplicateClause).
    #[default]
    Reject,
    /// Render every clause and let PostgreSQL reject the result.
    Allow,
}

/// Options for [`build_with`](crate::build_with).
///
/// # Example
/// ```ignore
/// use pgclause::{BuildConfig, DuplicatePolicy};
///
/// let config = BuildConfig::new()
///     .duplicate_policy(DuplicatePolicy::Allow)
///     .max_logged_sql_len(64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildConfig {
    pub duplicate_policy: DuplicatePolicy,
    /// Bytes of SQL included in log events. `None` logs the full text.
    pub max_logged_sql_len: Option<usize>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Reject,
            max_logged_sql_len: Some(200),
        }
    }
}

impl BuildConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn max_logged_sql_len(mut self, bytes: usize) -> Self {
        self.max_logged_sql_len = Some(bytes);
        self
    }

    /// Log SQL text in full.
    pub fn no_truncate(mut self) -> Self {
        self.max_logged_sql_len = None;
        self
    }

    /// `sql` cut to the configured length on a char boundary.
    pub fn loggable_sql<'a>(&self, sql: &'a str) -> &'a str {
        match self.max_logged_sql_len {
            Some(max) => truncate_sql_bytes(sql, max),
            None => sql,
        }
    }
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
