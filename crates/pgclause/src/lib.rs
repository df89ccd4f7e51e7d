//! # pgclause
//!
//! Composable SQL clause rendering for PostgreSQL.
//!
//! ## Features
//!
//! - **Statement skeletons**: `INSERT`, `UPDATE`, `DELETE`, `SELECT` or raw SQL
//! - **Composable clauses**: WHERE, RETURNING, ORDER BY, LIMIT, OFFSET, FROM,
//!   GROUP BY and page-based pagination, each a value that renders itself
//! - **Contiguous placeholders**: `$1..$n` numbered across every clause, with
//!   arguments returned in the same order
//! - **Allow-listed fields**: caller-facing names mapped to real columns, so
//!   user input never reaches the SQL text
//! - **No I/O**: the output plugs straight into `tokio-postgres`
//!
//! ## Example
//!
//! ```ignore
//! use pgclause::{AllowedColumns, Filter, SortItem, select, with_limit, with_safe_sort, with_safe_where};
//! use std::sync::Arc;
//!
//! let allowed = Arc::new(
//!     AllowedColumns::new()
//!         .map("email", "u.email")
//!         .map("created", "u.created_at"),
//! );
//!
//! let users = select("users u", ["u.id", "u.email"]).filter([Filter::is_null("u.deleted_at")]);
//!
//! let q = users.build(&[
//!     with_safe_where(allowed.clone(), [Filter::ilike("email", "%@example.com")]),
//!     with_safe_sort(allowed, [SortItem::desc("created")]),
//!     with_limit(20),
//! ])?;
//!
//! assert_eq!(
//!     q.sql,
//!     "SELECT u.id, u.email FROM users u WHERE u.deleted_at IS NULL \
//!      AND (u.email ILIKE $1) ORDER BY u.created_at DESC LIMIT $2"
//! );
//! let rows = client.query(&q.sql, &q.params_ref()).await?;
//! ```

pub mod build;
pub mod clause;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod ident;
pub mod in_list;
pub mod pagination;
pub mod param;
pub mod predicate;
pub mod sort;
pub mod statement;

pub use build::{BuiltQuery, build, build_with};
pub use clause::{Clause, ClauseKind, Fragment, with_from, with_group_by, with_returning};
pub use config::{BuildConfig, DuplicatePolicy};
pub use context::{Placeholders, RenderContext};
pub use error::{BuildError, BuildResult};
pub use filter::{AllowedColumns, Chain, Filter, FilterValue, Operator, ParseChainError};
pub use ident::{Ident, IdentPart};
pub use in_list::render_in;
pub use pagination::{with_limit, with_offset, with_pagination};
pub use param::{Param, SqlNull};
pub use predicate::{render_where, with_safe_where, with_where};
pub use sort::{ParseSortDirError, SortDir, SortItem, with_safe_sort, with_sort};
pub use statement::{Statement, StatementKind, delete, insert, raw, select, update};

// Re-export tokio-postgres types so callers bind values without a direct dependency.
pub use tokio_postgres::types::ToSql;
