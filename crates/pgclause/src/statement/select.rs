use super::{Statement, StatementKind, require_columns, require_table};
use crate::error::BuildResult;

/// `SELECT a, b FROM table`.
///
/// Columns are select-list expressions (`u.*`, `COUNT(*) AS total`) and are
/// written as given.
pub fn select<I, S>(table: &str, columns: I) -> Statement
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Statement::from_result(StatementKind::Select, render(table, columns))
}

fn render<I, S>(table: &str, columns: I) -> BuildResult<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let table = require_table(table)?;
    let columns = require_columns(columns)?;
    Ok((format!("SELECT {} FROM {table}", columns.join(", ")), 0))
}
