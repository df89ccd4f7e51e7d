use super::{Statement, StatementKind, require_table};

/// `DELETE FROM table`.
pub fn delete(table: &str) -> Statement {
    let result = require_table(table).map(|table| (format!("DELETE FROM {table}"), 0));
    Statement::from_result(StatementKind::Delete, result)
}
