use super::{Statement, StatementKind, require_table, require_target_columns};
use crate::context::Placeholders;
use crate::error::BuildResult;

/// `UPDATE table SET a = $1, b = $2`.
///
/// The SET list consumes one placeholder per column, so clause placeholders
/// (e.g. a WHERE) continue after them. Bind the SET values first.
pub fn update<I, S>(table: &str, columns: I) -> Statement
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Statement::from_result(StatementKind::Update, render(table, columns))
}

fn render<I, S>(table: &str, columns: I) -> BuildResult<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let table = require_table(table)?;
    let columns = require_target_columns(columns)?;

    let mut sql = format!("UPDATE {table} SET ");
    let mut placeholders = Placeholders::after(0);
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push_str(column);
        sql.push_str(" = ");
        placeholders.push_next(&mut sql);
    }

    Ok((sql, placeholders.consumed()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;

    #[test]
    fn update_skeleton() {
        let stmt = update("users", ["id", "name", "email", "password"]);
        assert_eq!(
            stmt.sql(),
            "UPDATE users SET id = $1, name = $2, email = $3, password = $4"
        );
        assert_eq!(stmt.param_count(), 4);
    }

    #[test]
    fn single_column_update() {
        let stmt = update("users", ["name"]);
        assert_eq!(stmt.sql(), "UPDATE users SET name = $1");
        assert_eq!(stmt.param_count(), 1);
    }

    #[test]
    fn update_requires_columns() {
        assert_eq!(
            update("users", Vec::<&str>::new()).error(),
            Some(&BuildError::MissingColumns)
        );
        assert_eq!(update(" ", ["id"]).error(), Some(&BuildError::MissingTable));
    }
}
