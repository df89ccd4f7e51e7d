use super::{Statement, StatementKind, require_table, require_target_columns};
use crate::context::Placeholders;
use crate::error::BuildResult;

/// `INSERT INTO table (a, b) VALUES ($1, $2)`.
///
/// The skeleton consumes one placeholder per column; bind the column values
/// first, then the arguments returned by [`Statement::build`].
pub fn insert<I, S>(table: &str, columns: I) -> Statement
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Statement::from_result(StatementKind::Insert, render(table, columns))
}

fn render<I, S>(table: &str, columns: I) -> BuildResult<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let table = require_table(table)?;
    let columns = require_target_columns(columns)?;

    let mut sql = format!("INSERT INTO {table} (");
    sql.push_str(&columns.join(", "));
    sql.push_str(") VALUES (");
    let mut placeholders = Placeholders::after(0);
    for i in 0..columns.len() {
        if i > 0 {
            sql.push_str(", ");
        }
        placeholders.push_next(&mut sql);
    }
    sql.push(')');

    Ok((sql, columns.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;

    #[test]
    fn insert_skeleton() {
        let stmt = insert("users", ["id", "name", "email", "password"]);
        assert_eq!(
            stmt.sql(),
            "INSERT INTO users (id, name, email, password) VALUES ($1, $2, $3, $4)"
        );
        assert_eq!(stmt.param_count(), 4);
        assert!(stmt.error().is_none());
    }

    #[test]
    fn insert_requires_table_and_columns() {
        assert_eq!(
            insert("", ["id"]).error(),
            Some(&BuildError::MissingTable)
        );
        assert_eq!(
            insert("users", Vec::<String>::new()).error(),
            Some(&BuildError::MissingColumns)
        );
    }

    #[test]
    fn insert_rejects_non_identifier_columns() {
        let stmt = insert("users", ["id", "name) VALUES (1); --"]);
        assert!(matches!(stmt.error(), Some(BuildError::InvalidIdentifier { .. })));
    }
}
