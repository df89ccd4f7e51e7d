//! LIMIT / OFFSET and page-based pagination.
//!
//! Values are bound as `i64` parameters, never written into the SQL text.

use crate::clause::{Clause, ClauseKind, Fragment};
use crate::context::RenderContext;
use crate::error::BuildError;
use crate::param::Param;

fn bound(keyword: &str, value: i64, ctx: &RenderContext) -> Fragment {
    let mut placeholders = ctx.placeholders();
    let mut sql = format!("{keyword} ");
    placeholders.push_next(&mut sql);
    Fragment::new(sql, vec![Param::new(value)])
}

/// `LIMIT $n`. Zero or negative omits the clause.
pub fn with_limit(value: i64) -> Clause {
    Clause::new(ClauseKind::Limit, move |ctx| {
        Ok((value > 0).then(|| bound("LIMIT", value, ctx)))
    })
}

/// `OFFSET $n`. Zero or negative omits the clause.
pub fn with_offset(value: i64) -> Clause {
    Clause::new(ClauseKind::Offset, move |ctx| {
        Ok((value > 0).then(|| bound("OFFSET", value, ctx)))
    })
}

/// `LIMIT $n OFFSET $n+1` from a 1-based page number.
///
/// `page_size <= 0` omits the clause; `page < 1` fails the build.
pub fn with_pagination(page: i64, page_size: i64) -> Clause {
    Clause::new(ClauseKind::Pagination, move |ctx| {
        if page_size <= 0 {
            return Ok(None);
        }
        if page < 1 {
            return Err(BuildError::InvalidPage(page));
        }

        let mut placeholders = ctx.placeholders();
        let mut sql = String::from("LIMIT ");
        placeholders.push_next(&mut sql);
        sql.push_str(" OFFSET ");
        placeholders.push_next(&mut sql);

        let offset = (page - 1).saturating_mul(page_size);
        Ok(Some(Fragment::new(
            sql,
            vec![Param::new(page_size), Param::new(offset)],
        )))
    })
}
