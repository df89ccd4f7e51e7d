//! WHERE clause rendering.
//!
//! Filters are rendered in order into a single boolean expression:
//!
//! - the connective between two rendered filters is the chaining key of the
//!   earlier one; a key set only on the final filter joins it to its
//!   predecessor; otherwise AND;
//! - group markers wrap filters in parentheses, `n` at a time;
//! - IN / NOT IN with nothing to bind is dropped without leaving a dangling
//!   connective or unbalanced parentheses;
//! - a body with an OR outside any group is wrapped in parentheses;
//! - when a WHERE keyword is already present the fragment is `AND (...)`, so
//!   it narrows the existing condition as a whole.

use crate::clause::{Clause, ClauseKind, Fragment};
use crate::context::{Placeholders, RenderContext};
use crate::error::{BuildError, BuildResult};
use crate::filter::{AllowedColumns, Chain, Filter, FilterValue, Operator};
use crate::in_list;
use crate::param::Param;
use std::sync::Arc;

/// `WHERE ...` from unvalidated field names.
///
/// Field names are written into the SQL as given; only use this with fields
/// that do not come from user input. See [`with_safe_where`].
pub fn with_where<I>(filters: I) -> Clause
where
    I: IntoIterator<Item = Filter>,
{
    let filters: Vec<Filter> = filters.into_iter().collect();
    Clause::new(ClauseKind::Where, move |ctx| render_where(&filters, None, ctx))
}

/// `WHERE ...` with every field resolved through `allowed`.
///
/// A field missing from the allow-list fails the build with
/// [`BuildError::InvalidField`].
pub fn with_safe_where<A, I>(allowed: A, filters: I) -> Clause
where
    A: Into<Arc<AllowedColumns>>,
    I: IntoIterator<Item = Filter>,
{
    let allowed = allowed.into();
    let filters: Vec<Filter> = filters.into_iter().collect();
    Clause::new(ClauseKind::Where, move |ctx| {
        render_where(&filters, Some(&*allowed), ctx)
    })
}

/// Render `filters` as a WHERE fragment.
///
/// Returns `Ok(None)` when there are no filters or none of them rendered.
pub fn render_where(
    filters: &[Filter],
    allowed: Option<&AllowedColumns>,
    ctx: &RenderContext,
) -> BuildResult<Option<Fragment>> {
    if filters.is_empty() {
        return Ok(None);
    }

    let mut placeholders = ctx.placeholders();
    let mut body = String::new();
    let mut params = Vec::new();
    let mut pending_open = 0;
    // Parentheses open in `body`, and whether an OR was emitted outside them.
    let mut depth = 0usize;
    let mut top_level_or = false;
    // Chaining key of the last rendered filter; `None` until one renders.
    let mut previous: Option<Option<Chain>> = None;
    let last = filters.len() - 1;

    for (i, filter) in filters.iter().enumerate() {
        let column = resolve_field(filter, allowed)?;
        if let Operator::Unknown(operator) = &filter.operator {
            return Err(BuildError::unknown_operator(operator));
        }

        pending_open += filter.group_open;

        let Some(expr) = render_predicate(column, filter, &mut placeholders, &mut params) else {
            let cancelled = pending_open.min(filter.group_close);
            pending_open -= cancelled;
            if previous.is_some() {
                let closes = filter.group_close - cancelled;
                push_repeated(&mut body, ')', closes);
                depth = depth.saturating_sub(closes);
            }
            continue;
        };

        if let Some(chain) = previous {
            let trailing = if i == last { filter.chain } else { None };
            let chain = chain.or(trailing).unwrap_or_default();
            top_level_or |= depth == 0 && chain == Chain::Or;
            body.push(' ');
            body.push_str(chain.as_sql());
            body.push(' ');
        }

        push_repeated(&mut body, '(', pending_open);
        depth += pending_open;
        pending_open = 0;
        body.push_str(&expr);
        push_repeated(&mut body, ')', filter.group_close);
        depth = depth.saturating_sub(filter.group_close);

        previous = Some(filter.chain);
    }

    if previous.is_none() {
        return Ok(None);
    }

    // A continuation is ANDed as one unit with the condition before it, and a
    // top-level OR is wrapped so a later continuation cannot split it.
    let body = body.trim();
    let sql = if ctx.where_present() {
        format!("AND ({body})")
    } else if top_level_or {
        format!("WHERE ({body})")
    } else {
        format!("WHERE {body}")
    };
    Ok(Some(Fragment::new(sql, params)))
}

fn resolve_field<'a>(
    filter: &'a Filter,
    allowed: Option<&'a AllowedColumns>,
) -> BuildResult<&'a str> {
    match allowed {
        Some(allowed) => allowed
            .resolve(&filter.field)
            .ok_or_else(|| BuildError::invalid_field(&filter.field)),
        None => Ok(&filter.field),
    }
}

/// Render one predicate, or `None` when its value has nothing to bind.
fn render_predicate(
    column: &str,
    filter: &Filter,
    placeholders: &mut Placeholders,
    params: &mut Vec<Param>,
) -> Option<String> {
    let operator = &filter.operator;
    if *operator == Operator::Default {
        return Some(column.to_string());
    }

    let token = operator.as_sql()?;
    if operator.is_null_check() {
        return Some(format!("{column} {token}"));
    }

    if operator.is_list() {
        let list = in_list::render_with(&filter.value, placeholders)?;
        params.extend(list.params);
        return Some(format!("{column} {token} {}", list.sql));
    }

    let param = match &filter.value {
        FilterValue::Scalar(param) => param.clone(),
        FilterValue::None => Param::null(),
        FilterValue::Delimited(text) => Param::new(text.clone()),
        FilterValue::List(_) => return None,
    };

    let mut sql = format!("{column} {token} ");
    placeholders.push_next(&mut sql);
    params.push(param);
    Some(sql)
}

fn push_repeated(out: &mut String, ch: char, n: usize) {
    out.extend(std::iter::repeat_n(ch, n));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(filters: &[Filter]) -> Option<Fragment> {
        render_where(filters, None, &RenderContext::default()).unwrap()
    }

    fn sql_of(filters: &[Filter]) -> String {
        render(filters).map(|f| f.sql).unwrap_or_default()
    }

    fn args_of(fragment: &Fragment) -> Vec<String> {
        fragment.params.iter().map(|p| format!("{p:?}")).collect()
    }

    #[test]
    fn one_filter() {
        let f = render(&[Filter::eq("email", "hernan_rm@outlook.es")]).unwrap();
        assert_eq!(f.sql, "WHERE email = $1");
        assert_eq!(args_of(&f), [r#""hernan_rm@outlook.es""#]);
    }

    #[test]
    fn and_is_the_default_chaining_key() {
        let f = render(&[Filter::eq("email", "a"), Filter::eq("nickname", "b")]).unwrap();
        assert_eq!(f.sql, "WHERE email = $1 AND nickname = $2");
        assert_eq!(args_of(&f), [r#""a""#, r#""b""#]);
    }

    #[test]
    fn or_chaining_key() {
        assert_eq!(
            sql_of(&[Filter::eq("email", "a").or(), Filter::eq("nickname", "b")]),
            "WHERE (email = $1 OR nickname = $2)"
        );
    }

    #[test]
    fn trailing_chaining_key_joins_last_filter() {
        assert_eq!(
            sql_of(&[
                Filter::eq("email", "a").group_open(),
                Filter::eq("nickname", "b").group_close().or(),
            ]),
            "WHERE (email = $1 OR nickname = $2)"
        );
    }

    #[test]
    fn explicit_key_wins_over_trailing_key() {
        assert_eq!(
            sql_of(&[Filter::eq("a", 1_i32).and(), Filter::eq("b", 2_i32).or()]),
            "WHERE a = $1 AND b = $2"
        );
    }

    #[test]
    fn one_condition_group() {
        assert_eq!(
            sql_of(&[
                Filter::eq("email", "a").or().group_open(),
                Filter::eq("nickname", "b").group_close(),
            ]),
            "WHERE (email = $1 OR nickname = $2)"
        );
    }

    #[test]
    fn two_condition_groups() {
        let f = render(&[
            Filter::eq("email", "a").or().group_open(),
            Filter::eq("nickname", "b").group_close(),
            Filter::eq("phone_number", "12345679").or().group_open(),
            Filter::ilike("full_name", "Hernan Reyes").group_close(),
        ])
        .unwrap();
        assert_eq!(
            f.sql,
            "WHERE (email = $1 OR nickname = $2) AND (phone_number = $3 OR full_name ILIKE $4)"
        );
        assert_eq!(f.params.len(), 4);
    }

    #[test]
    fn nested_groups_repeat_parentheses() {
        assert_eq!(
            sql_of(&[
                Filter::eq("email", "a").or().group_open_n(2),
                Filter::eq("nickname", "b").group_close(),
                Filter::eq("phone_number", "c").or().group_open(),
                Filter::ilike("full_name", "d").group_close_n(2),
            ]),
            "WHERE ((email = $1 OR nickname = $2) AND (phone_number = $3 OR full_name ILIKE $4))"
        );
    }

    #[test]
    fn in_operator() {
        let f = render(&[Filter::in_list("id", [1_i64, 2, 3])]).unwrap();
        assert_eq!(f.sql, "WHERE id IN ($1, $2, $3)");
        assert_eq!(args_of(&f), ["1", "2", "3"]);
    }

    #[test]
    fn not_in_operator() {
        assert_eq!(
            sql_of(&[Filter::not_in("id", [1_i64, 2, 3])]),
            "WHERE id NOT IN ($1, $2, $3)"
        );
    }

    #[test]
    fn in_with_delimited_string() {
        let f = render(&[Filter::in_delimited("status", "active,banned")]).unwrap();
        assert_eq!(f.sql, "WHERE status IN ($1, $2)");
        assert_eq!(args_of(&f), [r#""active""#, r#""banned""#]);
    }

    #[test]
    fn empty_in_is_suppressed() {
        assert!(render(&[Filter::in_list("id", Vec::<i64>::new())]).is_none());
        assert!(render(&[Filter::not_in("id", Vec::<i64>::new())]).is_none());
    }

    #[test]
    fn empty_in_keeps_numbering_contiguous() {
        let f = render(&[
            Filter::eq("email", "a"),
            Filter::in_list("id", Vec::<i64>::new()),
            Filter::eq("nickname", "b"),
        ])
        .unwrap();
        assert_eq!(f.sql, "WHERE email = $1 AND nickname = $2");
        assert_eq!(f.params.len(), 2);
    }

    #[test]
    fn empty_in_inside_group_keeps_parentheses_balanced() {
        assert_eq!(
            sql_of(&[
                Filter::eq("a", 1_i32),
                Filter::in_list("id", Vec::<i64>::new()).or().group_open(),
                Filter::eq("b", 2_i32).group_close(),
            ]),
            "WHERE a = $1 AND (b = $2)"
        );
        assert_eq!(
            sql_of(&[
                Filter::eq("a", 1_i32).group_open(),
                Filter::in_list("id", Vec::<i64>::new()).group_close(),
                Filter::eq("b", 2_i32),
            ]),
            "WHERE (a = $1) AND b = $2"
        );
    }

    #[test]
    fn in_with_scalar_value_is_omitted() {
        let filters = [
            Filter::new("id", Operator::In, FilterValue::scalar(1_i64)),
            Filter::eq("email", "a"),
        ];
        assert_eq!(sql_of(&filters), "WHERE email = $1");
    }

    #[test]
    fn null_checks_bind_nothing() {
        let f = render(&[
            Filter::is_null("deleted_at"),
            Filter::new("banned_at", "is_not", FilterValue::None),
            Filter::eq("email", "a"),
        ])
        .unwrap();
        assert_eq!(
            f.sql,
            "WHERE deleted_at IS NULL AND banned_at IS NOT NULL AND email = $1"
        );
        assert_eq!(f.params.len(), 1);
    }

    #[test]
    fn default_operator_passes_expression_through() {
        assert_eq!(
            sql_of(&[Filter::raw("active"), Filter::gt("age", 18_i32)]),
            "WHERE active AND age > $1"
        );
    }

    #[test]
    fn missing_value_binds_null() {
        let f = render(&[Filter::new("email", "=", FilterValue::None)]).unwrap();
        assert_eq!(f.sql, "WHERE email = $1");
        assert_eq!(args_of(&f), ["SqlNull"]);
    }

    #[test]
    fn all_comparison_operators() {
        let f = render(&[
            Filter::ne("a", 1_i32),
            Filter::lt("b", 1_i32),
            Filter::lte("c", 1_i32),
            Filter::gt("d", 1_i32),
            Filter::gte("e", 1_i32),
            Filter::like("f", "x%"),
            Filter::not_like("g", "x%"),
            Filter::not_ilike("h", "x%"),
        ])
        .unwrap();
        assert_eq!(
            f.sql,
            "WHERE a <> $1 AND b < $2 AND c <= $3 AND d > $4 AND e >= $5 \
             AND f LIKE $6 AND g NOT LIKE $7 AND h NOT ILIKE $8"
        );
        assert_eq!(f.params.len(), 8);
    }

    #[test]
    fn numbering_starts_after_context_offset() {
        let ctx = RenderContext::new(4);
        let filters = [Filter::eq("id", 1_i64), Filter::in_list("role", [1_i32, 2])];
        let f = render_where(&filters, None, &ctx).unwrap().unwrap();
        assert_eq!(f.sql, "WHERE id = $5 AND role IN ($6, $7)");
    }

    #[test]
    fn present_where_is_continued_with_and() {
        let ctx = RenderContext::new(1).with_where_present(true);
        let f = render_where(&[Filter::eq("email", "a")], None, &ctx).unwrap().unwrap();
        assert_eq!(f.sql, "AND (email = $2)");

        let filters = [Filter::eq("title", "a").or(), Filter::eq("title", "b")];
        let f = render_where(&filters, None, &ctx).unwrap().unwrap();
        assert_eq!(f.sql, "AND (title = $2 OR title = $3)");
    }

    #[test]
    fn top_level_or_is_wrapped_once() {
        // Already grouped: no extra parentheses.
        assert_eq!(
            sql_of(&[
                Filter::eq("a", 1_i32).or().group_open(),
                Filter::eq("b", 2_i32).group_close(),
            ]),
            "WHERE (a = $1 OR b = $2)"
        );
        // OR between two groups is top-level.
        assert_eq!(
            sql_of(&[
                Filter::eq("a", 1_i32).group_open(),
                Filter::eq("b", 2_i32).group_close().or(),
                Filter::eq("c", 3_i32).group_open(),
                Filter::eq("d", 4_i32).group_close(),
            ]),
            "WHERE ((a = $1 AND b = $2) OR (c = $3 AND d = $4))"
        );
        // OR after an omitted IN that closed the group.
        assert_eq!(
            sql_of(&[
                Filter::eq("a", 1_i32).group_open(),
                Filter::in_list("id", Vec::<i64>::new()).group_close().or(),
                Filter::is_null("b").or(),
                Filter::eq("c", 3_i32),
            ]),
            "WHERE ((a = $1) AND b IS NULL OR c = $2)"
        );
    }

    #[test]
    fn no_filters_no_fragment() {
        assert!(render(&[]).is_none());
    }

    #[test]
    fn invalid_operator() {
        let err = render_where(
            &[Filter::new("price", "invalid", FilterValue::list([1.1_f64]))],
            None,
            &RenderContext::default(),
        )
        .unwrap_err();
        assert_eq!(err, BuildError::unknown_operator("invalid"));
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn allow_list_maps_fields() {
        let allowed = AllowedColumns::new().allow("email").map("name", "u.full_name");
        let f = render_where(
            &[Filter::eq("email", "a"), Filter::ilike("name", "%x%")],
            Some(&allowed),
            &RenderContext::default(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(f.sql, "WHERE email = $1 AND u.full_name ILIKE $2");
    }

    #[test]
    fn allow_list_rejects_unknown_field() {
        let allowed = AllowedColumns::new().allow("email");
        let err = render_where(
            &[Filter::eq("email", "a"), Filter::eq("password", "x")],
            Some(&allowed),
            &RenderContext::default(),
        )
        .unwrap_err();
        assert_eq!(err, BuildError::invalid_field("password"));
    }

    #[test]
    fn allow_list_checks_omitted_filters_too() {
        let allowed = AllowedColumns::new().allow("email");
        let err = render_where(
            &[Filter::in_list("id", Vec::<i64>::new())],
            Some(&allowed),
            &RenderContext::default(),
        )
        .unwrap_err();
        assert!(err.is_invalid_field());
    }

    #[test]
    fn safe_where_clause_uses_allow_list() {
        let allowed = AllowedColumns::new().allow("id");
        let clause = with_safe_where(allowed, [Filter::eq("id", 1_i64)]);
        assert_eq!(clause.kind(), ClauseKind::Where);
        let f = clause.render(&RenderContext::default()).unwrap().unwrap();
        assert_eq!(f.sql, "WHERE id = $1");

        let shared = Arc::new(AllowedColumns::new());
        let clause = with_safe_where(shared, [Filter::eq("id", 1_i64)]);
        assert!(clause.render(&RenderContext::default()).is_err());
    }
}
