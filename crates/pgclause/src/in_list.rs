//! IN list expansion: `($n, $n+1, ...)` plus the matching arguments.

use crate::clause::Fragment;
use crate::context::Placeholders;
use crate::filter::FilterValue;
use crate::param::Param;

/// Render `value` as a parenthesized placeholder list starting after `offset`.
///
/// Returns `None` when there is nothing to bind: no value, an empty
/// collection, an empty string or a scalar (which is not a list shape). The
/// caller must then drop the surrounding `IN`, so `IN ()` is never produced.
pub fn render_in(value: &FilterValue, offset: usize) -> Option<Fragment> {
    render_with(value, &mut Placeholders::after(offset))
}

pub(crate) fn render_with(value: &FilterValue, placeholders: &mut Placeholders) -> Option<Fragment> {
    let params: Vec<Param> = match value {
        FilterValue::List(values) if !values.is_empty() => values.clone(),
        FilterValue::Delimited(text) if !text.is_empty() => text
            .split(',')
            .map(|segment| Param::new(segment.to_string()))
            .collect(),
        _ => return None,
    };

    let mut sql = String::with_capacity(2 + params.len() * 4);
    sql.push('(');
    for i in 0..params.len() {
        if i > 0 {
            sql.push_str(", ");
        }
        placeholders.push_next(&mut sql);
    }
    sql.push(')');

    Some(Fragment::new(sql, params))
}
