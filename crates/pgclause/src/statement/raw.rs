use super::{Statement, StatementKind};

/// Caller-supplied SQL used verbatim as the skeleton.
///
/// The text is scanned (outside string literals, quoted identifiers, dollar
/// quotes and comments) for the highest `$n` placeholder, which becomes the
/// skeleton's placeholder count, and for a `WHERE` keyword, so that a WHERE
/// clause added later continues the existing condition as `AND (...)`.
///
/// The raw text is not rewritten: a condition with a top-level OR must carry
/// its own parentheses (`WHERE (a OR b)`), otherwise the added `AND` binds to
/// its last operand only.
pub fn raw(sql: impl Into<String>) -> Statement {
    let sql = sql.into();
    let scan = scan(&sql);
    Statement::new(StatementKind::Raw, sql, scan.max_placeholder)
        .where_already_present(scan.has_where)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Scan {
    max_placeholder: usize,
    has_where: bool,
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Skip to just past the next `close` byte, or to the end.
fn skip_past(bytes: &[u8], from: usize, close: u8) -> usize {
    match bytes[from..].iter().position(|&b| b == close) {
        Some(p) => from + p + 1,
        None => bytes.len(),
    }
}

fn scan(sql: &str) -> Scan {
    let bytes = sql.as_bytes();
    let mut out = Scan::default();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            // '' inside a literal reads as close-then-open, which is harmless here.
            b'\'' => i = skip_past(bytes, i + 1, b'\''),
            b'"' => i = skip_past(bytes, i + 1, b'"'),
            b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_past(bytes, i + 2, b'\n'),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i + 2),
            b'$' => i = scan_dollar(bytes, i, &mut out),
            b if is_word_byte(b) => {
                let start = i;
                while i < bytes.len() && is_word_byte(bytes[i]) {
                    i += 1;
                }
                if bytes[start..i].eq_ignore_ascii_case(b"where") {
                    out.has_where = true;
                }
            }
            _ => i += 1,
        }
    }

    out
}

/// Block comments nest in PostgreSQL.
fn skip_block_comment(bytes: &[u8], mut i: usize) -> usize {
    let mut depth = 1;
    while i < bytes.len() {
        if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
            depth += 1;
            i += 2;
        } else if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
            depth -= 1;
            i += 2;
            if depth == 0 {
                return i;
            }
        } else {
            i += 1;
        }
    }
    bytes.len()
}

/// Handle a `$` at `i`: either a `$n` placeholder or a `$tag$ ... $tag$` quote.
fn scan_dollar(bytes: &[u8], i: usize, out: &mut Scan) -> usize {
    let digits = bytes[i + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits > 0 {
        let end = i + 1 + digits;
        let n = std::str::from_utf8(&bytes[i + 1..end])
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(0);
        out.max_placeholder = out.max_placeholder.max(n);
        return end;
    }

    let tag_len = bytes[i + 1..]
        .iter()
        .take_while(|&&b| is_word_byte(b))
        .count();
    let close = i + 1 + tag_len;
    if bytes.get(close) != Some(&b'$') {
        return i + 1;
    }

    let tag = &bytes[i..=close];
    let body = close + 1;
    match bytes[body..].windows(tag.len()).position(|w| w == tag) {
        Some(p) => body + p + tag.len(),
        None => bytes.len(),
    }
}
