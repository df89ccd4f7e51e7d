//! SQL identifier validation for statement skeletons.
//!
//! INSERT and UPDATE target columns are written into the SQL text verbatim,
//! so they are checked before a skeleton is rendered:
//!
//! - Unquoted parts must match `[A-Za-z_][A-Za-z0-9_$]*`
//! - Quoted parts allow any characters except NUL and escape `"` as `""`
//! - Parts are joined with `.` (`schema.table`, `public."UserTable"`)

use crate::error::{BuildError, BuildResult};

/// A part of a SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    Unquoted(String),
    Quoted(String),
}

/// A validated SQL identifier (schema, table or column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

impl Ident {
    /// Parse an identifier string, supporting dotted and quoted forms.
    pub fn parse(s: &str) -> BuildResult<Self> {
        let fail = |reason: String| BuildError::invalid_identifier(s, reason);

        if s.is_empty() {
            return Err(fail("identifier cannot be empty".into()));
        }
        if s.contains('\0') {
            return Err(fail("identifier cannot contain NUL character".into()));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            if !parts.is_empty() {
                match chars.next() {
                    Some('.') if chars.peek().is_none() => {
                        return Err(fail("trailing '.' in identifier".into()));
                    }
                    Some('.') => {}
                    Some(c) => {
                        return Err(fail(format!(
                            "expected '.' between identifier parts, got '{c}'"
                        )));
                    }
                    None => break,
                }
            }

            if chars.peek() == Some(&'"') {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            name.push('"');
                        }
                        Some('"') => break,
                        Some(c) => name.push(c),
                        None => return Err(fail("unclosed quoted identifier".into())),
                    }
                }
                if name.is_empty() {
                    return Err(fail("empty quoted identifier".into()));
                }
                parts.push(IdentPart::Quoted(name));
                continue;
            }

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                let valid = if name.is_empty() {
                    c == '_' || c.is_ascii_alphabetic()
                } else {
                    c == '_' || c == '$' || c.is_ascii_alphanumeric()
                };
                if !valid {
                    return Err(fail(format!("invalid character in identifier: '{c}'")));
                }
                name.push(c);
                chars.next();
            }
            if name.is_empty() {
                return Err(fail("empty identifier segment".into()));
            }
            parts.push(IdentPart::Unquoted(name));
        }

        Ok(Self { parts })
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Unquoted(s) => out.push_str(s),
                IdentPart::Quoted(s) => {
                    out.push('"');
                    out.push_str(&s.replace('"', "\"\""));
                    out.push('"');
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        assert_eq!(Ident::parse("users").unwrap().to_sql(), "users");
    }

    #[test]
    fn ident_dotted() {
        assert_eq!(Ident::parse("public.users").unwrap().to_sql(), "public.users");
    }

    #[test]
    fn ident_quoted_with_escape() {
        let ident = Ident::parse(r#""has""quote""#).unwrap();
        assert_eq!(ident.parts, vec![IdentPart::Quoted(r#"has"quote"#.into())]);
        assert_eq!(ident.to_sql(), r#""has""quote""#);
    }

    #[test]
    fn ident_mixed_quoted_unquoted() {
        let ident = Ident::parse(r#"public."UserTable".id"#).unwrap();
        assert_eq!(ident.to_sql(), r#"public."UserTable".id"#);
    }

    #[test]
    fn ident_with_dollar() {
        assert_eq!(Ident::parse("my_var$1").unwrap().to_sql(), "my_var$1");
    }

    #[test]
    fn ident_rejects_unsafe_input() {
        for input in [
            "",
            "1table",
            "my table",
            "schema..table",
            "schema.",
            r#""unclosed"#,
            "users; drop table users; --",
        ] {
            let err = Ident::parse(input).unwrap_err();
            assert!(err.is_construction(), "{input}: {err}");
        }
    }

    #[test]
    fn ident_error_names_the_input() {
        let err = Ident::parse("bad name").unwrap_err();
        assert!(err.to_string().contains("bad name"));
    }
}
