//! Filter predicates for WHERE clauses.
//!
//! A [`Filter`] is one condition: a caller-facing field name, an [`Operator`],
//! a [`FilterValue`], the [`Chain`] that joins it to the next filter and
//! optional group markers that open or close parentheses around it.
//!
//! # Example
//! ```ignore
//! use pgclause::Filter;
//!
//! // (email = $1 OR nickname = $2) AND id IN ($3, $4)
//! let filters = vec![
//!     Filter::eq("email", "a@b.com").or().group_open(),
//!     Filter::eq("nickname", "ab").group_close(),
//!     Filter::in_list("id", vec![1_i64, 2]),
//! ];
//! ```

use crate::param::Param;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tokio_postgres::types::ToSql;

/// Comparison operator of a [`Filter`].
///
/// Textual operators coming from callers are parsed with `From<&str>`, which
/// never fails: unrecognized text becomes [`Operator::Unknown`] and is
/// rejected when the WHERE clause is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Operator {
    /// `field = $n`
    Equal,
    /// `field <> $n`
    NotEqual,
    /// `field < $n`
    Less,
    /// `field <= $n`
    LessOrEqual,
    /// `field > $n`
    Greater,
    /// `field >= $n`
    GreaterOrEqual,
    /// `field IS NULL`
    Is,
    /// `field IS NOT NULL`
    IsNot,
    /// `field IS NULL`
    IsNull,
    /// `field IS NOT NULL`
    IsNotNull,
    /// `field LIKE $n`
    Like,
    /// `field NOT LIKE $n`
    NotLike,
    /// `field ILIKE $n`
    ILike,
    /// `field NOT ILIKE $n`
    NotILike,
    /// `field IN ($n, ...)`
    In,
    /// `field NOT IN ($n, ...)`
    NotIn,
    /// Bare field, rendered as-is (raw pass-through expression).
    #[default]
    Default,
    /// Operator text that matched nothing above.
    Unknown(String),
}

impl Operator {
    /// SQL token for operators that render one.
    pub fn as_sql(&self) -> Option<&'static str> {
        let token = match self {
            Operator::Equal => "=",
            Operator::NotEqual => "<>",
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::Is | Operator::IsNull => "IS NULL",
            Operator::IsNot | Operator::IsNotNull => "IS NOT NULL",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::ILike => "ILIKE",
            Operator::NotILike => "NOT ILIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Default | Operator::Unknown(_) => return None,
        };
        Some(token)
    }

    /// IN / NOT IN.
    pub fn is_list(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    /// Null checks that bind no argument.
    pub fn is_null_check(&self) -> bool {
        matches!(
            self,
            Operator::Is | Operator::IsNot | Operator::IsNull | Operator::IsNotNull
        )
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "" => Operator::Default,
            "=" | "eq" | "equal" => Operator::Equal,
            "<>" | "!=" | "ne" | "neq" | "not_equal" => Operator::NotEqual,
            "<" | "lt" | "less_than" => Operator::Less,
            "<=" | "lte" | "less_than_or_equal" => Operator::LessOrEqual,
            ">" | "gt" | "greater_than" => Operator::Greater,
            ">=" | "gte" | "greater_than_or_equal" => Operator::GreaterOrEqual,
            "is" => Operator::Is,
            "is_not" => Operator::IsNot,
            "is_null" => Operator::IsNull,
            "is_not_null" => Operator::IsNotNull,
            "like" => Operator::Like,
            "not_like" => Operator::NotLike,
            "ilike" => Operator::ILike,
            "not_ilike" => Operator::NotILike,
            "in" => Operator::In,
            "not_in" | "nin" => Operator::NotIn,
            _ => Operator::Unknown(s.to_string()),
        }
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        Operator::from(s.as_str())
    }
}

/// Boolean connective placed between two filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Chain {
    #[default]
    And,
    Or,
}

impl Chain {
    pub fn as_sql(self) -> &'static str {
        match self {
            Chain::And => "AND",
            Chain::Or => "OR",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Error returned when parsing a [`Chain`] from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseChainError(pub String);

impl fmt::Display for ParseChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid chaining key '{}', expected AND or OR", self.0)
    }
}

impl std::error::Error for ParseChainError {}

impl FromStr for Chain {
    type Err = ParseChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("and") {
            Ok(Chain::And)
        } else if s.trim().eq_ignore_ascii_case("or") {
            Ok(Chain::Or)
        } else {
            Err(ParseChainError(s.to_string()))
        }
    }
}

/// Value of a [`Filter`].
///
/// IN / NOT IN accept `List` and `Delimited`; every other operator binds a
/// `Scalar` (or `Delimited` as one text value), and `None` binds SQL `NULL`.
#[derive(Debug, Clone, Default)]
pub enum FilterValue {
    #[default]
    None,
    Scalar(Param),
    List(Vec<Param>),
    /// Comma-separated text, split into one argument per segment for IN lists.
    Delimited(String),
}

impl FilterValue {
    /// Wrap a single value.
    pub fn scalar<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        FilterValue::Scalar(Param::new(value))
    }

    /// Wrap an ordered collection.
    pub fn list<T, I>(values: I) -> Self
    where
        T: ToSql + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        FilterValue::List(values.into_iter().map(Param::new).collect())
    }

    /// Wrap comma-separated text.
    pub fn delimited(text: impl Into<String>) -> Self {
        FilterValue::Delimited(text.into())
    }
}

impl From<Param> for FilterValue {
    fn from(param: Param) -> Self {
        FilterValue::Scalar(param)
    }
}

impl From<Vec<Param>> for FilterValue {
    fn from(params: Vec<Param>) -> Self {
        FilterValue::List(params)
    }
}

/// One WHERE condition.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub field: String,
    pub operator: Operator,
    pub value: FilterValue,
    /// Connective to the next filter. `None` means AND.
    pub chain: Option<Chain>,
    /// Number of `(` emitted before this filter.
    pub group_open: usize,
    /// Number of `)` emitted after this filter.
    pub group_close: usize,
}

impl Filter {
    /// Create a filter from its parts.
    pub fn new(field: impl Into<String>, operator: impl Into<Operator>, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value,
            ..Self::default()
        }
    }

    fn scalar<T>(field: impl Into<String>, operator: Operator, value: T) -> Self
    where
        T: ToSql + Send + Sync + 'static,
    {
        Self::new(field, operator, FilterValue::scalar(value))
    }

    // ==================== Convenience constructors ====================

    /// field = value
    pub fn eq<T: ToSql + Send + Sync + 'static>(field: impl Into<String>, value: T) -> Self {
        Self::scalar(field, Operator::Equal, value)
    }

    /// field <> value
    pub fn ne<T: ToSql + Send + Sync + 'static>(field: impl Into<String>, value: T) -> Self {
        Self::scalar(field, Operator::NotEqual, value)
    }

    /// field < value
    pub fn lt<T: ToSql + Send + Sync + 'static>(field: impl Into<String>, value: T) -> Self {
        Self::scalar(field, Operator::Less, value)
    }

    /// field <= value
    pub fn lte<T: ToSql + Send + Sync + 'static>(field: impl Into<String>, value: T) -> Self {
        Self::scalar(field, Operator::LessOrEqual, value)
    }

    /// field > value
    pub fn gt<T: ToSql + Send + Sync + 'static>(field: impl Into<String>, value: T) -> Self {
        Self::scalar(field, Operator::Greater, value)
    }

    /// field >= value
    pub fn gte<T: ToSql + Send + Sync + 'static>(field: impl Into<String>, value: T) -> Self {
        Self::scalar(field, Operator::GreaterOrEqual, value)
    }

    /// field LIKE pattern
    pub fn like<T: ToSql + Send + Sync + 'static>(field: impl Into<String>, pattern: T) -> Self {
        Self::scalar(field, Operator::Like, pattern)
    }

    /// field NOT LIKE pattern
    pub fn not_like<T: ToSql + Send + Sync + 'static>(field: impl Into<String>, pattern: T) -> Self {
        Self::scalar(field, Operator::NotLike, pattern)
    }

    /// field ILIKE pattern
    pub fn ilike<T: ToSql + Send + Sync + 'static>(field: impl Into<String>, pattern: T) -> Self {
        Self::scalar(field, Operator::ILike, pattern)
    }

    /// field NOT ILIKE pattern
    pub fn not_ilike<T: ToSql + Send + Sync + 'static>(field: impl Into<String>, pattern: T) -> Self {
        Self::scalar(field, Operator::NotILike, pattern)
    }

    /// field IS NULL
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, Operator::IsNull, FilterValue::None)
    }

    /// field IS NOT NULL
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::new(field, Operator::IsNotNull, FilterValue::None)
    }

    /// field IN (values...)
    pub fn in_list<T, I>(field: impl Into<String>, values: I) -> Self
    where
        T: ToSql + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        Self::new(field, Operator::In, FilterValue::list(values))
    }

    /// field NOT IN (values...)
    pub fn not_in<T, I>(field: impl Into<String>, values: I) -> Self
    where
        T: ToSql + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        Self::new(field, Operator::NotIn, FilterValue::list(values))
    }

    /// field IN ($n, ...) with one text argument per comma-separated segment
    pub fn in_delimited(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(field, Operator::In, FilterValue::delimited(text))
    }

    /// A bare expression rendered as-is, with no argument.
    ///
    /// **Warning**: without an allow-list this bypasses SQL injection
    /// protection. Only use with trusted, hardcoded SQL strings.
    pub fn raw(expr: impl Into<String>) -> Self {
        Self::new(expr, Operator::Default, FilterValue::None)
    }

    // ==================== Modifiers ====================

    /// Join this filter to the next one with `chain`.
    pub fn chain(mut self, chain: Chain) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Join this filter to the next one with AND.
    pub fn and(self) -> Self {
        self.chain(Chain::And)
    }

    /// Join this filter to the next one with OR.
    pub fn or(self) -> Self {
        self.chain(Chain::Or)
    }

    /// Open one group before this filter.
    pub fn group_open(self) -> Self {
        self.group_open_n(1)
    }

    /// Open `n` groups before this filter.
    pub fn group_open_n(mut self, n: usize) -> Self {
        self.group_open = n;
        self
    }

    /// Close one group after this filter.
    pub fn group_close(self) -> Self {
        self.group_close_n(1)
    }

    /// Close `n` groups after this filter.
    pub fn group_close_n(mut self, n: usize) -> Self {
        self.group_close = n;
        self
    }
}

/// Allow-list mapping caller-facing field names to physical columns.
///
/// When a WHERE or ORDER BY clause is given an allow-list, every referenced
/// field must be a key of it; the mapped column is what ends up in the SQL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedColumns {
    columns: HashMap<String, String>,
}

impl AllowedColumns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `field` under its own name.
    pub fn allow(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        self.columns.insert(field.clone(), field);
        self
    }

    /// Allow `field`, rendering it as `column`.
    pub fn map(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.columns.insert(field.into(), column.into());
        self
    }

    /// Physical column for `field`, if allowed.
    pub fn resolve(&self, field: &str) -> Option<&str> {
        self.columns.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for AllowedColumns
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl From<HashMap<String, String>> for AllowedColumns {
    fn from(columns: HashMap<String, String>) -> Self {
        Self { columns }
    }
}
