use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::FilterError;

/// Comparison operators a criterion may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "=")] Eq,
    #[serde(rename = ">=")] Gte,
    #[serde(rename = "<=")] Lte,
    #[serde(rename = "!=")] Ne,
    #[serde(rename = "LIKE")] Like,
    #[serde(rename = "ILIKE")] ILike,
}

impl FilterOp {
    pub fn to_sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Gte => ">=",
            FilterOp::Lte => "<=",
            FilterOp::Ne => "!=",
            FilterOp::Like => "LIKE",
            FilterOp::ILike => "ILIKE",
        }
    }

    /// Pattern operators bind their value wrapped in `%...%`.
    pub fn is_pattern(&self) -> bool {
        matches!(self, FilterOp::Like | FilterOp::ILike)
    }
}

impl FromStr for FilterOp {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "=" => FilterOp::Eq,
            ">=" => FilterOp::Gte,
            "<=" => FilterOp::Lte,
            "!=" => FilterOp::Ne,
            "LIKE" => FilterOp::Like,
            "ILIKE" => FilterOp::ILike,
            _ => return Err(FilterError::UnsupportedOperator(s.to_string())),
        })
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_sql())
    }
}

/// A value bound to a positional placeholder. Never interpolated into SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Decimal(Decimal),
}

impl SqlValue {
    /// Wrap the value in `%` wildcards for LIKE/ILIKE matching.
    pub fn to_pattern(&self) -> SqlValue {
        let inner = match self {
            SqlValue::Null => String::new(),
            SqlValue::Bool(b) => b.to_string(),
            SqlValue::Int(i) => i.to_string(),
            SqlValue::Text(s) => s.clone(),
            SqlValue::Decimal(d) => d.to_string(),
        };
        SqlValue::Text(format!("%{}%", inner))
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(i: i64) -> Self {
        SqlValue::Int(i)
    }
}

impl From<i32> for SqlValue {
    fn from(i: i32) -> Self {
        SqlValue::Int(i64::from(i))
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Bool(b)
    }
}

impl From<Decimal> for SqlValue {
    fn from(d: Decimal) -> Self {
        SqlValue::Decimal(d)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// Storage shape of a column, used to coerce loosely-typed update values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text { nullable: bool },
    /// Non-negative integer that fits an INTEGER column.
    Count { nullable: bool },
    /// Decimal in `[0, 1]`.
    Fraction,
}

impl ColumnKind {
    pub fn coerce(&self, field: &'static str, value: &Value) -> Result<SqlValue, FilterError> {
        let invalid = |reason: &str| FilterError::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        match (self, value) {
            (ColumnKind::Text { nullable: true }, Value::Null)
            | (ColumnKind::Count { nullable: true }, Value::Null) => Ok(SqlValue::Null),
            (_, Value::Null) => Err(invalid("cannot be null")),

            (ColumnKind::Text { .. }, Value::String(s)) => Ok(SqlValue::Text(s.clone())),
            (ColumnKind::Text { .. }, _) => Err(invalid("expected a string")),

            (ColumnKind::Count { .. }, Value::Number(n)) => {
                let i = n.as_i64().ok_or(FilterError::NotAnInteger(field))?;
                if i < 0 {
                    return Err(FilterError::Negative(field));
                }
                if i > i64::from(i32::MAX) {
                    return Err(invalid("out of range"));
                }
                Ok(SqlValue::Int(i))
            }
            (ColumnKind::Count { .. }, _) => Err(FilterError::NotAnInteger(field)),

            (ColumnKind::Fraction, Value::Number(n)) => parse_fraction(&n.to_string())
                .ok_or_else(|| invalid("must be a decimal between 0 and 1")),
            (ColumnKind::Fraction, Value::String(s)) => parse_fraction(s)
                .ok_or_else(|| invalid("must be a decimal between 0 and 1")),
            (ColumnKind::Fraction, _) => Err(invalid("must be a decimal between 0 and 1")),
        }
    }
}

fn parse_fraction(text: &str) -> Option<SqlValue> {
    let text = text.trim();
    let d = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()?;
    if d < Decimal::ZERO || d > Decimal::ONE {
        return None;
    }
    Some(SqlValue::Decimal(d.normalize()))
}

/// A field of a persisted entity that may appear in generated SQL.
///
/// Implementors are closed enums, so every column name interpolated into SQL
/// text comes from this allow-list and never from request input.
pub trait Column: Copy + fmt::Debug + PartialEq + Send + Sync + 'static {
    const ALL: &'static [Self];

    /// Logical (API) name, e.g. `numEmployees`.
    fn name(&self) -> &'static str;

    /// Physical column name, e.g. `num_employees`.
    fn column(&self) -> &'static str;

    fn kind(&self) -> ColumnKind;

    fn is_read_only(&self) -> bool {
        false
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }
}

/// A single `(field, operator, value)` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion<C: Column> {
    pub field: C,
    pub operator: FilterOp,
    pub value: SqlValue,
}

impl<C: Column> Criterion<C> {
    pub fn new(field: C, operator: FilterOp, value: impl Into<SqlValue>) -> Self {
        Self { field, operator, value: value.into() }
    }

    /// Build from a textual operator such as `"ilike "`.
    pub fn parse(field: C, operator: &str, value: impl Into<SqlValue>) -> Result<Self, FilterError> {
        Ok(Self::new(field, operator.parse()?, value))
    }

    pub fn equal(field: C, value: impl Into<SqlValue>) -> Self { Self::new(field, FilterOp::Eq, value) }
    pub fn at_least(field: C, value: impl Into<SqlValue>) -> Self { Self::new(field, FilterOp::Gte, value) }
    pub fn at_most(field: C, value: impl Into<SqlValue>) -> Self { Self::new(field, FilterOp::Lte, value) }
    pub fn not_equal(field: C, value: impl Into<SqlValue>) -> Self { Self::new(field, FilterOp::Ne, value) }
    pub fn like(field: C, value: impl Into<SqlValue>) -> Self { Self::new(field, FilterOp::Like, value) }
    pub fn ilike(field: C, value: impl Into<SqlValue>) -> Self { Self::new(field, FilterOp::ILike, value) }
}

/// Outcome of normalizing a raw filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Search<C: Column> {
    /// No recognized filter keys: fetch everything.
    All,
    Matching(Vec<Criterion<C>>),
}

/// A number from JSON or a string from a query parameter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FilterParam {
    Int(i64),
    Text(String),
}

impl FilterParam {
    /// Blank strings count as absent.
    pub fn as_integer(&self, field: &'static str) -> Result<Option<i64>, FilterError> {
        match self {
            FilterParam::Int(i) => Ok(Some(*i)),
            FilterParam::Text(s) if s.trim().is_empty() => Ok(None),
            FilterParam::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| FilterError::NotAnInteger(field)),
        }
    }
}

impl From<i64> for FilterParam {
    fn from(i: i64) -> Self {
        FilterParam::Int(i)
    }
}

impl From<&str> for FilterParam {
    fn from(s: &str) -> Self {
        FilterParam::Text(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo<C: Column> {
    pub column: C,
    pub sort: SortDirection,
}

impl<C: Column> FilterOrderInfo<C> {
    pub fn asc(column: C) -> Self {
        Self { column, sort: SortDirection::Asc }
    }
}

/// Rendered SQL text plus the values for its placeholders, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    pub clause: String,
    pub values: Vec<SqlValue>,
}

impl SqlFragment {
    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }

    /// Index of the next free placeholder after this fragment's values.
    pub fn next_param(&self) -> usize {
        self.values.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operator_parsing_trims_and_uppercases() {
        assert_eq!(" ilike ".parse::<FilterOp>().unwrap(), FilterOp::ILike);
        assert_eq!("like".parse::<FilterOp>().unwrap(), FilterOp::Like);
        assert_eq!(">=".parse::<FilterOp>().unwrap(), FilterOp::Gte);
        assert_eq!(
            "<>".parse::<FilterOp>(),
            Err(FilterError::UnsupportedOperator("<>".to_string()))
        );
    }

    #[test]
    fn pattern_wraps_value() {
        assert_eq!(SqlValue::from("c1").to_pattern(), SqlValue::from("%c1%"));
        assert_eq!(SqlValue::Int(5).to_pattern(), SqlValue::from("%5%"));
    }

    #[test]
    fn filter_param_integers() {
        assert_eq!(FilterParam::from("12").as_integer("minEmployees"), Ok(Some(12)));
        assert_eq!(FilterParam::from("  ").as_integer("minEmployees"), Ok(None));
        assert_eq!(FilterParam::from(-3).as_integer("minEmployees"), Ok(Some(-3)));
        assert_eq!(
            FilterParam::from("aaa").as_integer("minEmployees"),
            Err(FilterError::NotAnInteger("minEmployees"))
        );
    }

    #[test]
    fn filter_param_deserializes_from_number_or_string() {
        let n: FilterParam = serde_json::from_value(json!(4)).unwrap();
        let s: FilterParam = serde_json::from_value(json!("4")).unwrap();
        assert_eq!(n, FilterParam::Int(4));
        assert_eq!(s, FilterParam::Text("4".to_string()));
    }

    #[test]
    fn count_coercion() {
        let kind = ColumnKind::Count { nullable: true };
        assert_eq!(kind.coerce("salary", &json!(10)), Ok(SqlValue::Int(10)));
        assert_eq!(kind.coerce("salary", &Value::Null), Ok(SqlValue::Null));
        assert_eq!(kind.coerce("salary", &json!(-1)), Err(FilterError::Negative("salary")));
        assert_eq!(kind.coerce("salary", &json!("10")), Err(FilterError::NotAnInteger("salary")));
        assert!(ColumnKind::Count { nullable: false }.coerce("n", &Value::Null).is_err());
    }

    #[test]
    fn fraction_coercion() {
        let kind = ColumnKind::Fraction;
        assert_eq!(
            kind.coerce("equity", &json!("0.5")),
            Ok(SqlValue::Decimal(Decimal::from_str("0.5").unwrap()))
        );
        assert_eq!(kind.coerce("equity", &json!(0)), Ok(SqlValue::Decimal(Decimal::ZERO)));
        assert!(kind.coerce("equity", &json!(1.5)).is_err());
        assert!(kind.coerce("equity", &json!("-0.1")).is_err());
        assert!(kind.coerce("equity", &json!(true)).is_err());
    }
}
