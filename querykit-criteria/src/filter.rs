//! Filter types for building WHERE clauses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CriteriaError;

/// Value marking a filter whose parameter was never supplied.
pub const UNDEFINED: &str = "undefined";

/// A value bound positionally next to a compiled expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// String value.
    String(String),
}

impl FilterValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// Comparison operator of a single filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Equals,
    /// `<>`
    NotEquals,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `IS` with an inlined literal.
    Is,
    /// `LIKE` with the value wrapped in `%`.
    Like,
    /// Any operator text this crate does not understand.
    ///
    /// Kept verbatim so a filter round-trips; compiles to nothing.
    Unsupported(String),
}

impl Operator {
    /// Parse operator text leniently, keeping unknown text as `Unsupported`.
    ///
    /// `IS` and `LIKE` are accepted in all-upper or all-lower case only.
    pub fn parse(s: &str) -> Self {
        match s {
            "=" => Self::Equals,
            "<>" => Self::NotEquals,
            ">" => Self::Gt,
            ">=" => Self::Gte,
            "<" => Self::Lt,
            "<=" => Self::Lte,
            "IS" | "is" => Self::Is,
            "LIKE" | "like" => Self::Like,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Get the SQL token for a supported operator.
    pub fn as_sql(&self) -> Option<&'static str> {
        match self {
            Self::Equals => Some("="),
            Self::NotEquals => Some("<>"),
            Self::Gt => Some(">"),
            Self::Gte => Some(">="),
            Self::Lt => Some("<"),
            Self::Lte => Some("<="),
            Self::Is => Some("IS"),
            Self::Like => Some("LIKE"),
            Self::Unsupported(_) => None,
        }
    }

    /// Check if this operator compares against a bound value.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Equals | Self::NotEquals | Self::Gt | Self::Gte | Self::Lt | Self::Lte
        )
    }

    /// Check if this operator is understood by the compiler.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl Default for Operator {
    fn default() -> Self {
        Self::Unsupported(String::new())
    }
}

impl FromStr for Operator {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::parse(s) {
            Self::Unsupported(text) => Err(CriteriaError::UnsupportedOperator(text)),
            op => Ok(op),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported(text) => f.write_str(text),
            op => f.write_str(op.as_sql().unwrap_or_default()),
        }
    }
}

/// A single `field operator value` predicate.
///
/// The field may address a JSON document with `->` separated keys, for
/// example `payload->status->code`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Filter {
    /// Column name, optionally followed by `->` JSON keys.
    pub field: String,
    /// Comparison operator.
    pub operator: Operator,
    /// Raw value text as it arrived.
    pub value: String,
}

impl Filter {
    /// Create a new filter.
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Create a filter from raw operator text.
    pub fn from_parts(
        field: impl Into<String>,
        operator: &str,
        value: impl Into<String>,
    ) -> Self {
        Self::new(field, Operator::parse(operator), value)
    }

    /// Check if this filter stands for a parameter that was never supplied.
    pub fn is_undefined(&self) -> bool {
        self.value == UNDEFINED
    }

    /// Check if the value is one of the `NULL` / `NOT NULL` markers.
    ///
    /// Matching is case-sensitive.
    pub fn is_null_marker(&self) -> bool {
        self.value == "NULL" || self.value == "NOT NULL"
    }

    /// The value as it would be bound: `true`/`false` become booleans.
    pub fn bind_value(&self) -> FilterValue {
        match self.value.as_str() {
            "true" => FilterValue::Bool(true),
            "false" => FilterValue::Bool(false),
            other => FilterValue::String(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_value_from() {
        assert_eq!(FilterValue::from("hello"), FilterValue::String("hello".to_string()));
        assert_eq!(FilterValue::from(true), FilterValue::Bool(true));
        assert_eq!(FilterValue::from(None::<&str>), FilterValue::Null);
    }

    #[test]
    fn test_operator_parse() {
        assert_eq!(Operator::parse(">="), Operator::Gte);
        assert_eq!(Operator::parse("like"), Operator::Like);
        assert_eq!(Operator::parse("Is"), Operator::Unsupported("Is".to_string()));
    }

    #[test]
    fn test_operator_from_str_is_strict() {
        assert_eq!("<>".parse::<Operator>(), Ok(Operator::NotEquals));
        assert_eq!(
            "!=".parse::<Operator>(),
            Err(CriteriaError::UnsupportedOperator("!=".to_string()))
        );
    }

    #[test]
    fn test_operator_display_round_trips_text() {
        assert_eq!(Operator::Gte.to_string(), ">=");
        assert_eq!(Operator::parse("~").to_string(), "~");
    }

    #[test]
    fn test_bind_value_booleans() {
        assert_eq!(Filter::from_parts("active", "=", "true").bind_value(), FilterValue::Bool(true));
        assert_eq!(Filter::from_parts("active", "=", "false").bind_value(), FilterValue::Bool(false));
        assert_eq!(
            Filter::from_parts("active", "=", "True").bind_value(),
            FilterValue::String("True".to_string())
        );
    }

    #[test]
    fn test_markers() {
        assert!(Filter::from_parts("a", "=", "undefined").is_undefined());
        assert!(Filter::from_parts("a", "=", "NOT NULL").is_null_marker());
        assert!(!Filter::from_parts("a", "=", "null").is_null_marker());
    }

    #[test]
    fn test_default_filter_is_unsupported() {
        let filter = Filter::default();
        assert!(!filter.operator.is_supported());
        assert!(!filter.is_undefined());
    }
}
