//! Rendering criteria into a parameterized WHERE expression.
//!
//! Filters inside a group are joined with `OR` (parenthesized when there is
//! more than one), groups are joined with `AND`. Every placeholder in the
//! expression has exactly one entry in the value list, in the same order.
//!
//! ```rust
//! use querykit_criteria::{ConditionCompiler, Criteria, Filter, FilterValue};
//!
//! let criteria = Criteria::empty()
//!     .with_group(vec![
//!         Filter::from_parts("age", ">", "18"),
//!         Filter::from_parts("age", "<", "65"),
//!     ])
//!     .with_group(vec![Filter::from_parts("active", "=", "true")]);
//!
//! let compiled = ConditionCompiler::new().compile(&criteria);
//! assert_eq!(compiled.expression, "(age > ? OR age < ?) AND active = ?");
//! assert_eq!(compiled.values[2], FilterValue::Bool(true));
//! ```
//!
//! The compiler never fails. Filters it cannot express (an unsupported
//! operator, an `IS` literal outside the allow-list) compile to nothing, so
//! the worst outcome is a shorter predicate.

use std::fmt::Write;

use tracing::{debug, trace, warn};

use crate::criteria::{Criteria, FilterGroup};
use crate::error::{CriteriaError, CriteriaResult};
use crate::filter::{Filter, FilterValue, Operator};
use crate::json::FieldPath;
use crate::sql::Dialect;

/// Literals that may follow `IS` without binding.
pub const IS_LITERALS: &[&str] = &["NULL", "NOT NULL", "TRUE", "FALSE", "UNKNOWN", "NOT TRUE", "NOT FALSE"];

/// A compiled expression and its bind values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledCondition {
    /// Boolean expression with positional placeholders.
    pub expression: String,
    /// Bind values, one per placeholder, in order.
    pub values: Vec<FilterValue>,
}

impl CompiledCondition {
    /// Check if nothing was compiled.
    pub fn is_empty(&self) -> bool {
        self.expression.is_empty()
    }

    /// Split into expression and values.
    pub fn into_parts(self) -> (String, Vec<FilterValue>) {
        (self.expression, self.values)
    }
}

/// Validate a literal for `IS`, returning its canonical spelling.
///
/// Matching ignores case and repeated inner whitespace.
pub fn is_literal(value: &str) -> CriteriaResult<&'static str> {
    let normalized = value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase();
    IS_LITERALS
        .iter()
        .copied()
        .find(|lit| *lit == normalized)
        .ok_or_else(|| CriteriaError::DisallowedLiteral(value.to_string()))
}

/// Compiles filter groups into a [`CompiledCondition`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionCompiler {
    dialect: Dialect,
}

impl ConditionCompiler {
    /// Create a compiler for the default dialect.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compiler for a specific dialect.
    pub fn with_dialect(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// The dialect in use.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Compile the filter groups of `criteria`.
    pub fn compile(&self, criteria: &Criteria) -> CompiledCondition {
        self.compile_groups(criteria.groups())
    }

    /// Compile filter groups directly.
    pub fn compile_groups(&self, groups: &[FilterGroup]) -> CompiledCondition {
        let mut values = Vec::new();
        let mut clauses = Vec::with_capacity(groups.len());

        for group in groups {
            let fragments: Vec<String> = group
                .iter()
                .filter_map(|filter| self.compile_filter(filter, &mut values))
                .collect();

            match fragments.len() {
                0 => {}
                1 => clauses.extend(fragments),
                _ => clauses.push(format!("({})", fragments.join(" OR "))),
            }
        }

        let expression = clauses.join(" AND ");
        debug!(
            dialect = %self.dialect,
            groups = groups.len(),
            params = values.len(),
            "Compiled condition"
        );
        CompiledCondition { expression, values }
    }

    /// Compile one filter, pushing its bind value if it has one.
    ///
    /// Returns `None` when the filter contributes nothing.
    pub fn compile_filter(&self, filter: &Filter, values: &mut Vec<FilterValue>) -> Option<String> {
        if filter.is_undefined() {
            return None;
        }
        let field = FieldPath::parse(&filter.field).to_sql(self.dialect);

        match &filter.operator {
            Operator::Equals if filter.is_null_marker() => {
                Some(format!("{} IS {}", field, filter.value))
            }
            op @ (Operator::Equals
            | Operator::NotEquals
            | Operator::Gt
            | Operator::Gte
            | Operator::Lt
            | Operator::Lte) => {
                let sql_op = op.as_sql()?;
                Some(self.bind(field, sql_op, filter.bind_value(), values))
            }
            Operator::Is => match is_literal(&filter.value) {
                Ok(literal) => Some(format!("{} IS {}", field, literal)),
                Err(err) => {
                    warn!(field = %filter.field, error = %err, "Dropping IS filter");
                    None
                }
            },
            Operator::Like => {
                let pattern = FilterValue::String(format!("%{}%", filter.value));
                Some(self.bind(field, "LIKE", pattern, values))
            }
            Operator::Unsupported(text) => {
                trace!(field = %filter.field, operator = %text, "Skipping unsupported operator");
                None
            }
        }
    }

    fn bind(&self, field: String, op: &str, value: FilterValue, values: &mut Vec<FilterValue>) -> String {
        values.push(value);
        let mut fragment = field;
        let _ = write!(fragment, " {} {}", op, self.dialect.placeholder(values.len()));
        fragment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compile(groups: Vec<FilterGroup>) -> CompiledCondition {
        ConditionCompiler::new().compile_groups(&groups)
    }

    fn f(field: &str, op: &str, value: &str) -> Filter {
        Filter::from_parts(field, op, value)
    }

    #[test]
    fn test_single_equals() {
        let compiled = compile(vec![vec![f("first_name", "=", "Ann")]]);
        assert_eq!(compiled.expression, "first_name = ?");
        assert_eq!(compiled.values, vec![FilterValue::from("Ann")]);
    }

    #[test]
    fn test_or_within_and_across() {
        let compiled = compile(vec![
            vec![f("age", ">", "18"), f("age", "<", "65")],
            vec![f("active", "=", "true")],
        ]);
        assert_eq!(compiled.expression, "(age > ? OR age < ?) AND active = ?");
        assert_eq!(
            compiled.values,
            vec![FilterValue::from("18"), FilterValue::from("65"), FilterValue::Bool(true)]
        );
    }

    #[test]
    fn test_null_markers_bind_nothing() {
        let compiled = compile(vec![
            vec![f("deleted_at", "=", "NULL")],
            vec![f("archived_at", "=", "NOT NULL")],
        ]);
        assert_eq!(compiled.expression, "deleted_at IS NULL AND archived_at IS NOT NULL");
        assert!(compiled.values.is_empty());
    }

    #[test]
    fn test_null_marker_is_case_sensitive() {
        let compiled = compile(vec![vec![f("deleted_at", "=", "null")]]);
        assert_eq!(compiled.expression, "deleted_at = ?");
        assert_eq!(compiled.values, vec![FilterValue::from("null")]);
    }

    #[test]
    fn test_gte_emits_gte() {
        let compiled = compile(vec![vec![f("score", ">=", "10")], vec![f("score", "<=", "20")]]);
        assert_eq!(compiled.expression, "score >= ? AND score <= ?");
    }

    #[test]
    fn test_not_equals() {
        let compiled = compile(vec![vec![f("status", "<>", "closed")]]);
        assert_eq!(compiled.expression, "status <> ?");
    }

    #[test]
    fn test_is_literal_inlined() {
        let compiled = compile(vec![vec![f("verified", "is", "true"), f("ref", "IS", "not  null")]]);
        assert_eq!(compiled.expression, "(verified IS TRUE OR ref IS NOT NULL)");
        assert!(compiled.values.is_empty());
    }

    #[test]
    fn test_is_rejects_arbitrary_text() {
        let compiled = compile(vec![vec![f("id", "IS", "NULL OR 1=1")], vec![f("a", "=", "1")]]);
        assert_eq!(compiled.expression, "a = ?");
        assert_eq!(compiled.values.len(), 1);
    }

    #[test]
    fn test_like_wraps_value() {
        let compiled = compile(vec![vec![f("name", "like", "ann")]]);
        assert_eq!(compiled.expression, "name LIKE ?");
        assert_eq!(compiled.values, vec![FilterValue::from("%ann%")]);
    }

    #[test]
    fn test_like_does_not_bind_booleans() {
        let compiled = compile(vec![vec![f("flag", "LIKE", "true")]]);
        assert_eq!(compiled.values, vec![FilterValue::from("%true%")]);
    }

    #[test]
    fn test_unsupported_operator_is_dropped() {
        let compiled = compile(vec![vec![f("a", "!=", "1"), f("b", "=", "2")]]);
        assert_eq!(compiled.expression, "b = ?");
        assert_eq!(compiled.values, vec![FilterValue::from("2")]);
    }

    #[test]
    fn test_group_compiling_to_nothing_is_skipped() {
        let compiled = compile(vec![vec![f("a", "~", "1")], vec![f("b", "=", "2")]]);
        assert_eq!(compiled.expression, "b = ?");
    }

    #[test]
    fn test_undefined_never_compiles() {
        let compiled = compile(vec![vec![f("a", "=", "undefined")]]);
        assert!(compiled.is_empty());
        assert!(compiled.values.is_empty());
    }

    #[test]
    fn test_json_path_field() {
        let compiled = compile(vec![vec![f("payload->status->code", "=", "200")]]);
        assert_eq!(
            compiled.expression,
            "JSON_EXTRACT(JSON_EXTRACT(payload, '$.status'), '$.code') = ?"
        );
    }

    #[test]
    fn test_postgres_numbers_placeholders_in_order() {
        let compiler = ConditionCompiler::with_dialect(Dialect::PostgreSql);
        let groups = vec![
            vec![f("a", "=", "1"), f("b", "=", "NULL"), f("c", "like", "x")],
            vec![f("d", "<", "4")],
        ];
        let compiled = compiler.compile_groups(&groups);
        assert_eq!(compiled.expression, "(a = $1 OR b IS NULL OR c LIKE $2) AND d < $3");
        assert_eq!(compiled.values.len(), 3);
    }

    #[test]
    fn test_compiling_is_idempotent() {
        let criteria = Criteria::empty()
            .with_group(vec![f("a", "=", "1"), f("b", "LIKE", "x")])
            .with_group(vec![f("c", "IS", "NULL")]);
        let compiler = ConditionCompiler::new();
        assert_eq!(compiler.compile(&criteria), compiler.compile(&criteria));
    }

    #[test]
    fn test_is_literal_allow_list() {
        assert_eq!(is_literal("null"), Ok("NULL"));
        assert_eq!(is_literal(" Not Null "), Ok("NOT NULL"));
        assert_eq!(is_literal("1"), Err(CriteriaError::DisallowedLiteral("1".to_string())));
    }
}
