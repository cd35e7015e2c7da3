//! The value handed to a query-issuing collaborator.
//!
//! A [`SelectSpec`] carries the compiled WHERE expression with its bind
//! values, plus ordering and pagination from the [`Criteria`]. Caller-supplied
//! raw conditions are ANDed after the compiled filters.
//!
//! ```rust
//! use querykit::{ConditionCompiler, CriteriaParser, SelectSpec};
//!
//! let criteria = CriteriaParser::new()
//!     .parse_query("filters[0][0][campo]=age&filters[0][0][operador]=>&filters[0][0][valor]=18&limit=10");
//! let select = SelectSpec::from_criteria(&criteria, &ConditionCompiler::new())
//!     .with_conditions(&["tenant_id = 7"]);
//!
//! assert_eq!(
//!     select.to_sql("id, name", "users", &[] as &[&str]),
//!     "SELECT id, name FROM users WHERE (age > ?) AND (tenant_id = 7) LIMIT 10"
//! );
//! ```

use std::fmt::Write;

use querykit_criteria::{ConditionCompiler, Criteria, FilterValue};

/// A compiled query ready for execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectSpec {
    expression: String,
    values: Vec<FilterValue>,
    order: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SelectSpec {
    /// Compile `criteria` with `compiler`.
    pub fn from_criteria(criteria: &Criteria, compiler: &ConditionCompiler) -> Self {
        let (expression, values) = compiler.compile(criteria).into_parts();
        Self {
            expression,
            values,
            order: criteria.order_clause(),
            limit: criteria.limit(),
            offset: criteria.offset(),
        }
    }

    /// AND extra raw conditions onto the expression.
    ///
    /// Produces `(<expr>) AND (<c1> AND <c2>)`, or just `(<c1> AND <c2>)`
    /// when nothing was compiled. Conditions are trusted SQL and bind nothing.
    #[must_use]
    pub fn with_conditions<S: AsRef<str>>(mut self, conditions: &[S]) -> Self {
        let conditions: Vec<&str> = conditions
            .iter()
            .map(AsRef::as_ref)
            .filter(|c| !c.trim().is_empty())
            .collect();
        if conditions.is_empty() {
            return self;
        }

        let mut expression = String::with_capacity(self.expression.len() + 64);
        if !self.expression.is_empty() {
            let _ = write!(expression, "({}) AND ", self.expression);
        }
        let _ = write!(expression, "({})", conditions.join(" AND "));
        self.expression = expression;
        self
    }

    /// The WHERE body, if any.
    pub fn where_clause(&self) -> Option<&str> {
        (!self.expression.is_empty()).then_some(self.expression.as_str())
    }

    /// Bind values in placeholder order.
    pub fn values(&self) -> &[FilterValue] {
        &self.values
    }

    /// The ORDER BY body, if any.
    pub fn order(&self) -> Option<&str> {
        self.order.as_deref()
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Render a full statement.
    ///
    /// `select` and `from` are taken verbatim, each join is appended as
    /// written.
    pub fn to_sql<J: AsRef<str>>(&self, select: &str, from: &str, joins: &[J]) -> String {
        let mut sql = String::with_capacity(64 + self.expression.len());
        let select = if select.trim().is_empty() { "*" } else { select };
        let _ = write!(sql, "SELECT {} FROM {}", select, from);

        for join in joins {
            let _ = write!(sql, " {}", join.as_ref());
        }
        if let Some(expression) = self.where_clause() {
            let _ = write!(sql, " WHERE {}", expression);
        }
        if let Some(order) = &self.order {
            let _ = write!(sql, " ORDER BY {}", order);
        }
        if let Some(limit) = self.limit {
            let _ = write!(sql, " LIMIT {}", limit);
        }
        if let Some(offset) = self.offset {
            let _ = write!(sql, " OFFSET {}", offset);
        }
        sql
    }

    /// Split into expression and values.
    pub fn into_parts(self) -> (String, Vec<FilterValue>) {
        (self.expression, self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use querykit_criteria::{Dialect, Filter};

    fn adults() -> Criteria {
        Criteria::empty().with_group(vec![Filter::from_parts("age", ">", "18")])
    }

    #[test]
    fn test_from_criteria() {
        let criteria = adults().with_limit(5).with_offset(10).with_order("name", Some("DESC"));
        let select = SelectSpec::from_criteria(&criteria, &ConditionCompiler::new());

        assert_eq!(select.where_clause(), Some("age > ?"));
        assert_eq!(select.values(), &[FilterValue::from("18")]);
        assert_eq!(select.order(), Some("name DESC"));
        assert_eq!(select.limit(), Some(5));
        assert_eq!(select.offset(), Some(10));
    }

    #[test]
    fn test_conditions_without_filters() {
        let select = SelectSpec::from_criteria(&Criteria::empty(), &ConditionCompiler::new())
            .with_conditions(&["a = 1", "b = 2"]);
        assert_eq!(select.where_clause(), Some("(a = 1 AND b = 2)"));
        assert!(select.values().is_empty());
    }

    #[test]
    fn test_conditions_with_filters() {
        let select = SelectSpec::from_criteria(&adults(), &ConditionCompiler::new())
            .with_conditions(&["deleted = 0"]);
        assert_eq!(select.where_clause(), Some("(age > ?) AND (deleted = 0)"));
    }

    #[test]
    fn test_blank_conditions_ignored() {
        let select = SelectSpec::from_criteria(&adults(), &ConditionCompiler::new())
            .with_conditions(&["", "  "]);
        assert_eq!(select.where_clause(), Some("age > ?"));
    }

    #[test]
    fn test_to_sql_with_joins() {
        let criteria = adults().with_order("u.name", None);
        let select = SelectSpec::from_criteria(&criteria, &ConditionCompiler::with_dialect(Dialect::PostgreSql));
        assert_eq!(
            select.to_sql("u.*", "users u", &["JOIN teams t ON t.id = u.team_id"]),
            "SELECT u.* FROM users u JOIN teams t ON t.id = u.team_id WHERE age > $1 ORDER BY u.name"
        );
    }

    #[test]
    fn test_to_sql_empty() {
        let select = SelectSpec::default();
        assert_eq!(select.to_sql("", "users", &[] as &[&str]), "SELECT * FROM users");
        assert_eq!(select.where_clause(), None);
    }
}
