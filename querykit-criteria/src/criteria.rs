//! The parsed form of a filtered, paged, ordered request.

use std::fmt::Write;

use crate::filter::Filter;

/// A group of filters combined with OR.
pub type FilterGroup = Vec<Filter>;

/// Filter groups plus paging and ordering for one query.
///
/// Groups are combined with AND, filters inside a group with OR. A group
/// never holds an `undefined` filter and is never empty.
///
/// ```rust
/// use querykit_criteria::{Criteria, Filter};
///
/// let criteria = Criteria::empty()
///     .with_group(vec![Filter::from_parts("status", "=", "open")])
///     .with_limit(20)
///     .with_order("created_at", Some("DESC"));
///
/// assert_eq!(criteria.groups().len(), 1);
/// assert_eq!(criteria.limit(), Some(20));
/// assert_eq!(criteria.order_clause().as_deref(), Some("created_at DESC"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    groups: Vec<FilterGroup>,
    limit: Option<u64>,
    offset: Option<u64>,
    order_field: Option<String>,
    order_direction: Option<String>,
}

impl Criteria {
    /// Create criteria from already-parsed parts.
    ///
    /// Undefined filters and groups left empty are dropped.
    pub fn new(
        groups: impl IntoIterator<Item = FilterGroup>,
        limit: Option<u64>,
        offset: Option<u64>,
        order_field: Option<String>,
        order_direction: Option<String>,
    ) -> Self {
        Self {
            groups: groups.into_iter().filter_map(retain_defined).collect(),
            limit,
            offset,
            order_field,
            order_direction,
        }
    }

    /// Criteria with no filters, paging or ordering.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Return a copy with one more AND-ed group appended.
    ///
    /// A group with no defined filters leaves the criteria unchanged.
    #[must_use]
    pub fn with_group(&self, group: FilterGroup) -> Self {
        let mut next = self.clone();
        if let Some(group) = retain_defined(group) {
            next.groups.push(group);
        }
        next
    }

    /// Set the maximum number of rows.
    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the number of rows to skip.
    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set the ordering field and optional direction.
    #[must_use]
    pub fn with_order(mut self, field: impl Into<String>, direction: Option<&str>) -> Self {
        self.order_field = Some(field.into());
        self.order_direction = direction.map(str::to_string);
        self
    }

    /// The filter groups in order.
    pub fn groups(&self) -> &[FilterGroup] {
        &self.groups
    }

    /// Check if any filter group is present.
    pub fn has_filters(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Maximum number of rows, if requested.
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Number of rows to skip, if requested.
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// The ordering field, if any.
    pub fn order_field(&self) -> Option<&str> {
        self.order_field.as_deref()
    }

    /// The ordering direction, if any.
    pub fn order_direction(&self) -> Option<&str> {
        self.order_direction.as_deref()
    }

    /// Render the ORDER BY body.
    ///
    /// Without a field there is no ordering, whatever the direction says.
    /// Without a direction the field is returned alone so the store applies
    /// its default.
    pub fn order_clause(&self) -> Option<String> {
        let field = self.order_field.as_deref().filter(|f| !f.is_empty())?;
        let mut clause = field.to_string();
        if let Some(direction) = self.order_direction.as_deref().filter(|d| !d.is_empty()) {
            let _ = write!(clause, " {}", direction);
        }
        Some(clause)
    }

    /// Render `LIMIT n OFFSET m` for whatever is set.
    pub fn pagination_sql(&self) -> String {
        let mut sql = String::with_capacity(32);
        if let Some(limit) = self.limit {
            let _ = write!(sql, "LIMIT {}", limit);
        }
        if let Some(offset) = self.offset {
            if !sql.is_empty() {
                sql.push(' ');
            }
            let _ = write!(sql, "OFFSET {}", offset);
        }
        sql
    }
}

fn retain_defined(group: FilterGroup) -> Option<FilterGroup> {
    let group: FilterGroup = group.into_iter().filter(|f| !f.is_undefined()).collect();
    (!group.is_empty()).then_some(group)
}
