//! Building [`Criteria`] from decoded query parameters.
//!
//! Recognised keys:
//!
//! | Key                         | Meaning                                   |
//! |-----------------------------|-------------------------------------------|
//! | `filters[i][j][campo]`      | field of filter `j` in group `i`          |
//! | `filters[i][j][operador]`   | operator of filter `j` in group `i`       |
//! | `filters[i][j][valor]`      | value of filter `j` in group `i`          |
//! | `limit`, `offset`           | paging, non-negative integers             |
//! | `orderBy`, `order`          | ordering field and direction              |
//!
//! Everything else is ignored. Malformed numbers are treated as absent.
//!
//! Two bounds keep hostile input cheap: indices above the index bound are
//! ignored, and so is any key that would grow the filter matrix past the
//! cell bound. Which key hits the cell bound first follows map iteration
//! order.
//!
//! ```rust
//! use querykit_criteria::CriteriaParser;
//!
//! let criteria = CriteriaParser::new().parse_query(
//!     "filters[0][0][campo]=firstName&filters[0][0][operador]==&filters[0][0][valor]=Ann&limit=10",
//! );
//! assert_eq!(criteria.groups()[0][0].field, "first_name");
//! assert_eq!(criteria.limit(), Some(10));
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::{debug, trace};

use crate::criteria::{Criteria, FilterGroup};
use crate::filter::{Filter, Operator};
use crate::json::FieldPath;

/// Default upper bound on group and filter indices.
pub const DEFAULT_MAX_INDEX: usize = 1024;

/// Default upper bound on filter cells across all groups.
pub const DEFAULT_MAX_CELLS: usize = 4096;

static FILTER_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^filters\[(\d+)\]\[(\d+)\]\[([A-Za-z_]+)\]$").expect("valid filter key pattern")
});

/// Filter attribute addressed by a `filters[i][j][attr]` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attribute {
    Field,
    Operator,
    Value,
}

impl Attribute {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "campo" => Some(Self::Field),
            "operador" => Some(Self::Operator),
            "valor" => Some(Self::Value),
            _ => None,
        }
    }
}

/// Builds [`Criteria`] from a string multi-map.
#[derive(Debug, Clone)]
pub struct CriteriaParser {
    max_index: usize,
    max_cells: usize,
}

impl Default for CriteriaParser {
    fn default() -> Self {
        Self {
            max_index: DEFAULT_MAX_INDEX,
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

impl CriteriaParser {
    /// Create a parser with the default bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the largest group or filter index that is still accepted.
    #[must_use]
    pub fn with_max_index(mut self, max_index: usize) -> Self {
        self.max_index = max_index;
        self
    }

    /// Set how many filter cells the matrix may hold in total.
    ///
    /// Cells include the default filters padding a row up to a position.
    #[must_use]
    pub fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = max_cells;
        self
    }

    /// Parse an url-encoded query string such as `a=1&b=2`.
    pub fn parse_query(&self, query: &str) -> Criteria {
        let mut params: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            params.entry(key.into_owned()).or_default().push(value.into_owned());
        }
        self.parse(&params)
    }

    /// Parse a decoded multi-map of query parameters.
    pub fn parse<K, V, S>(&self, params: &HashMap<K, V>) -> Criteria
    where
        K: AsRef<str>,
        V: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut matrix = FilterMatrix::new(self.max_cells);
        let mut limit = None;
        let mut offset = None;
        let mut order = None;
        let mut order_by = None;

        for (key, values) in params {
            let key = key.as_ref();
            let values = values.as_ref();
            match key {
                "limit" => limit = first(values).and_then(parse_count),
                "offset" => offset = first(values).and_then(parse_count),
                "order" => order = first(values).map(str::to_string),
                "orderBy" => order_by = first(values).map(crate::case::to_snake_case),
                _ => self.apply_filter_key(&mut matrix, key, values),
            }
        }

        let criteria = Criteria::new(matrix.rows, limit, offset, order_by, order);
        debug!(
            groups = criteria.groups().len(),
            limit = ?criteria.limit(),
            offset = ?criteria.offset(),
            "Parsed criteria"
        );
        criteria
    }

    fn apply_filter_key<S: AsRef<str>>(&self, matrix: &mut FilterMatrix, key: &str, values: &[S]) {
        let Some(caps) = FILTER_KEY.captures(key) else {
            trace!(key, "Ignoring unrecognised parameter");
            return;
        };
        let (Ok(group), Ok(position)) = (caps[1].parse::<usize>(), caps[2].parse::<usize>()) else {
            trace!(key, "Ignoring filter key with unparseable index");
            return;
        };
        if group > self.max_index || position > self.max_index {
            trace!(key, max_index = self.max_index, "Ignoring filter key beyond index bound");
            return;
        }
        let Some(attribute) = Attribute::parse(&caps[3]) else {
            trace!(key, "Ignoring unknown filter attribute");
            return;
        };

        if values.is_empty() {
            return;
        }
        let max_cells = matrix.max_cells;
        let Some(filter) = matrix.cell_mut(group, position) else {
            trace!(key, max_cells, "Ignoring filter key beyond cell bound");
            return;
        };

        for value in values {
            let value = value.as_ref();
            match attribute {
                Attribute::Field => filter.field = FieldPath::parse(value).normalized().to_field(),
                Attribute::Operator => filter.operator = Operator::parse(value),
                Attribute::Value => filter.value = value.to_string(),
            }
        }
    }
}

/// Dense group matrix with a bound on the total number of cells.
struct FilterMatrix {
    rows: Vec<FilterGroup>,
    cells: usize,
    max_cells: usize,
}

impl FilterMatrix {
    fn new(max_cells: usize) -> Self {
        Self {
            rows: Vec::new(),
            cells: 0,
            max_cells,
        }
    }

    /// Grow to reach `(group, position)`, or `None` if that would exceed
    /// the cell bound.
    fn cell_mut(&mut self, group: usize, position: usize) -> Option<&mut Filter> {
        let width = self.rows.get(group).map_or(0, Vec::len);
        let added = (position + 1).saturating_sub(width);
        if self.cells + added > self.max_cells {
            return None;
        }

        if self.rows.len() <= group {
            self.rows.resize_with(group + 1, Vec::new);
        }
        let row = &mut self.rows[group];
        if row.len() <= position {
            row.resize_with(position + 1, Filter::default);
        }
        self.cells += added;
        Some(&mut row[position])
    }
}

fn first<S: AsRef<str>>(values: &[S]) -> Option<&str> {
    values.first().map(AsRef::as_ref)
}

fn parse_count(value: &str) -> Option<u64> {
    value.parse().ok()
}
