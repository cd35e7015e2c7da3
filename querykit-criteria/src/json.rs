//! JSON path access in filter fields.
//!
//! A field such as `payload->status->code` names the `payload` column and
//! then walks the `status` and `code` keys of the JSON document stored in it.
//! Each key adds one level of extraction around the previous expression:
//!
//! ```rust
//! use querykit_criteria::json::FieldPath;
//! use querykit_criteria::sql::Dialect;
//!
//! let path = FieldPath::parse("payload->status->code");
//! assert_eq!(
//!     path.to_sql(Dialect::MySql),
//!     "JSON_EXTRACT(JSON_EXTRACT(payload, '$.status'), '$.code')"
//! );
//! ```

use smallvec::SmallVec;

use crate::case::to_snake_case;
use crate::sql::Dialect;

/// Separator between the column and JSON keys.
pub const PATH_SEPARATOR: &str = "->";

/// A column reference, optionally followed by JSON keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    /// The column holding the document.
    pub column: String,
    /// JSON keys, outermost first.
    pub keys: SmallVec<[String; 4]>,
}

impl FieldPath {
    /// Split a field on `->`.
    pub fn parse(field: &str) -> Self {
        let mut parts = field.split(PATH_SEPARATOR);
        let column = parts.next().unwrap_or_default().to_string();
        Self {
            column,
            keys: parts.map(str::to_string).collect(),
        }
    }

    /// Check if any JSON keys follow the column.
    pub fn is_json(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Snake-case the column while leaving JSON keys untouched.
    pub fn normalized(mut self) -> Self {
        self.column = to_snake_case(&self.column);
        self
    }

    /// Render back to `column->key->key` form.
    pub fn to_field(&self) -> String {
        let mut field = self.column.clone();
        for key in &self.keys {
            field.push_str(PATH_SEPARATOR);
            field.push_str(key);
        }
        field
    }

    /// Render the SQL expression selecting this field.
    ///
    /// A plain column is returned verbatim.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.expr_at(self.keys.len(), dialect)
    }

    fn expr_at(&self, level: usize, dialect: Dialect) -> String {
        if level == 0 {
            return self.column.clone();
        }
        let inner = self.expr_at(level - 1, dialect);
        dialect.json_extract(&inner, &self.keys[level - 1])
    }
}
