//! SQL dialect details needed by the compiler.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CriteriaError;

/// Target dialect, deciding placeholders and the JSON extraction function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// MySQL / MariaDB: `?` and `JSON_EXTRACT(expr, '$.key')`.
    #[default]
    #[serde(alias = "mariadb")]
    MySql,
    /// SQLite: `?` and `json_extract(expr, '$.key')`.
    #[serde(alias = "sqlite3")]
    Sqlite,
    /// PostgreSQL: `$n` and `jsonb_extract_path(expr, 'key')`.
    #[serde(alias = "postgres")]
    PostgreSql,
}

impl Dialect {
    /// Get the placeholder for the 1-based parameter `index`.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::PostgreSql => format!("${}", index),
            Self::MySql | Self::Sqlite => "?".to_string(),
        }
    }

    /// Wrap `expr` in one level of JSON key extraction.
    pub fn json_extract(&self, expr: &str, key: &str) -> String {
        let key = escape_literal(key);
        match self {
            Self::MySql => format!("JSON_EXTRACT({}, '$.{}')", expr, key),
            Self::Sqlite => format!("json_extract({}, '$.{}')", expr, key),
            Self::PostgreSql => format!("jsonb_extract_path({}, '{}')", expr, key),
        }
    }

    /// Name used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
            Self::PostgreSql => "postgresql",
        }
    }
}

impl FromStr for Dialect {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "postgresql" | "postgres" => Ok(Self::PostgreSql),
            _ => Err(CriteriaError::UnknownDialect(s.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Escape a string for use inside a single-quoted SQL literal.
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}
