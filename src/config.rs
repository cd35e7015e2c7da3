//! Configuration file parsing for `querykit.toml`.
//!
//! ```toml
//! [criteria]
//! dialect = "postgresql"
//! max_filter_index = 64
//! max_filter_cells = 512
//!
//! [pool]
//! workers = 8
//!
//! [batch]
//! chunk_size = 100
//!
//! [debug]
//! log_level = "${QUERYKIT_LOG_LEVEL}"
//! ```

use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use querykit_criteria::{ConditionCompiler, CriteriaParser, Dialect};
use querykit_pool::PoolConfig;
use serde::{Deserialize, Serialize};

use crate::error::{KitError, KitResult};

static ENV_VAR: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern")
});

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KitConfig {
    /// Criteria parsing and compiling.
    #[serde(default)]
    pub criteria: CriteriaConfig,

    /// Worker pool sizing.
    #[serde(default)]
    pub pool: PoolConfig,

    /// Batch insert settings.
    #[serde(default)]
    pub batch: BatchConfig,

    /// Debug/logging settings.
    #[serde(default)]
    pub debug: DebugConfig,
}

impl KitConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> KitResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| KitError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        content.parse()
    }

    /// Parse configuration from a TOML string, expanding `${VAR}` references.
    pub fn from_toml(content: &str) -> KitResult<Self> {
        let expanded = expand_env_vars(content);
        let config: Self =
            toml::from_str(&expanded).map_err(|e| KitError::TomlError { source: e })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but cannot be used.
    pub fn validate(&self) -> KitResult<()> {
        if self.criteria.max_filter_index == 0 {
            return Err(KitError::InvalidConfig {
                key: "criteria.max_filter_index".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.criteria.max_filter_cells == 0 {
            return Err(KitError::InvalidConfig {
                key: "criteria.max_filter_cells".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.batch.chunk_size == 0 {
            return Err(KitError::InvalidConfig {
                key: "batch.chunk_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if let Some(level) = self.debug.log_level.as_deref() {
            if !matches!(
                level.to_lowercase().as_str(),
                "trace" | "debug" | "info" | "warn" | "error"
            ) {
                return Err(KitError::InvalidConfig {
                    key: "debug.log_level".to_string(),
                    message: format!("unknown level `{level}`"),
                });
            }
        }
        Ok(())
    }

    /// A parser honouring the configured bounds.
    pub fn parser(&self) -> CriteriaParser {
        CriteriaParser::new()
            .with_max_index(self.criteria.max_filter_index)
            .with_max_cells(self.criteria.max_filter_cells)
    }

    /// A compiler for the configured dialect.
    pub fn compiler(&self) -> ConditionCompiler {
        ConditionCompiler::with_dialect(self.criteria.dialect)
    }
}

impl FromStr for KitConfig {
    type Err = KitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_toml(s)
    }
}

/// `[criteria]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CriteriaConfig {
    /// Placeholder and JSON-path flavour.
    #[serde(default)]
    pub dialect: Dialect,

    /// Largest accepted group or filter index in `filters[i][j]` keys.
    #[serde(default = "default_max_filter_index")]
    pub max_filter_index: usize,

    /// Largest number of filter cells a single request may populate.
    #[serde(default = "default_max_filter_cells")]
    pub max_filter_cells: usize,
}

impl Default for CriteriaConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            max_filter_index: default_max_filter_index(),
            max_filter_cells: default_max_filter_cells(),
        }
    }
}

fn default_max_filter_index() -> usize {
    querykit_criteria::parser::DEFAULT_MAX_INDEX
}

fn default_max_filter_cells() -> usize {
    querykit_criteria::parser::DEFAULT_MAX_CELLS
}

/// `[batch]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// Records per insert statement.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_chunk_size() -> usize {
    crate::batch::DEFAULT_CHUNK_SIZE
}

/// `[debug]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Log level passed to [`logging::init_with`](crate::logging::init_with).
    #[serde(default)]
    pub log_level: Option<String>,

    /// Output format: json, pretty or compact.
    #[serde(default)]
    pub log_format: Option<String>,
}

/// Expand `${VAR}` references. Unset variables are left as written.
fn expand_env_vars(content: &str) -> String {
    ENV_VAR
        .replace_all(content, |caps: &regex_lite::Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
