//! Error types for configuration and batch writes.

use miette::Diagnostic;
use querykit_pool::{BoxError, PoolError};
use thiserror::Error;

/// Result type for querykit operations.
pub type KitResult<T> = Result<T, KitError>;

/// Errors surfaced by the querykit facade.
#[derive(Error, Debug, Diagnostic)]
pub enum KitError {
    /// Error reading a configuration file.
    #[error("failed to read config file: {path}")]
    #[diagnostic(code(querykit::config::io_error))]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for [`KitConfig`](crate::KitConfig).
    #[error("invalid config file")]
    #[diagnostic(code(querykit::config::toml_error))]
    TomlError {
        #[source]
        source: toml::de::Error,
    },

    /// A configuration value is out of range.
    #[error("invalid config value for `{key}`: {message}")]
    #[diagnostic(code(querykit::config::invalid_value))]
    InvalidConfig { key: String, message: String },

    /// A batch update stopped on a failed record.
    ///
    /// `source` is the first failure; `failed` counts every failure observed.
    #[error("batch update failed ({failed} failed record(s))")]
    #[diagnostic(
        code(querykit::batch::update_failed),
        help("records already written are not rolled back")
    )]
    BatchUpdate {
        failed: usize,
        #[source]
        source: PoolError,
    },

    /// A chunk of a batch insert failed.
    #[error("batch insert failed at chunk {chunk}")]
    #[diagnostic(code(querykit::batch::insert_failed))]
    BatchInsert {
        chunk: usize,
        #[source]
        source: BoxError,
    },

    /// The pool refused work without recording a failure.
    #[error(transparent)]
    #[diagnostic(code(querykit::batch::pool))]
    Pool(#[from] PoolError),
}

impl KitError {
    /// Check if this error came from a batch write.
    pub fn is_batch_failure(&self) -> bool {
        matches!(self, Self::BatchUpdate { .. } | Self::BatchInsert { .. } | Self::Pool(_))
    }
}
