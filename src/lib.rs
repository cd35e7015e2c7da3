//! # querykit
//!
//! Query-string criteria and fail-fast batch writes for SQL stores.
//!
//! querykit provides:
//! - A parser for `filters[i][j][campo|operador|valor]` style parameters
//! - A compiler from criteria to a parameterized WHERE expression, with
//!   nested JSON-path fields and per-dialect placeholders
//! - A bounded worker pool that stops on the first failed write
//! - Batch update and insert orchestration over store collaborators
//!
//! ## Quick Start
//!
//! ```rust
//! use querykit::prelude::*;
//!
//! let config = KitConfig::from_toml("[criteria]\ndialect = \"postgresql\"\n").unwrap();
//! let criteria = config.parser().parse_query(
//!     "filters[0][0][campo]=createdAt&filters[0][0][operador]=%3E%3D&filters[0][0][valor]=2024-01-01&orderBy=createdAt&order=DESC",
//! );
//!
//! let select = SelectSpec::from_criteria(&criteria, &config.compiler());
//! assert_eq!(
//!     select.to_sql("*", "events", &[] as &[&str]),
//!     "SELECT * FROM events WHERE created_at >= $1 ORDER BY created_at DESC"
//! );
//! ```
//!
//! ## Batch updates
//!
//! ```rust
//! use std::sync::Arc;
//! use querykit::prelude::*;
//!
//! struct Touch;
//!
//! #[async_trait::async_trait]
//! impl RecordUpdater<u64> for Touch {
//!     async fn update(&self, id: u64) -> Result<(), BoxError> {
//!         if id == 0 {
//!             return Err("id 0 is reserved".into());
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! assert!(update_batch(Arc::new(Touch), vec![1u64, 2, 3]).await.is_ok());
//! assert!(update_batch(Arc::new(Touch), vec![0u64]).await.is_err());
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod batch;
pub mod config;
pub mod error;
pub mod logging;
pub mod select;

/// Criteria parsing and compiling.
pub mod criteria {
    pub use querykit_criteria::*;
}

/// Fail-fast worker pool.
pub mod pool {
    pub use querykit_pool::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::batch::{BatchInserter, RecordUpdater, create_batch, create_batch_with, update_batch, update_batch_with};
    pub use crate::config::KitConfig;
    pub use crate::criteria::{ConditionCompiler, Criteria, CriteriaParser, Dialect, Filter, FilterValue};
    pub use crate::error::{KitError, KitResult};
    pub use crate::pool::{BoxError, PoolConfig, PoolError, WorkerPool};
    pub use crate::select::SelectSpec;
}

// Re-export key types at the crate root
pub use batch::{BatchInserter, RecordUpdater, create_batch, create_batch_with, update_batch, update_batch_with};
pub use config::KitConfig;
pub use criteria::{CompiledCondition, ConditionCompiler, Criteria, CriteriaParser, Dialect, Filter, FilterValue};
pub use error::{KitError, KitResult};
pub use pool::{BoxError, PoolConfig, PoolError, WorkerPool};
pub use select::SelectSpec;
