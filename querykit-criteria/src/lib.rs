//! # querykit-criteria
//!
//! Declarative filtering for querykit.
//!
//! This crate turns decoded query parameters into a [`Criteria`] and renders
//! a criteria into a parameterized condition:
//! - [`CriteriaParser`] reads `filters[i][j][campo|operador|valor]`, `limit`,
//!   `offset`, `order` and `orderBy`
//! - [`ConditionCompiler`] produces the expression and its ordered bind values
//! - [`json::FieldPath`] expands `column->key->key` into nested JSON extraction
//!
//! ## Parsing and compiling
//!
//! ```rust
//! use std::collections::HashMap;
//! use querykit_criteria::{ConditionCompiler, CriteriaParser, FilterValue};
//!
//! let mut params: HashMap<String, Vec<String>> = HashMap::new();
//! params.insert("filters[0][0][campo]".into(), vec!["firstName".into()]);
//! params.insert("filters[0][0][operador]".into(), vec!["=".into()]);
//! params.insert("filters[0][0][valor]".into(), vec!["Ann".into()]);
//!
//! let criteria = CriteriaParser::new().parse(&params);
//! let compiled = ConditionCompiler::new().compile(&criteria);
//!
//! assert_eq!(compiled.expression, "first_name = ?");
//! assert_eq!(compiled.values, vec![FilterValue::from("Ann")]);
//! ```
//!
//! ## Dialects
//!
//! ```rust
//! use querykit_criteria::{ConditionCompiler, Criteria, Filter};
//! use querykit_criteria::sql::Dialect;
//!
//! let criteria = Criteria::empty()
//!     .with_group(vec![Filter::from_parts("payload->status", "=", "done")]);
//! let compiled = ConditionCompiler::with_dialect(Dialect::PostgreSql).compile(&criteria);
//! assert_eq!(compiled.expression, "jsonb_extract_path(payload, 'status') = $1");
//! ```

pub mod case;
pub mod compiler;
pub mod criteria;
pub mod error;
pub mod filter;
pub mod json;
pub mod parser;
pub mod sql;

pub use compiler::{CompiledCondition, ConditionCompiler};
pub use criteria::{Criteria, FilterGroup};
pub use error::{CriteriaError, CriteriaResult};
pub use filter::{Filter, FilterValue, Operator, UNDEFINED};
pub use parser::CriteriaParser;
pub use sql::Dialect;
