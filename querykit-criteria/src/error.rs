//! Error types for criteria values.
//!
//! Parsing and compiling never fail as a whole: malformed input degrades to
//! an absent value or an empty fragment. These errors surface from the strict
//! `FromStr` conversions on [`Operator`](crate::Operator) and
//! [`Dialect`](crate::Dialect), and from [`is_literal`](crate::compiler::is_literal),
//! which the compiler uses to drop `IS` filters with a disallowed literal.

use thiserror::Error;

/// Result type for criteria conversions.
pub type CriteriaResult<T> = Result<T, CriteriaError>;

/// Errors produced by strict criteria conversions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CriteriaError {
    /// The text is not a known comparison operator.
    #[error("unsupported operator `{0}`")]
    UnsupportedOperator(String),

    /// The literal is not allowed after `IS`.
    #[error("literal `{0}` is not allowed after IS")]
    DisallowedLiteral(String),

    /// The text is not a known SQL dialect.
    #[error("unknown dialect `{0}`")]
    UnknownDialect(String),
}
