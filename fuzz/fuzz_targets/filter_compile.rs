//! Fuzz target for compiling filter groups.
//!
//! Generates arbitrary filter matrices and checks that compiling never
//! panics, is deterministic, and binds one value per `?`.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_filter_compile
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use querykit_criteria::{ConditionCompiler, Criteria, Filter};

/// A fuzzable operator, biased towards the supported ones.
#[derive(Debug, Arbitrary)]
enum FuzzOperator {
    Equals,
    NotEquals,
    Gt,
    Gte,
    Lt,
    Lte,
    Is,
    Like,
    Other(String),
}

impl FuzzOperator {
    fn as_str(&self) -> &str {
        match self {
            FuzzOperator::Equals => "=",
            FuzzOperator::NotEquals => "<>",
            FuzzOperator::Gt => ">",
            FuzzOperator::Gte => ">=",
            FuzzOperator::Lt => "<",
            FuzzOperator::Lte => "<=",
            FuzzOperator::Is => "IS",
            FuzzOperator::Like => "LIKE",
            FuzzOperator::Other(op) => op,
        }
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzFilter {
    field: String,
    operator: FuzzOperator,
    value: String,
}

fuzz_target!(|groups: Vec<Vec<FuzzFilter>>| {
    let criteria = groups.into_iter().fold(Criteria::empty(), |criteria, group| {
        criteria.with_group(
            group
                .into_iter()
                .map(|f| Filter::from_parts(f.field, f.operator.as_str(), f.value))
                .collect(),
        )
    });

    let compiler = ConditionCompiler::new();
    let compiled = compiler.compile(&criteria);
    assert_eq!(compiled, compiler.compile(&criteria));

    // field names and IS literals are not escaped, so only bound for well-formed input
    if criteria
        .groups()
        .iter()
        .flatten()
        .all(|f| !f.field.contains('?') && !f.value.contains('?'))
    {
        assert_eq!(compiled.expression.matches('?').count(), compiled.values.len());
    }
});
