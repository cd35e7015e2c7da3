//! Fuzz target for query-string parsing.
//!
//! Feeds arbitrary query strings through the parser and the compiler.
//! Every placeholder emitted must have exactly one bind value.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_criteria_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use querykit_criteria::{ConditionCompiler, CriteriaParser, Dialect};

fuzz_target!(|data: &[u8]| {
    if let Ok(query) = std::str::from_utf8(data) {
        let criteria = CriteriaParser::new().with_max_index(32).parse_query(query);

        let compiled = ConditionCompiler::with_dialect(Dialect::PostgreSql).compile(&criteria);
        let last = format!("${}", compiled.values.len());
        if !compiled.values.is_empty() {
            assert!(compiled.expression.contains(&last));
        }

        let _ = criteria.order_clause();
        let _ = criteria.pagination_sql();
    }
});
