//! Integration tests for parsing and compiling criteria.
//!
//! These tests drive the public surface end to end:
//! - Query-string parsing into criteria
//! - Compiling to expressions and bind values
//! - Building select statements

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use querykit::prelude::*;

fn params(pairs: &[(&str, &str)]) -> HashMap<String, Vec<String>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in pairs {
        map.entry((*key).to_string()).or_default().push((*value).to_string());
    }
    map
}

/// camelCase field names reach the store as snake_case
#[test]
fn test_single_filter_snake_cased() {
    let criteria = CriteriaParser::new().parse(&params(&[
        ("filters[0][0][campo]", "firstName"),
        ("filters[0][0][operador]", "="),
        ("filters[0][0][valor]", "Ann"),
    ]));

    let compiled = ConditionCompiler::new().compile(&criteria);
    assert_eq!(compiled.expression, "first_name = ?");
    assert_eq!(compiled.values, vec![FilterValue::from("Ann")]);
}

/// Filters in a group are ORed, groups are ANDed
#[test]
fn test_groups_or_within_and_across() {
    let criteria = CriteriaParser::new().parse(&params(&[
        ("filters[0][0][campo]", "age"),
        ("filters[0][0][operador]", ">"),
        ("filters[0][0][valor]", "18"),
        ("filters[0][1][campo]", "age"),
        ("filters[0][1][operador]", "<"),
        ("filters[0][1][valor]", "65"),
        ("filters[1][0][campo]", "active"),
        ("filters[1][0][operador]", "="),
        ("filters[1][0][valor]", "true"),
    ]));

    let compiled = ConditionCompiler::new().compile(&criteria);
    assert_eq!(compiled.expression, "(age > ? OR age < ?) AND active = ?");
    assert_eq!(
        compiled.values,
        vec![
            FilterValue::from("18"),
            FilterValue::from("65"),
            FilterValue::Bool(true),
        ]
    );
}

#[test]
fn test_null_marker_binds_nothing() {
    let criteria = CriteriaParser::new().parse_query(
        "filters[0][0][campo]=deletedAt&filters[0][0][operador]==&filters[0][0][valor]=NULL",
    );
    let compiled = ConditionCompiler::new().compile(&criteria);
    assert_eq!(compiled.expression, "deleted_at IS NULL");
    assert!(compiled.values.is_empty());
}

#[test]
fn test_undefined_filters_vanish() {
    let criteria = CriteriaParser::new().parse(&params(&[
        ("filters[0][0][campo]", "name"),
        ("filters[0][0][operador]", "="),
        ("filters[0][0][valor]", "undefined"),
        ("filters[1][0][campo]", "name"),
        ("filters[1][0][operador]", "LIKE"),
        ("filters[1][0][valor]", "bo"),
    ]));

    assert_eq!(criteria.groups().len(), 1);
    let compiled = ConditionCompiler::new().compile(&criteria);
    assert_eq!(compiled.expression, "name LIKE ?");
    assert_eq!(compiled.values, vec![FilterValue::from("%bo%")]);
}

#[test]
fn test_nested_json_path() {
    let criteria = CriteriaParser::new().parse(&params(&[
        ("filters[0][0][campo]", "payload->status->code"),
        ("filters[0][0][operador]", "="),
        ("filters[0][0][valor]", "200"),
    ]));

    let compiled = ConditionCompiler::new().compile(&criteria);
    assert_eq!(
        compiled.expression,
        "JSON_EXTRACT(JSON_EXTRACT(payload, '$.status'), '$.code') = ?"
    );
}

#[test]
fn test_compiling_is_idempotent() {
    let criteria = CriteriaParser::new().parse_query(
        "filters[0][0][campo]=a&filters[0][0][operador]=%3C%3E&filters[0][0][valor]=1\
         &filters[0][1][campo]=b&filters[0][1][operador]=IS&filters[0][1][valor]=not null",
    );
    let compiler = ConditionCompiler::new();
    assert_eq!(compiler.compile(&criteria), compiler.compile(&criteria));
}

#[test]
fn test_rejected_is_literal_binds_nothing() {
    let criteria = Criteria::empty()
        .with_group(vec![Filter::from_parts("flag", "IS", "1; DROP TABLE users")])
        .with_group(vec![Filter::from_parts("id", "=", "3")]);

    let compiled = ConditionCompiler::new().compile(&criteria);
    assert_eq!(compiled.expression, "id = ?");
    assert_eq!(compiled.values, vec![FilterValue::from("3")]);
}

#[test]
fn test_postgres_select_statement() {
    let config = KitConfig::from_toml("[criteria]\ndialect = \"postgresql\"\n").unwrap();
    let criteria = config.parser().parse_query(
        "filters[0][0][campo]=status&filters[0][0][operador]==&filters[0][0][valor]=open\
         &filters[0][1][campo]=status&filters[0][1][operador]==&filters[0][1][valor]=pending\
         &filters[1][0][campo]=ownerId&filters[1][0][operador]=%3E%3D&filters[1][0][valor]=10\
         &limit=20&offset=40&orderBy=updatedAt&order=ASC",
    );

    let select = SelectSpec::from_criteria(&criteria, &config.compiler())
        .with_conditions(&["t.archived = false"]);

    assert_eq!(
        select.to_sql("t.*", "tickets t", &[] as &[&str]),
        "SELECT t.* FROM tickets t \
         WHERE ((status = $1 OR status = $2) AND owner_id >= $3) AND (t.archived = false) \
         ORDER BY updated_at ASC LIMIT 20 OFFSET 40"
    );
    assert_eq!(select.values().len(), 3);
}

#[test]
fn test_malformed_pagination_is_absent() {
    let criteria = CriteriaParser::new().parse_query("limit=ten&offset=-5&order=DESC");
    assert_eq!(criteria.limit(), None);
    assert_eq!(criteria.offset(), None);
    assert_eq!(criteria.order_clause(), None);
}
