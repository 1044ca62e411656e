#![allow(dead_code)]

use std::path::PathBuf;

use sqlgate::policy::finding::{FindingKind, Severity};
use sqlgate::policy::{review_sql, PolicyConfig, StatementResult};

/// Columns every conforming table declares.
pub(crate) const SYSTEM_COLUMNS: &str = "id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT, \
     created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP, \
     updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP";

/// Keys every conforming table declares.
pub(crate) const SYSTEM_KEYS: &str = "PRIMARY KEY (id), \
     KEY index_created_at (created_at), \
     KEY index_updated_at (updated_at)";

/// Table options of a conforming table.
pub(crate) const TABLE_OPTIONS: &str =
    "ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci";

pub(crate) fn fixture_dir(fixture: &str) -> PathBuf {
    PathBuf::from("tests/fixtures").join(fixture)
}

pub(crate) fn read_fixture_sql(fixture: &str) -> String {
    let path = fixture_dir(fixture).join("input.sql");
    std::fs::read_to_string(path).expect("fixture SQL should be readable")
}

/// `CREATE TABLE` with the system columns and keys plus the given extra definitions.
pub(crate) fn conforming_create(table: &str, columns: &str, keys: &str) -> String {
    let mut definitions = vec![SYSTEM_COLUMNS];
    if !columns.is_empty() {
        definitions.push(columns);
    }
    definitions.push(SYSTEM_KEYS);
    if !keys.is_empty() {
        definitions.push(keys);
    }
    format!(
        "CREATE TABLE {table} ({}) {TABLE_OPTIONS}",
        definitions.join(", ")
    )
}

pub(crate) fn review(sql: &str) -> Vec<StatementResult> {
    review_sql(sql, &PolicyConfig::default())
}

pub(crate) fn review_one(sql: &str) -> StatementResult {
    let mut results = review(sql);
    assert_eq!(results.len(), 1, "expected a single statement in {sql:?}");
    results.remove(0)
}

pub(crate) fn messages(result: &StatementResult, severity: Severity) -> Vec<String> {
    result
        .with_severity(severity)
        .map(|finding| finding.message.clone())
        .collect()
}

pub(crate) fn blocking(result: &StatementResult) -> Vec<String> {
    messages(result, Severity::Blocking)
}

pub(crate) fn advisory(result: &StatementResult) -> Vec<String> {
    messages(result, Severity::Advisory)
}

pub(crate) fn kinds(result: &StatementResult) -> Vec<FindingKind> {
    result.findings().iter().map(|finding| finding.kind).collect()
}

pub(crate) fn count_kind(result: &StatementResult, kind: FindingKind) -> usize {
    result
        .findings()
        .iter()
        .filter(|finding| finding.kind == kind)
        .count()
}

pub(crate) fn tags(result: &StatementResult) -> Vec<&'static str> {
    result.tags().iter().map(|tag| tag.as_str()).collect()
}
