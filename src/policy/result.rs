use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use super::finding::{Finding, FindingKind, Severity};

/// Category of change a statement attempted.
///
/// Ordering follows declaration order, which is also the output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ChangeTag {
    /// `CREATE TABLE`.
    #[serde(rename = "CREATE TABLE")]
    CreateTable,
    /// Table option change.
    #[serde(rename = "MODIFY OPTION")]
    ModifyOption,
    /// Column added, dropped, or redefined.
    #[serde(rename = "MODIFY COLUMN")]
    ModifyColumn,
    /// Constraint or index change.
    #[serde(rename = "MODIFY CONSTRAINT")]
    ModifyConstraint,
    /// Partition maintenance or repartitioning.
    #[serde(rename = "MODIFY PARTITION")]
    ModifyPartition,
    /// Table rename through `ALTER TABLE`.
    #[serde(rename = "RENAME TABLE")]
    RenameTable,
}

impl ChangeTag {
    /// Label used in reviews and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeTag::CreateTable => "CREATE TABLE",
            ChangeTag::ModifyOption => "MODIFY OPTION",
            ChangeTag::ModifyColumn => "MODIFY COLUMN",
            ChangeTag::ModifyConstraint => "MODIFY CONSTRAINT",
            ChangeTag::ModifyPartition => "MODIFY PARTITION",
            ChangeTag::RenameTable => "RENAME TABLE",
        }
    }
}

/// Accumulated outcome of reviewing one statement.
///
/// Built incrementally by the checkers during a single pass. The column map only grows:
/// a later clause never removes a column recorded by an earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementResult {
    sql: String,
    old_table: String,
    new_table: String,
    columns: BTreeMap<String, String>,
    tags: BTreeSet<ChangeTag>,
    findings: Vec<Finding>,
}

impl StatementResult {
    /// Empty result for the given statement text.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            old_table: String::new(),
            new_table: String::new(),
            columns: BTreeMap::new(),
            tags: BTreeSet::new(),
            findings: Vec::new(),
        }
    }

    /// Table the statement operates on.
    pub fn set_old_table(&mut self, table: impl Into<String>) {
        self.old_table = table.into();
    }

    /// Target name of a rename.
    pub fn set_new_table(&mut self, table: impl Into<String>) {
        self.new_table = table.into();
    }

    /// Record a column and its base type; an existing entry takes the new type.
    pub fn add_column(&mut self, name: impl Into<String>, data_type: impl Into<String>) {
        self.columns.insert(name.into(), data_type.into());
    }

    /// Tag the change category.
    pub fn add_tag(&mut self, tag: ChangeTag) {
        self.tags.insert(tag);
    }

    /// Append a finding.
    pub fn add(&mut self, finding: Finding) {
        debug!(kind = ?finding.kind, severity = ?finding.severity, "finding recorded");
        self.findings.push(finding);
    }

    /// Append a finding built from its kind and message.
    pub fn report(&mut self, kind: FindingKind, message: impl Into<String>) {
        self.add(Finding::new(kind, message));
    }

    /// Normalized statement text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Table referenced before the operation.
    pub fn old_table(&self) -> &str {
        &self.old_table
    }

    /// New table name; empty unless the statement renames the table.
    pub fn new_table(&self) -> &str {
        &self.new_table
    }

    /// Column name to upper-case base type.
    pub fn columns(&self) -> &BTreeMap<String, String> {
        &self.columns
    }

    /// Change categories, in tag order.
    pub fn tags(&self) -> &BTreeSet<ChangeTag> {
        &self.tags
    }

    /// Every finding in recording order, suppressed ones included.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Findings of one severity, in recording order.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(move |finding| finding.severity == severity)
    }

    /// Whether any blocking finding was recorded.
    pub fn is_blocked(&self) -> bool {
        self.with_severity(Severity::Blocking).next().is_some()
    }

    /// Serializable projection with findings split by severity.
    pub fn review(&self) -> Review {
        let messages = |severity: Severity| -> Vec<String> {
            self.with_severity(severity)
                .map(|finding| finding.message.clone())
                .collect()
        };
        Review {
            sql: self.sql.clone(),
            old_table: self.old_table.clone(),
            new_table: self.new_table.clone(),
            columns: self.columns.clone(),
            ddl_list: self.tags.iter().map(|tag| tag.as_str().to_string()).collect(),
            error_msg: messages(Severity::Blocking),
            warning_msg: messages(Severity::Advisory),
        }
    }
}

/// Externally visible review of one statement. Suppressed findings are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    /// Statement text.
    pub sql: String,
    /// Table referenced before the operation.
    pub old_table: String,
    /// New table name, empty unless renamed.
    pub new_table: String,
    /// Column name to base type.
    pub columns: BTreeMap<String, String>,
    /// Change categories.
    pub ddl_list: Vec<String>,
    /// Blocking messages.
    pub error_msg: Vec<String>,
    /// Advisory messages.
    pub warning_msg: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_partitions_messages_and_drops_suppressed() {
        let mut result = StatementResult::new("CREATE TABLE t (a INT)");
        result.report(FindingKind::CharsetMissing, "table charset must be explicitly specified");
        result.report(FindingKind::CollationMissing, "table collate must be explicitly specified");
        result.report(FindingKind::ColumnDropped, "drop column `a` require DE's confirmation");

        let review = result.review();
        assert_eq!(review.error_msg, vec!["table charset must be explicitly specified"]);
        assert_eq!(review.warning_msg, vec!["drop column `a` require DE's confirmation"]);
        assert_eq!(result.findings().len(), 3);
        assert!(result.is_blocked());
    }

    #[test]
    fn tags_serialize_in_declaration_order() {
        let mut result = StatementResult::new("ALTER TABLE t ...");
        result.add_tag(ChangeTag::RenameTable);
        result.add_tag(ChangeTag::ModifyColumn);
        result.add_tag(ChangeTag::ModifyColumn);
        assert_eq!(result.review().ddl_list, vec!["MODIFY COLUMN", "RENAME TABLE"]);
    }

    #[test]
    fn column_map_overwrites_types_but_never_removes() {
        let mut result = StatementResult::new("");
        result.add_column("a", "INT");
        result.add_column("b", "TEXT");
        result.add_column("a", "BIGINT");
        assert_eq!(result.columns().len(), 2);
        assert_eq!(result.columns()["a"], "BIGINT");
    }

    #[test]
    fn review_serializes_with_stable_field_names() {
        let mut result = StatementResult::new("ALTER TABLE t RENAME TO u");
        result.set_old_table("t");
        result.set_new_table("u");
        result.add_tag(ChangeTag::RenameTable);
        insta::assert_json_snapshot!(result.review(), @r###"
        {
          "sql": "ALTER TABLE t RENAME TO u",
          "old_table": "t",
          "new_table": "u",
          "columns": {},
          "ddl_list": [
            "RENAME TABLE"
          ],
          "error_msg": [],
          "warning_msg": []
        }
        "###);
    }
}
