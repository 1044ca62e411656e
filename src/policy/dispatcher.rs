//! Routing from parsed statements to rule bundles.

use tracing::{debug, warn};

use super::alter::review_alter_table;
use super::config::PolicyConfig;
use super::create::review_create_table;
use super::finding::FindingKind;
use super::result::StatementResult;
use crate::parser::mysql::parse_batch;
use crate::parser::statement::{ParsedStatement, Statement};

/// Review every statement of a SQL batch.
///
/// A syntax error anywhere in the batch yields a single result for the whole (trimmed) input
/// carrying one blocking finding; no other rules run.
pub fn review_sql(sql: &str, config: &PolicyConfig) -> Vec<StatementResult> {
    match parse_batch(sql) {
        Ok(statements) => statements
            .iter()
            .map(|statement| review_statement(statement, config))
            .collect(),
        Err(err) => {
            warn!(error = %err, "failed to parse batch");
            let mut result = StatementResult::new(sql.trim());
            result.report(FindingKind::SyntaxError, format!("syntax error at {err}"));
            vec![result]
        }
    }
}

/// Review one parsed statement.
pub fn review_statement(parsed: &ParsedStatement, config: &PolicyConfig) -> StatementResult {
    let mut result = StatementResult::new(parsed.sql.as_str());
    debug!(kind = parsed.statement.label(), sql = %parsed.sql, "dispatching statement");

    match &parsed.statement {
        Statement::CreateTable(create) => review_create_table(&mut result, create, config),
        Statement::AlterTable(alter) => review_alter_table(&mut result, alter, config),
        Statement::RenameTable => result.report(
            FindingKind::RenameTableStatement,
            "please use ALTER TABLE for rename operation",
        ),
        Statement::ModifyIndex => result.report(
            FindingKind::IndexStatement,
            "please use ALTER TABLE for index operation",
        ),
        Statement::ModifyDatabase => result.report(
            FindingKind::DatabaseStatement,
            "modify database operation is not allowed",
        ),
        Statement::DropTable => result.report(
            FindingKind::DropTableStatement,
            "drop or truncate table operation is not allowed",
        ),
        Statement::NotDdl => result.report(
            FindingKind::NotDdl,
            "statement provided is not a valid DDL",
        ),
        Statement::Unsupported(clause) => result.report(
            FindingKind::UnsupportedClause,
            format!("sql includes unsupported clause: {clause}"),
        ),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_error(sql: &str) -> String {
        let results = review_sql(sql, &PolicyConfig::default());
        assert_eq!(results.len(), 1);
        let review = results[0].review();
        assert_eq!(review.error_msg.len(), 1, "{:?}", review.error_msg);
        review.error_msg[0].clone()
    }

    #[test]
    fn canonical_form_is_required_for_shortcut_statements() {
        assert_eq!(
            first_error("RENAME TABLE a TO b"),
            "please use ALTER TABLE for rename operation"
        );
        assert_eq!(
            first_error("CREATE INDEX index_a ON t (a)"),
            "please use ALTER TABLE for index operation"
        );
        assert_eq!(
            first_error("DROP DATABASE shop"),
            "modify database operation is not allowed"
        );
        assert_eq!(
            first_error("TRUNCATE TABLE orders"),
            "drop or truncate table operation is not allowed"
        );
    }

    #[test]
    fn queries_are_not_ddl() {
        assert_eq!(
            first_error("SELECT * FROM orders"),
            "statement provided is not a valid DDL"
        );
    }

    #[test]
    fn syntax_error_yields_one_result_for_the_whole_batch() {
        let results = review_sql(
            "  ALTER TABLE t ADD COLUMN a INT; CREATE TABLE (  ",
            &PolicyConfig::default(),
        );
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].sql(),
            "ALTER TABLE t ADD COLUMN a INT; CREATE TABLE ("
        );
        assert_eq!(results[0].findings()[0].kind, FindingKind::SyntaxError);
        assert!(results[0].findings()[0].message.starts_with("syntax error at "));
        assert!(results[0].tags().is_empty());
    }

    #[test]
    fn each_statement_of_a_batch_is_classified_on_its_own() {
        let results = review_sql(
            "SELECT 1; ALTER TABLE orders ENGINE = InnoDB",
            &PolicyConfig::default(),
        );
        assert_eq!(results.len(), 2);
        assert!(results[0].is_blocked());
        assert!(!results[1].is_blocked());
        assert_eq!(results[1].old_table(), "orders");
    }
}
