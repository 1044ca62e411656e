mod support;

use sqlgate::policy::finding::FindingKind;
use sqlgate::policy::{review_sql, PolicyConfig};
use support::{advisory, blocking, count_kind, review, review_one, tags};

#[test]
fn dropping_the_id_column_needs_confirmation_and_is_blocked() {
    let result = review_one("ALTER TABLE orders DROP COLUMN id;");

    assert_eq!(advisory(&result), vec!["drop column `id` require DE's confirmation"]);
    assert_eq!(blocking(&result), vec!["cannot drop or rename column `id`"]);
    assert_eq!(tags(&result), vec!["MODIFY COLUMN"]);
    assert_eq!(result.old_table(), "orders");
}

#[test]
fn foreign_key_is_a_single_blocking_finding() {
    let result =
        review_one("ALTER TABLE orders ADD FOREIGN KEY (customer_id) REFERENCES customers(id);");

    assert_eq!(
        blocking(&result),
        vec!["use of `FOREIGN KEY` is not allowed in constraint <FOREIGN KEY (customer_id) REFERENCES customers (id)>"]
    );
    assert!(advisory(&result).is_empty());
    assert_eq!(tags(&result), vec!["MODIFY CONSTRAINT"]);
}

#[test]
fn explicit_column_positions_are_advisory() {
    let result = review_one(
        "ALTER TABLE orders ADD COLUMN priority INT NOT NULL DEFAULT 0 FIRST, \
         MODIFY COLUMN note VARCHAR(64) NOT NULL DEFAULT '' AFTER id",
    );

    assert!(blocking(&result).is_empty(), "{:?}", blocking(&result));
    assert_eq!(
        advisory(&result),
        vec![
            "use of `FIRST` to reorder column `priority` is not allowed",
            "use of `AFTER` to reorder column `note` is not allowed",
        ]
    );
    assert_eq!(result.columns()["priority"], "INT");
    assert_eq!(result.columns()["note"], "VARCHAR");
}

#[test]
fn not_null_without_default_is_advisory_only_when_altering() {
    let result = review_one("ALTER TABLE orders ADD COLUMN priority INT NOT NULL");
    assert_eq!(
        advisory(&result),
        vec!["column `priority` with `NOT NULL` should have `DEFAULT`"]
    );

    for exempt in [
        "ALTER TABLE orders ADD COLUMN body TEXT NOT NULL",
        "ALTER TABLE orders ADD COLUMN priority INT NOT NULL DEFAULT 1",
        "ALTER TABLE orders ADD COLUMN priority INT NULL",
    ] {
        assert_eq!(
            count_kind(&review_one(exempt), FindingKind::ColumnNotNullWithoutDefault),
            0,
            "{exempt}"
        );
    }
}

#[test]
fn changed_column_reports_the_old_name_in_lower_case() {
    let result = review_one(
        "ALTER TABLE orders CHANGE COLUMN Status state VARCHAR(32) NOT NULL DEFAULT ''",
    );

    assert!(blocking(&result).is_empty(), "{:?}", blocking(&result));
    assert_eq!(
        advisory(&result),
        vec!["drop column `status` require DE's confirmation"]
    );
    assert_eq!(result.columns().keys().collect::<Vec<_>>(), vec!["state"]);
}

#[test]
fn renaming_a_system_column_is_blocked() {
    let result = review_one("ALTER TABLE orders RENAME COLUMN created_at TO inserted_at");
    assert_eq!(blocking(&result), vec!["cannot drop or rename column `created_at`"]);
    assert_eq!(count_kind(&result, FindingKind::ColumnDropped), 1);
}

#[test]
fn system_column_added_later_must_still_match_its_shape() {
    let result = review_one("ALTER TABLE orders ADD COLUMN updated_at DATETIME NULL");
    assert_eq!(
        blocking(&result),
        vec![
            "column `updated_at` must use `NOT NULL`",
            "column `updated_at` must use `DEFAULT CURRENT_TIMESTAMP`",
            "column `updated_at` must use `ON UPDATE CURRENT_TIMESTAMP`",
        ]
    );
}

#[test]
fn required_indexes_cannot_be_dropped_or_renamed() {
    let result = review_one(
        "ALTER TABLE orders DROP INDEX index_created_at, DROP PRIMARY KEY, \
         RENAME INDEX index_updated_at TO idx_updated, DROP KEY index_status",
    );

    assert_eq!(
        blocking(&result),
        vec![
            "cannot drop or rename index `index_created_at`",
            "cannot drop `PRIMARY KEY`",
            "cannot drop or rename index `index_updated_at`",
        ]
    );
    assert_eq!(tags(&result), vec!["MODIFY CONSTRAINT"]);
}

#[test]
fn added_keys_follow_naming_prefixes() {
    let result = review_one(
        "ALTER TABLE orders ADD UNIQUE KEY customer_status (customer_id, status), \
         ADD INDEX by_status (status), ADD KEY index_status (status)",
    );

    assert_eq!(
        blocking(&result),
        vec![
            "unique index/key must be named with prefix `uk_` in <UNIQUE KEY customer_status (customer_id, status)>",
            "index/key must be named with prefix `index_` in <INDEX by_status (status)>",
        ]
    );
}

#[test]
fn renamed_table_is_checked_under_its_new_name() {
    let result = review_one("ALTER TABLE orders RENAME TO Orders_Archive");

    assert_eq!(
        blocking(&result),
        vec!["use of upper case in table name `Orders_Archive` is not allowed"]
    );
    assert_eq!(result.old_table(), "orders");
    assert_eq!(result.new_table(), "Orders_Archive");
    assert_eq!(tags(&result), vec!["RENAME TABLE"]);
}

#[test]
fn table_options_are_checked_when_altered() {
    let result = review_one(
        "ALTER TABLE orders ENGINE=MyISAM, CONVERT TO CHARACTER SET utf8mb4 COLLATE utf8mb4_general_ci",
    );

    assert_eq!(
        blocking(&result),
        vec![
            "table engine must be set to InnoDB",
            "use of collate `utf8mb4_general_ci` is not allowed, please use `utf8mb4_unicode_ci` instead",
        ]
    );
    assert_eq!(tags(&result), vec!["MODIFY OPTION"]);
    assert_eq!(count_kind(&result, FindingKind::CharsetMissing), 0);
}

#[test]
fn destructive_partition_maintenance_needs_confirmation() {
    let results = review(
        "ALTER TABLE events DROP PARTITION p0, p1;\n\
         ALTER TABLE events TRUNCATE PARTITION p2;\n\
         ALTER TABLE events REMOVE PARTITIONING;\n\
         ALTER TABLE events COALESCE PARTITION 2;",
    );
    let warnings: Vec<Vec<String>> = results.iter().map(advisory).collect();

    assert_eq!(
        warnings,
        vec![
            vec!["drop partition required DBOps's confirmation".to_string()],
            vec!["drop partition required DBOps's confirmation".to_string()],
            vec!["remove partition required DBOps's confirmation".to_string()],
            vec![],
        ]
    );
    assert!(results.iter().all(|result| !result.is_blocked()));
    assert!(results
        .iter()
        .all(|result| tags(result) == vec!["MODIFY PARTITION"]));
}

#[test]
fn approach_only_alter_has_no_findings_or_tags() {
    let result = review_one("ALTER TABLE orders ALGORITHM=INPLACE, LOCK=NONE");
    assert!(result.findings().is_empty());
    assert!(result.tags().is_empty());
    assert_eq!(result.old_table(), "orders");
}

#[test]
fn unsupported_alteration_is_blocking() {
    let result = review_one("ALTER TABLE orders ORDER BY id");
    assert_eq!(
        blocking(&result),
        vec!["sql includes unsupported clause: ORDER BY id"]
    );
}

#[test]
fn each_alteration_is_tagged_once() {
    let result = review_one(
        "ALTER TABLE orders ADD COLUMN a INT NULL, ADD COLUMN b INT NULL, \
         ADD KEY index_a (a), COMMENT = 'orders', RENAME TO orders_v2",
    );
    assert_eq!(
        tags(&result),
        vec!["MODIFY OPTION", "MODIFY COLUMN", "MODIFY CONSTRAINT", "RENAME TABLE"]
    );
    assert_eq!(result.new_table(), "orders_v2");
}

#[test]
fn syntax_error_fails_the_whole_batch() {
    let results = review("ALTER TABLE orders ADD COLUMN a INT NULL;\nALTER TABLE orders ADD COLUMN");
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].sql(),
        "ALTER TABLE orders ADD COLUMN a INT NULL;\nALTER TABLE orders ADD COLUMN"
    );
    let errors = blocking(&results[0]);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("syntax error at "), "{}", errors[0]);
    assert!(results[0].tags().is_empty());
}

#[test]
fn shortcut_statements_are_redirected_to_alter_table() {
    let results = review(
        "RENAME TABLE a TO b;\nCREATE INDEX index_a ON t (a);\nDROP TABLE t;\nCREATE DATABASE shop;\nSELECT 1;",
    );
    let errors: Vec<Vec<String>> = results.iter().map(blocking).collect();
    assert_eq!(
        errors,
        vec![
            vec!["please use ALTER TABLE for rename operation".to_string()],
            vec!["please use ALTER TABLE for index operation".to_string()],
            vec!["drop or truncate table operation is not allowed".to_string()],
            vec!["modify database operation is not allowed".to_string()],
            vec!["statement provided is not a valid DDL".to_string()],
        ]
    );
}

#[test]
fn policy_file_overrides_conventions() {
    let config = PolicyConfig::from_json(r#"{"index_prefix": "idx_", "engine": "RocksDB"}"#)
        .expect("policy should parse");
    let results = review_sql(
        "ALTER TABLE orders ADD INDEX idx_status (status), ADD KEY index_kind (kind), ENGINE=InnoDB",
        &config,
    );

    assert_eq!(
        blocking(&results[0]),
        vec![
            "index/key must be named with prefix `idx_` in <KEY index_kind (kind)>",
            "table engine must be set to RocksDB",
        ]
    );
}
