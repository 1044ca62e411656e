use super::column::{
    check_columns, record_columns, report_missing_system_columns, typed_columns, ReviewMode,
};
use super::config::PolicyConfig;
use super::constraint::{check_constraints, ConstraintScope};
use super::finding::FindingKind;
use super::naming::check_table_name;
use super::option::{check_options, check_required_options};
use super::partition::{check_partition, partition_columns};
use super::result::{ChangeTag, StatementResult};
use crate::parser::names::qualified_name;
use crate::parser::statement::CreateTable;

/// Full rule bundle for `CREATE TABLE`, evaluated in a fixed order.
pub fn review_create_table(result: &mut StatementResult, create: &CreateTable, config: &PolicyConfig) {
    if create.temporary {
        result.report(FindingKind::TemporaryTable, "temporary table is not allowed");
    }
    if create.if_not_exists {
        result.report(
            FindingKind::CreateIfNotExists,
            "create table with `IF NOT EXISTS` is not allowed",
        );
    }
    if create.query.is_some() {
        result.report(
            FindingKind::CreateWithSelect,
            "create table with select is not allowed",
        );
    }
    if create.like.is_some() {
        result.report(
            FindingKind::CreateWithLike,
            "create table with like statement is not allowed",
        );
    }

    let present = check_columns(result, &create.columns, ReviewMode::Create, config);
    report_missing_system_columns(result, &present, config);
    record_columns(result, &create.columns);

    let declared = typed_columns(&create.columns);
    let partitioned = create
        .partition
        .as_ref()
        .map(partition_columns)
        .unwrap_or_default();
    check_constraints(
        result,
        &create.constraints,
        ConstraintScope {
            columns: &declared,
            partition_columns: &partitioned,
        },
        config,
    );

    check_options(result, &create.options, config);
    check_required_options(result, &create.options);

    let table = qualified_name(&create.name);
    result.set_old_table(table.as_str());
    check_table_name(result, &table);

    if let Some(partition) = &create.partition {
        check_partition(result, partition, &declared);
    }

    result.add_tag(ChangeTag::CreateTable);
}
