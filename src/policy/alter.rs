use std::slice;

use sqlparser::ast::ColumnDef;
use tracing::debug;

use super::column::{check_columns, check_dropped_column, check_reorder, record_columns, ReviewMode};
use super::config::PolicyConfig;
use super::constraint::{check_added_constraint, check_removed_constraint};
use super::finding::FindingKind;
use super::naming::check_table_name;
use super::option::check_options;
use super::partition::check_partition_action;
use super::result::{ChangeTag, StatementResult};
use crate::parser::names::{qualified_name, relation_name};
use crate::parser::statement::{AlterSpec, AlterTable, ColumnPosition};

/// Rule bundle for `ALTER TABLE`: each alteration is checked and tagged on its own.
pub fn review_alter_table(result: &mut StatementResult, alter: &AlterTable, config: &PolicyConfig) {
    result.set_old_table(relation_name(&alter.name));
    for spec in &alter.specs {
        review_spec(result, spec, config);
    }
}

fn review_spec(result: &mut StatementResult, spec: &AlterSpec, config: &PolicyConfig) {
    match spec {
        AlterSpec::Options(options) => {
            result.add_tag(ChangeTag::ModifyOption);
            check_options(result, options, config);
        }

        AlterSpec::AddColumns { columns, position } => {
            review_column_change(result, columns, position.as_ref(), None, config);
        }
        AlterSpec::ModifyColumn { column, position } => {
            review_column_change(result, slice::from_ref(column), position.as_ref(), None, config);
        }
        AlterSpec::ChangeColumn {
            old_name,
            column,
            position,
        } => {
            review_column_change(
                result,
                slice::from_ref(column),
                position.as_ref(),
                Some(&old_name.value),
                config,
            );
        }
        AlterSpec::AlterColumn { column } => {
            review_column_change(result, slice::from_ref(column), None, None, config);
        }
        AlterSpec::DropColumn { name } => {
            review_column_change(result, &[], None, Some(&name.value), config);
        }
        AlterSpec::RenameColumn { old_name, .. } => {
            review_column_change(result, &[], None, Some(&old_name.value), config);
        }

        AlterSpec::AddConstraint(constraint) => {
            result.add_tag(ChangeTag::ModifyConstraint);
            check_added_constraint(result, constraint, config);
        }
        AlterSpec::DropPrimaryKey => {
            result.add_tag(ChangeTag::ModifyConstraint);
            check_removed_constraint(result, &config.primary_key_name, config);
        }
        AlterSpec::DropIndex { name } | AlterSpec::RenameIndex { old_name: name, .. } => {
            result.add_tag(ChangeTag::ModifyConstraint);
            check_removed_constraint(result, &name.value, config);
        }
        AlterSpec::DropForeignKey { .. }
        | AlterSpec::DropCheck { .. }
        | AlterSpec::IndexVisibility { .. }
        | AlterSpec::CheckEnforcement { .. }
        | AlterSpec::Keys { .. } => result.add_tag(ChangeTag::ModifyConstraint),

        AlterSpec::Partition(action) => {
            result.add_tag(ChangeTag::ModifyPartition);
            check_partition_action(result, action);
        }

        AlterSpec::RenameTable { new_name } => {
            result.add_tag(ChangeTag::RenameTable);
            let table = qualified_name(new_name);
            result.set_new_table(table.as_str());
            check_table_name(result, &table);
        }

        AlterSpec::Approach(approach) => debug!(?approach, "alter approach needs no checks"),

        AlterSpec::Other(clause) => result.report(
            FindingKind::UnsupportedClause,
            format!("sql includes unsupported clause: {clause}"),
        ),
    }
}

fn review_column_change(
    result: &mut StatementResult,
    columns: &[ColumnDef],
    position: Option<&ColumnPosition>,
    old_name: Option<&String>,
    config: &PolicyConfig,
) {
    result.add_tag(ChangeTag::ModifyColumn);
    check_columns(result, columns, ReviewMode::Alter, config);

    if let (Some(position), Some(first)) = (position, columns.first()) {
        check_reorder(result, position, &first.name.value);
    }
    if let Some(old_name) = old_name {
        check_dropped_column(result, old_name, config);
    }

    record_columns(result, columns);
}
