use super::finding::{Finding, FindingKind};
use super::result::StatementResult;
use crate::parser::expr::column_names;
use crate::parser::statement::{PartitionAction, PartitionOptions, PartitionStrategy};

/// Columns referenced by a partitioning clause, deduplicated in encounter order.
///
/// Expression columns of both levels come first, then explicit column lists.
pub fn partition_columns(partition: &PartitionOptions) -> Vec<String> {
    let sub = partition.sub.as_ref().map(|sub| &sub.method);
    let from_exprs = std::iter::once(&partition.method)
        .chain(sub)
        .flat_map(|method| column_names(method.expr.as_ref()));
    let from_lists = std::iter::once(&partition.method)
        .chain(sub)
        .flat_map(|method| method.columns.iter().map(|ident| ident.value.clone()));

    let mut columns: Vec<String> = Vec::new();
    for column in from_exprs.chain(from_lists) {
        if !columns.contains(&column) {
            columns.push(column);
        }
    }
    columns
}

/// Partition rules at table creation: referenced columns must be declared, and hashing is discouraged.
pub fn check_partition(
    result: &mut StatementResult,
    partition: &PartitionOptions,
    declared: &[(String, String)],
) {
    let clause = partition.to_string();
    for column in partition_columns(partition) {
        if !declared.iter().any(|(name, _)| *name == column) {
            result.add(
                Finding::new(
                    FindingKind::PartitionUnknownColumn,
                    format!("unknown column `{column}` found in partition <{clause}>"),
                )
                .about(column),
            );
        }
    }

    let hashed = partition.method.strategy == PartitionStrategy::Hash
        || partition
            .sub
            .as_ref()
            .is_some_and(|sub| sub.method.strategy == PartitionStrategy::Hash);
    if hashed {
        result.add(
            Finding::new(
                FindingKind::PartitionByHash,
                format!("use of `BY HASH` is not recommended in partition <{clause}>"),
            )
            .about(clause.as_str()),
        );
    }
}

/// Partition maintenance through `ALTER TABLE`; destructive actions need confirmation.
pub fn check_partition_action(result: &mut StatementResult, action: &PartitionAction) {
    match action {
        PartitionAction::Drop | PartitionAction::Truncate => result.report(
            FindingKind::PartitionDropped,
            "drop partition required DBOps's confirmation",
        ),
        PartitionAction::RemovePartitioning => result.report(
            FindingKind::PartitionRemoved,
            "remove partition required DBOps's confirmation",
        ),
        _ => {}
    }
}
