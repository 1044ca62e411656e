//! Constraint and index rules.

use std::collections::{BTreeMap, BTreeSet};

use super::config::PolicyConfig;
use super::finding::{Finding, FindingKind};
use super::result::StatementResult;
use crate::parser::statement::{ConstraintKind, TableConstraint};

const RANGE_TYPES: &[&str] = &["DATETIME", "TIMESTAMP"];

/// What a constraint is checked against at table creation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintScope<'a> {
    /// Typed columns of the statement as `(name, base type)`, in declaration order.
    pub columns: &'a [(String, String)],
    /// Columns referenced by the partitioning clause, in encounter order.
    pub partition_columns: &'a [String],
}

/// Key columns of a constraint mapped to their last position, plus the distinct count.
struct KeyColumns<'a> {
    positions: BTreeMap<&'a str, usize>,
    ordered: Vec<&'a str>,
}

impl<'a> KeyColumns<'a> {
    fn of(constraint: &'a TableConstraint) -> Self {
        let mut positions = BTreeMap::new();
        let mut ordered = Vec::new();
        for (index, part) in constraint.key_parts.iter().enumerate() {
            let column = part.column.value.as_str();
            if positions.insert(column, index).is_none() {
                ordered.push(column);
            }
        }
        Self { positions, ordered }
    }

    fn contains(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }
}

/// Check every constraint of a created table, then report the required ones that are missing.
pub fn check_constraints(
    result: &mut StatementResult,
    constraints: &[TableConstraint],
    scope: ConstraintScope<'_>,
    config: &PolicyConfig,
) {
    let mut registered = BTreeSet::new();
    for constraint in constraints {
        let name = check_constraint(result, constraint, scope, config);
        check_known_columns(result, constraint, scope.columns);
        if let Some(name) = name {
            registered.insert(name);
        }
    }

    let required = [
        (
            config.primary_key_name.as_str(),
            FindingKind::PrimaryKeyMissing,
            "must have `PRIMARY KEY`".to_string(),
        ),
        (
            config.created_at_index.as_str(),
            FindingKind::CreatedAtIndexMissing,
            format!(
                "must have `KEY/INDEX {} ({})`",
                config.created_at_index, config.created_at_column
            ),
        ),
        (
            config.updated_at_index.as_str(),
            FindingKind::UpdatedAtIndexMissing,
            format!(
                "must have `KEY/INDEX {} ({})`",
                config.updated_at_index, config.updated_at_column
            ),
        ),
    ];
    for (name, kind, message) in required {
        if !registered.contains(name) {
            result.add(Finding::new(kind, message).about(name));
        }
    }
}

/// Kind rules for a constraint added by `ALTER TABLE`; there is no column universe to check against.
pub fn check_added_constraint(
    result: &mut StatementResult,
    constraint: &TableConstraint,
    config: &PolicyConfig,
) {
    check_constraint(result, constraint, ConstraintScope::default(), config);
}

/// Dropping or renaming one of the required keys is never allowed.
pub fn check_removed_constraint(result: &mut StatementResult, name: &str, config: &PolicyConfig) {
    let finding = if name == config.primary_key_name {
        Finding::new(FindingKind::PrimaryKeyDropped, "cannot drop `PRIMARY KEY`")
    } else if name == config.created_at_index {
        Finding::new(
            FindingKind::CreatedAtIndexDropped,
            format!("cannot drop or rename index `{name}`"),
        )
    } else if name == config.updated_at_index {
        Finding::new(
            FindingKind::UpdatedAtIndexDropped,
            format!("cannot drop or rename index `{name}`"),
        )
    } else {
        return;
    };
    result.add(finding.about(name));
}

/// Kind rules plus the required index shape. Returns the name the constraint registers under.
fn check_constraint(
    result: &mut StatementResult,
    constraint: &TableConstraint,
    scope: ConstraintScope<'_>,
    config: &PolicyConfig,
) -> Option<String> {
    let clause = constraint.to_string();
    let keys = KeyColumns::of(constraint);
    let mut name = constraint.name().map(str::to_string);

    match constraint.kind {
        ConstraintKind::PrimaryKey => {
            name = Some(config.primary_key_name.clone());
            if !keys.contains(&config.id_column) {
                let id = &config.id_column;
                result.add(
                    Finding::new(
                        FindingKind::PrimaryKeyWithoutId,
                        format!("must have column `{id}` in `PRIMARY KEY`"),
                    )
                    .about(id.as_str()),
                );
            }
            check_partition_coverage(result, &keys, scope.partition_columns, &clause);
            check_range_columns_last(result, &keys, scope.columns, &clause);
        }
        ConstraintKind::Unique => {
            check_partition_coverage(result, &keys, scope.partition_columns, &clause);
            check_range_columns_last(result, &keys, scope.columns, &clause);
            if !has_prefix(name.as_deref(), &config.unique_key_prefix) {
                result.add(
                    Finding::new(
                        FindingKind::UniqueKeyNamePrefix,
                        format!(
                            "unique index/key must be named with prefix `{}` in <{clause}>",
                            config.unique_key_prefix
                        ),
                    )
                    .about(clause.as_str()),
                );
            }
        }
        ConstraintKind::Index => {
            check_range_columns_last(result, &keys, scope.columns, &clause);
            if !has_prefix(name.as_deref(), &config.index_prefix) {
                result.add(
                    Finding::new(
                        FindingKind::IndexNamePrefix,
                        format!(
                            "index/key must be named with prefix `{}` in <{clause}>",
                            config.index_prefix
                        ),
                    )
                    .about(clause.as_str()),
                );
            }
        }
        ConstraintKind::ForeignKey => {
            result.add(
                Finding::new(
                    FindingKind::ForeignKey,
                    format!("use of `FOREIGN KEY` is not allowed in constraint <{clause}>"),
                )
                .about(clause.as_str()),
            );
        }
        ConstraintKind::FullText | ConstraintKind::Spatial | ConstraintKind::Check => {}
    }

    if let Some(name) = name.as_deref() {
        check_required_index_shape(result, constraint, name, config);
    }
    name
}

fn has_prefix(name: Option<&str>, prefix: &str) -> bool {
    name.is_some_and(|name| name.starts_with(prefix))
}

fn check_partition_coverage(
    result: &mut StatementResult,
    keys: &KeyColumns<'_>,
    partition_columns: &[String],
    clause: &str,
) {
    for column in partition_columns {
        if !keys.contains(column) {
            result.add(
                Finding::new(
                    FindingKind::UniqueKeyMissingPartitionColumn,
                    format!("must have `PARTITION KEY` column `{column}` in <{clause}>"),
                )
                .about(column.as_str()),
            );
        }
    }
}

/// A datetime column taking part in a composite key must come last.
fn check_range_columns_last(
    result: &mut StatementResult,
    keys: &KeyColumns<'_>,
    columns: &[(String, String)],
    clause: &str,
) {
    let last = keys.ordered.len().saturating_sub(1);
    for (column, data_type) in columns {
        if !RANGE_TYPES.contains(&data_type.as_str()) {
            continue;
        }
        match keys.positions.get(column.as_str()) {
            Some(&position) if position != last => result.add(
                Finding::new(
                    FindingKind::RangeColumnNotLast,
                    format!("column `{column}` of type `{data_type}` should put at the end in <{clause}>"),
                )
                .about(column.as_str()),
            ),
            _ => {}
        }
    }
}

fn check_required_index_shape(
    result: &mut StatementResult,
    constraint: &TableConstraint,
    name: &str,
    config: &PolicyConfig,
) {
    let (kind, column) = if name == config.created_at_index {
        (FindingKind::CreatedAtIndexShape, &config.created_at_column)
    } else if name == config.updated_at_index {
        (FindingKind::UpdatedAtIndexShape, &config.updated_at_column)
    } else {
        return;
    };
    let well_formed = constraint.kind == ConstraintKind::Index
        && constraint.key_parts.len() == 1
        && constraint.key_parts[0].column.value == *column;
    if !well_formed {
        result.add(
            Finding::new(
                kind,
                format!("index `{name}` must be `INDEX/KEY` with column (`{column}`) only"),
            )
            .about(name),
        );
    }
}

/// Every column a constraint references must be declared by the statement.
fn check_known_columns(
    result: &mut StatementResult,
    constraint: &TableConstraint,
    columns: &[(String, String)],
) {
    let keys = KeyColumns::of(constraint);
    let unknown: Vec<&str> = keys
        .ordered
        .iter()
        .copied()
        .filter(|key| !columns.iter().any(|(column, _)| column == key))
        .collect();
    if unknown.is_empty() {
        return;
    }
    let clause = constraint.to_string();
    for column in unknown {
        result.add(
            Finding::new(
                FindingKind::ConstraintUnknownColumn,
                format!("unknown column `{column}` found in constraint <{clause}>"),
            )
            .about(column),
        );
    }
}
