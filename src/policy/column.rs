//! Column conformance rules.
//!
//! General rules apply to every introduced column; the three system columns carry an
//! additional exact-shape rule whenever a column by that name appears.

use std::collections::BTreeSet;

use sqlparser::ast::{ColumnDef, ColumnOption, DataType, Expr};
use sqlparser::tokenizer::Token;

use super::config::{PolicyConfig, SystemColumn};
use super::finding::{Finding, FindingKind};
use super::naming::check_column_name;
use super::result::StatementResult;
use crate::parser::expr::is_current_timestamp;
use crate::parser::statement::ColumnPosition;

/// Whether columns are introduced by a table creation or an alteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewMode {
    /// `CREATE TABLE`.
    Create,
    /// `ALTER TABLE`.
    Alter,
}

const GEOMETRY_TYPES: &[&str] = &[
    "GEOMETRY",
    "POINT",
    "LINESTRING",
    "POLYGON",
    "MULTIPOINT",
    "MULTILINESTRING",
    "MULTIPOLYGON",
    "GEOMETRYCOLLECTION",
];

/// Upper-case base type name (`BIGINT`, `DATETIME`, `VARCHAR`); `None` when no type was given.
pub fn base_type_name(data_type: &DataType) -> Option<String> {
    if matches!(data_type, DataType::Unspecified) {
        return None;
    }
    let rendered = data_type.to_string();
    let base = rendered
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default();
    Some(base.to_ascii_uppercase())
}

fn is_timestamp(data_type: &DataType) -> bool {
    matches!(data_type, DataType::Timestamp(..))
}

fn is_datetime(data_type: &DataType) -> bool {
    matches!(data_type, DataType::Datetime(_))
}

fn is_big_int(data_type: &DataType) -> bool {
    matches!(data_type, DataType::BigInt(_) | DataType::UnsignedBigInt(_))
}

fn is_unsigned(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::UnsignedTinyInt(_)
            | DataType::UnsignedSmallInt(_)
            | DataType::UnsignedMediumInt(_)
            | DataType::UnsignedInt(_)
            | DataType::UnsignedInteger(_)
            | DataType::UnsignedBigInt(_)
    )
}

/// Display width of an integer type; the single-byte integer is exempt.
fn integer_display_width(data_type: &DataType) -> Option<u64> {
    match data_type {
        DataType::SmallInt(width)
        | DataType::UnsignedSmallInt(width)
        | DataType::MediumInt(width)
        | DataType::UnsignedMediumInt(width)
        | DataType::Int(width)
        | DataType::UnsignedInt(width)
        | DataType::Integer(width)
        | DataType::UnsignedInteger(width)
        | DataType::BigInt(width)
        | DataType::UnsignedBigInt(width) => *width,
        _ => None,
    }
}

fn is_large_object(data_type: &DataType) -> bool {
    match data_type {
        DataType::Blob(_)
        | DataType::TinyBlob
        | DataType::MediumBlob
        | DataType::LongBlob
        | DataType::Text
        | DataType::TinyText
        | DataType::MediumText
        | DataType::LongText
        | DataType::JSON => true,
        DataType::Custom(name, _) => name
            .0
            .last()
            .is_some_and(|part| GEOMETRY_TYPES.contains(&part.value.to_ascii_uppercase().as_str())),
        _ => false,
    }
}

/// Options declared on a column, as the rules read them.
#[derive(Debug, Default)]
struct DeclaredOptions<'a> {
    inline_keys: usize,
    not_null: bool,
    auto_increment: bool,
    default: Option<&'a Expr>,
    on_update: Option<&'a Expr>,
}

impl<'a> DeclaredOptions<'a> {
    fn of(column: &'a ColumnDef) -> Self {
        column
            .options
            .iter()
            .fold(Self::default(), |mut declared, option| {
                match &option.option {
                    ColumnOption::Unique { .. } | ColumnOption::ForeignKey { .. } => {
                        declared.inline_keys += 1;
                    }
                    ColumnOption::NotNull => declared.not_null = true,
                    ColumnOption::Default(expr) => declared.default = Some(expr),
                    ColumnOption::OnUpdate(expr) => declared.on_update = Some(expr),
                    ColumnOption::DialectSpecific(tokens) => {
                        declared.auto_increment |= tokens.iter().any(is_auto_increment);
                    }
                    _ => {}
                }
                declared
            })
    }
}

fn is_auto_increment(token: &Token) -> bool {
    matches!(token, Token::Word(word) if word.value.eq_ignore_ascii_case("AUTO_INCREMENT"))
}

/// Apply the general and system-column rules to every column, in order.
///
/// Returns the system columns that were present.
pub fn check_columns(
    result: &mut StatementResult,
    columns: &[ColumnDef],
    mode: ReviewMode,
    config: &PolicyConfig,
) -> BTreeSet<SystemColumn> {
    let mut present = BTreeSet::new();
    for column in columns {
        check_column(result, column, mode);
        if let Some(system) = config.system_column(&column.name.value) {
            check_system_column(result, column, system, config);
            present.insert(system);
        }
    }
    present
}

/// Columns that declare a type, as `(name, base type)` in declaration order.
pub fn typed_columns(columns: &[ColumnDef]) -> Vec<(String, String)> {
    columns
        .iter()
        .filter_map(|column| {
            base_type_name(&column.data_type).map(|data_type| (column.name.value.clone(), data_type))
        })
        .collect()
}

/// Record every typed column in the result's column map.
pub fn record_columns(result: &mut StatementResult, columns: &[ColumnDef]) {
    for (name, data_type) in typed_columns(columns) {
        result.add_column(name, data_type);
    }
}

fn check_column(result: &mut StatementResult, column: &ColumnDef, mode: ReviewMode) {
    let name = column.name.value.as_str();
    check_column_name(result, name);

    let declared = DeclaredOptions::of(column);
    for _ in 0..declared.inline_keys {
        result.add(
            Finding::new(
                FindingKind::ColumnInlineKey,
                format!("column `{name}` with inline `Unique/Primary/Reference/Key` is not allowed"),
            )
            .about(name),
        );
    }

    let data_type = &column.data_type;
    let large_object = is_large_object(data_type);
    if is_timestamp(data_type) {
        result.add(
            Finding::new(
                FindingKind::ColumnTimestampType,
                format!("column `{name}` with `TIMESTAMP` is not allowed, use `DATETIME` instead"),
            )
            .about(name),
        );
    } else if integer_display_width(data_type).is_some() {
        result.add(
            Finding::new(
                FindingKind::ColumnDisplayWidth,
                format!("column `{name}` with display length is not allowed"),
            )
            .about(name),
        );
    } else if large_object {
        if declared.default.is_some() {
            let type_name = base_type_name(data_type)
                .unwrap_or_default()
                .to_ascii_lowercase();
            result.add(
                Finding::new(
                    FindingKind::ColumnLargeObjectDefault,
                    format!(
                        "column `{name}` of type `{type_name}` with non null default value is not allowed"
                    ),
                )
                .about(name),
            );
        }
    } else if matches!(data_type, DataType::Enum(..)) {
        result.add(
            Finding::new(
                FindingKind::ColumnEnumType,
                format!("column `{name}` with `ENUM` is not allowed"),
            )
            .about(name),
        );
    }

    if mode == ReviewMode::Alter
        && declared.not_null
        && declared.default.is_none()
        && !declared.auto_increment
        && !large_object
    {
        result.add(
            Finding::new(
                FindingKind::ColumnNotNullWithoutDefault,
                format!("column `{name}` with `NOT NULL` should have `DEFAULT`"),
            )
            .about(name),
        );
    }
}

fn check_system_column(
    result: &mut StatementResult,
    column: &ColumnDef,
    system: SystemColumn,
    config: &PolicyConfig,
) {
    let name = config.system_column_name(system);
    let declared = DeclaredOptions::of(column);
    let data_type = &column.data_type;

    let mut failures = Vec::new();
    match system {
        SystemColumn::Id => {
            if !is_unsigned(data_type) {
                failures.push((FindingKind::IdNotUnsigned, "UNSIGNED"));
            }
            if !is_big_int(data_type) {
                failures.push((FindingKind::IdNotBigInt, "BIGINT"));
            }
            if !declared.auto_increment {
                failures.push((FindingKind::IdNotAutoIncrement, "AUTO_INCREMENT"));
            }
        }
        SystemColumn::CreatedAt | SystemColumn::UpdatedAt => {
            let created = system == SystemColumn::CreatedAt;
            if !is_datetime(data_type) {
                failures.push((
                    pick(created, FindingKind::CreatedAtNotDatetime, FindingKind::UpdatedAtNotDatetime),
                    "DATETIME",
                ));
            }
            if !declared.not_null {
                failures.push((
                    pick(created, FindingKind::CreatedAtNullable, FindingKind::UpdatedAtNullable),
                    "NOT NULL",
                ));
            }
            if !is_current_timestamp(declared.default) {
                failures.push((
                    pick(created, FindingKind::CreatedAtBadDefault, FindingKind::UpdatedAtBadDefault),
                    "DEFAULT CURRENT_TIMESTAMP",
                ));
            }
            if !created && !is_current_timestamp(declared.on_update) {
                failures.push((FindingKind::UpdatedAtBadOnUpdate, "ON UPDATE CURRENT_TIMESTAMP"));
            }
        }
    }

    for (kind, requirement) in failures {
        result.add(Finding::new(kind, format!("column `{name}` must use `{requirement}`")).about(name));
    }
}

fn pick(created: bool, created_kind: FindingKind, updated_kind: FindingKind) -> FindingKind {
    if created {
        created_kind
    } else {
        updated_kind
    }
}

/// Report each system column absent from a created table.
pub fn report_missing_system_columns(
    result: &mut StatementResult,
    present: &BTreeSet<SystemColumn>,
    config: &PolicyConfig,
) {
    for system in SystemColumn::ALL {
        if present.contains(&system) {
            continue;
        }
        let name = config.system_column_name(system);
        let (kind, shape) = match system {
            SystemColumn::Id => (FindingKind::IdColumnMissing, "AUTO_INCREMENT BIGINT UNSIGNED"),
            SystemColumn::CreatedAt => (
                FindingKind::CreatedAtMissing,
                "DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP",
            ),
            SystemColumn::UpdatedAt => (
                FindingKind::UpdatedAtMissing,
                "DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP",
            ),
        };
        result.add(Finding::new(kind, format!("must have column `{name}` with `{shape}`")).about(name));
    }
}

/// A column dropped or renamed away needs confirmation; system columns may not go.
pub fn check_dropped_column(result: &mut StatementResult, old_name: &str, config: &PolicyConfig) {
    let dropped = old_name.to_lowercase();
    result.add(
        Finding::new(
            FindingKind::ColumnDropped,
            format!("drop column `{dropped}` require DE's confirmation"),
        )
        .about(dropped.as_str()),
    );
    if let Some(system) = config.system_column(&dropped) {
        let kind = match system {
            SystemColumn::Id => FindingKind::IdDropped,
            SystemColumn::CreatedAt => FindingKind::CreatedAtDropped,
            SystemColumn::UpdatedAt => FindingKind::UpdatedAtDropped,
        };
        let name = config.system_column_name(system);
        result.add(Finding::new(kind, format!("cannot drop or rename column `{name}`")).about(name));
    }
}

/// Explicit `FIRST` / `AFTER` positioning of a new column.
pub fn check_reorder(result: &mut StatementResult, position: &ColumnPosition, column: &str) {
    let (kind, keyword) = match position {
        ColumnPosition::First => (FindingKind::ColumnReorderFirst, "FIRST"),
        ColumnPosition::After(_) => (FindingKind::ColumnReorderAfter, "AFTER"),
    };
    result.add(
        Finding::new(
            kind,
            format!("use of `{keyword}` to reorder column `{column}` is not allowed"),
        )
        .about(column),
    );
}
