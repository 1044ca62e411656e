use serde::Serialize;

/// How a finding affects the review verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Fails the review.
    Blocking,
    /// Warns without failing.
    Advisory,
    /// Recorded but never surfaced.
    Suppressed,
}

/// Every distinct rule outcome the engine can produce.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    // statement shape
    SyntaxError,
    NotDdl,
    RenameTableStatement,
    IndexStatement,
    DatabaseStatement,
    DropTableStatement,
    UnsupportedClause,
    TemporaryTable,
    CreateIfNotExists,
    CreateWithSelect,
    CreateWithLike,

    // table name
    TableWithDatabaseName,
    TableReservedWord,
    TableNotLowerCase,
    TableNameWithHyphen,

    // system columns
    IdColumnMissing,
    IdNotAutoIncrement,
    IdNotBigInt,
    IdNotUnsigned,
    IdDropped,
    CreatedAtMissing,
    CreatedAtNotDatetime,
    CreatedAtNullable,
    CreatedAtBadDefault,
    CreatedAtDropped,
    UpdatedAtMissing,
    UpdatedAtNotDatetime,
    UpdatedAtNullable,
    UpdatedAtBadDefault,
    UpdatedAtBadOnUpdate,
    UpdatedAtDropped,

    // columns
    ColumnDropped,
    ColumnNameWithHyphen,
    ColumnInlineKey,
    ColumnTimestampType,
    ColumnLargeObjectDefault,
    ColumnDisplayWidth,
    ColumnEnumType,
    ColumnNotNullDefaultNull,
    ColumnReservedWord,
    ColumnNotLowerCase,
    ColumnNotNullWithoutDefault,
    ColumnReorderFirst,
    ColumnReorderAfter,

    // constraints
    PrimaryKeyMissing,
    PrimaryKeyDropped,
    PrimaryKeyWithoutId,
    IndexNamePrefix,
    UniqueKeyNamePrefix,
    UniqueKeyMissingPartitionColumn,
    RangeColumnNotLast,
    CreatedAtIndexMissing,
    CreatedAtIndexShape,
    CreatedAtIndexDropped,
    UpdatedAtIndexMissing,
    UpdatedAtIndexShape,
    UpdatedAtIndexDropped,
    ConstraintUnknownColumn,
    ForeignKey,

    // table options
    DiscouragedCollation,
    CharsetMissing,
    CollationMissing,
    InvalidEngine,

    // partitions
    PartitionUnknownColumn,
    PartitionByHash,
    PartitionDropped,
    PartitionRemoved,
}

/// Static severity table. Changing governance policy means changing this match.
///
/// `ColumnNotNullDefaultNull` has a severity but no rule fires it.
pub fn severity(kind: FindingKind) -> Severity {
    use FindingKind::*;
    match kind {
        ColumnDropped
        | ColumnNotNullWithoutDefault
        | ColumnReorderFirst
        | ColumnReorderAfter
        | RangeColumnNotLast
        | PartitionByHash
        | PartitionDropped
        | PartitionRemoved => Severity::Advisory,
        CollationMissing => Severity::Suppressed,
        SyntaxError
        | NotDdl
        | RenameTableStatement
        | IndexStatement
        | DatabaseStatement
        | DropTableStatement
        | UnsupportedClause
        | TemporaryTable
        | CreateIfNotExists
        | CreateWithSelect
        | CreateWithLike
        | TableWithDatabaseName
        | TableReservedWord
        | TableNotLowerCase
        | TableNameWithHyphen
        | IdColumnMissing
        | IdNotAutoIncrement
        | IdNotBigInt
        | IdNotUnsigned
        | IdDropped
        | CreatedAtMissing
        | CreatedAtNotDatetime
        | CreatedAtNullable
        | CreatedAtBadDefault
        | CreatedAtDropped
        | UpdatedAtMissing
        | UpdatedAtNotDatetime
        | UpdatedAtNullable
        | UpdatedAtBadDefault
        | UpdatedAtBadOnUpdate
        | UpdatedAtDropped
        | ColumnNameWithHyphen
        | ColumnInlineKey
        | ColumnTimestampType
        | ColumnLargeObjectDefault
        | ColumnDisplayWidth
        | ColumnEnumType
        | ColumnNotNullDefaultNull
        | ColumnReservedWord
        | ColumnNotLowerCase
        | PrimaryKeyMissing
        | PrimaryKeyDropped
        | PrimaryKeyWithoutId
        | IndexNamePrefix
        | UniqueKeyNamePrefix
        | UniqueKeyMissingPartitionColumn
        | CreatedAtIndexMissing
        | CreatedAtIndexShape
        | CreatedAtIndexDropped
        | UpdatedAtIndexMissing
        | UpdatedAtIndexShape
        | UpdatedAtIndexDropped
        | ConstraintUnknownColumn
        | ForeignKey
        | DiscouragedCollation
        | CharsetMissing
        | InvalidEngine
        | PartitionUnknownColumn => Severity::Blocking,
    }
}

/// One rule outcome for a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// What went wrong.
    pub kind: FindingKind,
    /// How bad it is, from [`severity`].
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Column, table, or clause the finding is about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Finding {
    /// Create a finding; the severity comes from the static table.
    pub fn new(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: severity(kind),
            message: message.into(),
            subject: None,
        }
    }

    /// Attach the subject the finding is about.
    #[must_use]
    pub fn about(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_confirmations_and_reordering_are_advisory() {
        for kind in [
            FindingKind::ColumnDropped,
            FindingKind::ColumnReorderFirst,
            FindingKind::ColumnReorderAfter,
            FindingKind::PartitionDropped,
            FindingKind::PartitionRemoved,
            FindingKind::PartitionByHash,
            FindingKind::RangeColumnNotLast,
            FindingKind::ColumnNotNullWithoutDefault,
        ] {
            assert_eq!(severity(kind), Severity::Advisory, "{kind:?}");
        }
    }

    #[test]
    fn missing_collation_is_suppressed_and_missing_charset_blocks() {
        assert_eq!(severity(FindingKind::CollationMissing), Severity::Suppressed);
        assert_eq!(severity(FindingKind::CharsetMissing), Severity::Blocking);
    }

    #[test]
    fn reserved_slot_has_a_severity() {
        assert_eq!(
            severity(FindingKind::ColumnNotNullDefaultNull),
            Severity::Blocking
        );
    }

    #[test]
    fn new_finding_takes_severity_from_table() {
        let finding = Finding::new(FindingKind::IdDropped, "cannot drop or rename column `id`")
            .about("id");
        assert_eq!(finding.severity, Severity::Blocking);
        assert_eq!(finding.subject.as_deref(), Some("id"));
    }
}
