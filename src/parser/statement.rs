//! Statement model handed from the MySQL front end to the rule engine.
//!
//! Column definitions and expressions reuse `sqlparser` AST nodes; the table level
//! structures (constraints, options, partitioning, alter specs) are modeled here because
//! their MySQL forms are richer than the generic AST. `Display` implementations render
//! a clause back to canonical SQL for use inside finding messages.

use std::fmt;

use sqlparser::ast::{ColumnDef, Expr, Ident, ObjectName, Query, ReferentialAction};

/// One SQL fragment of a batch together with its parsed form.
#[derive(Debug, Clone)]
pub struct ParsedStatement {
    /// Source text of the fragment, trimmed, without the trailing `;`.
    pub sql: String,
    /// Parsed statement.
    pub statement: Statement,
}

/// Closed set of statement shapes the dispatcher routes on.
#[derive(Debug, Clone)]
pub enum Statement {
    /// `CREATE TABLE`.
    CreateTable(Box<CreateTable>),
    /// `ALTER TABLE`.
    AlterTable(AlterTable),
    /// `RENAME TABLE a TO b`.
    RenameTable,
    /// `CREATE INDEX` / `DROP INDEX`.
    ModifyIndex,
    /// `CREATE`, `ALTER` or `DROP` of a database or schema.
    ModifyDatabase,
    /// `DROP TABLE` / `TRUNCATE TABLE`.
    DropTable,
    /// Queries and row-level statements.
    NotDdl,
    /// Any other schema statement, with its restored text.
    Unsupported(String),
}

impl Statement {
    /// Short label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Statement::CreateTable(_) => "create table",
            Statement::AlterTable(_) => "alter table",
            Statement::RenameTable => "rename table",
            Statement::ModifyIndex => "index",
            Statement::ModifyDatabase => "database",
            Statement::DropTable => "drop table",
            Statement::NotDdl => "not ddl",
            Statement::Unsupported(_) => "unsupported",
        }
    }
}

/// `CREATE TABLE` in any of its MySQL forms.
#[derive(Debug, Clone)]
pub struct CreateTable {
    /// Table name, possibly database-qualified.
    pub name: ObjectName,
    /// `CREATE TEMPORARY TABLE`.
    pub temporary: bool,
    /// `IF NOT EXISTS`.
    pub if_not_exists: bool,
    /// Source table of `CREATE TABLE .. LIKE ..`.
    pub like: Option<ObjectName>,
    /// Query of `CREATE TABLE .. AS SELECT ..`.
    pub query: Option<Box<Query>>,
    /// Column definitions in declaration order.
    pub columns: Vec<ColumnDef>,
    /// Table-level constraints and indexes in declaration order.
    pub constraints: Vec<TableConstraint>,
    /// Table options in declaration order.
    pub options: Vec<TableOption>,
    /// Partitioning clause.
    pub partition: Option<PartitionOptions>,
}

/// `ALTER TABLE name spec, spec, ...`.
#[derive(Debug, Clone)]
pub struct AlterTable {
    /// Altered table.
    pub name: ObjectName,
    /// Alteration specs in order.
    pub specs: Vec<AlterSpec>,
}

/// `FIRST` / `AFTER col` on an added or redefined column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnPosition {
    /// `FIRST`.
    First,
    /// `AFTER col`.
    After(Ident),
}

/// One alteration of an `ALTER TABLE` statement.
#[derive(Debug, Clone)]
pub enum AlterSpec {
    /// Table options, including `CONVERT TO CHARACTER SET`.
    Options(Vec<TableOption>),
    /// `ADD [COLUMN] def` or `ADD [COLUMN] (def, ...)`.
    AddColumns {
        /// Added definitions.
        columns: Vec<ColumnDef>,
        /// Position of the first added column.
        position: Option<ColumnPosition>,
    },
    /// `DROP [COLUMN] name`.
    DropColumn {
        /// Dropped column.
        name: Ident,
    },
    /// `MODIFY [COLUMN] def`.
    ModifyColumn {
        /// New definition.
        column: ColumnDef,
        /// Requested position.
        position: Option<ColumnPosition>,
    },
    /// `CHANGE [COLUMN] old def`.
    ChangeColumn {
        /// Column being replaced.
        old_name: Ident,
        /// Replacement definition, possibly under a new name.
        column: ColumnDef,
        /// Requested position.
        position: Option<ColumnPosition>,
    },
    /// `RENAME COLUMN old TO new`.
    RenameColumn {
        /// Current name.
        old_name: Ident,
        /// New name.
        new_name: Ident,
    },
    /// `ALTER [COLUMN] name SET DEFAULT .. | DROP DEFAULT | SET VISIBLE ..`.
    ///
    /// The column carries `DataType::Unspecified`.
    AlterColumn {
        /// Column name with the changed options.
        column: ColumnDef,
    },
    /// `ADD` of a table constraint or index.
    AddConstraint(TableConstraint),
    /// `DROP PRIMARY KEY`.
    DropPrimaryKey,
    /// `DROP {INDEX|KEY} name`.
    DropIndex {
        /// Dropped index.
        name: Ident,
    },
    /// `DROP FOREIGN KEY name`.
    DropForeignKey {
        /// Dropped constraint symbol.
        name: Ident,
    },
    /// `DROP {CHECK|CONSTRAINT} name`.
    DropCheck {
        /// Dropped constraint symbol.
        name: Ident,
    },
    /// `RENAME {INDEX|KEY} old TO new`.
    RenameIndex {
        /// Current index name.
        old_name: Ident,
        /// New index name.
        new_name: Ident,
    },
    /// `ALTER INDEX name {VISIBLE|INVISIBLE}`.
    IndexVisibility {
        /// Index name.
        name: Ident,
        /// `VISIBLE` when true.
        visible: bool,
    },
    /// `ALTER CHECK name [NOT] ENFORCED`.
    CheckEnforcement {
        /// Check constraint symbol.
        name: Ident,
        /// `ENFORCED` when true.
        enforced: bool,
    },
    /// `ENABLE KEYS` / `DISABLE KEYS`.
    Keys {
        /// `ENABLE KEYS` when true.
        enabled: bool,
    },
    /// Partition maintenance or repartitioning.
    Partition(PartitionAction),
    /// `RENAME [TO|AS] name`.
    RenameTable {
        /// Target table name, possibly database-qualified.
        new_name: ObjectName,
    },
    /// `LOCK`, `ALGORITHM`, `FORCE`, `WITH|WITHOUT VALIDATION`.
    Approach(AlterApproach),
    /// Any other accepted alteration, with its restored text.
    Other(String),
}

/// Partition maintenance performed by `ALTER TABLE`.
#[derive(Debug, Clone)]
pub enum PartitionAction {
    /// `ADD PARTITION (...)`.
    Add,
    /// `COALESCE PARTITION n`.
    Coalesce,
    /// `DROP PARTITION names`.
    Drop,
    /// `TRUNCATE PARTITION names`.
    Truncate,
    /// `PARTITION BY ...` on an existing table.
    Repartition(Box<PartitionOptions>),
    /// `REMOVE PARTITIONING`.
    RemovePartitioning,
    /// `REBUILD PARTITION names`.
    Rebuild,
    /// `REORGANIZE PARTITION names INTO (...)`.
    Reorganize,
    /// `CHECK PARTITION names`.
    Check,
    /// `EXCHANGE PARTITION p WITH TABLE t`.
    Exchange,
    /// `OPTIMIZE PARTITION names`.
    Optimize,
    /// `REPAIR PARTITION names`.
    Repair,
    /// `ANALYZE PARTITION names`.
    Analyze,
    /// `IMPORT PARTITION names TABLESPACE`.
    ImportTablespace,
    /// `DISCARD PARTITION names TABLESPACE`.
    DiscardTablespace,
}

/// Alteration strategy directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlterApproach {
    /// `LOCK [=] mode`.
    Lock(String),
    /// `ALGORITHM [=] name`.
    Algorithm(String),
    /// `FORCE`.
    Force,
    /// `WITH VALIDATION`.
    WithValidation,
    /// `WITHOUT VALIDATION`.
    WithoutValidation,
}

/// Constraint kind of a table-level constraint or index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// `PRIMARY KEY`.
    PrimaryKey,
    /// `UNIQUE [KEY|INDEX]`.
    Unique,
    /// Plain `KEY` / `INDEX`.
    Index,
    /// `FULLTEXT`.
    FullText,
    /// `SPATIAL`.
    Spatial,
    /// `FOREIGN KEY`.
    ForeignKey,
    /// `CHECK (expr)`.
    Check,
}

/// The `KEY` / `INDEX` keyword as written, kept for restoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKeyword {
    /// `KEY`.
    Key,
    /// `INDEX`.
    Index,
}

impl fmt::Display for IndexKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKeyword::Key => f.write_str("KEY"),
            IndexKeyword::Index => f.write_str("INDEX"),
        }
    }
}

/// `col [(length)] [ASC|DESC]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPart {
    /// Indexed column.
    pub column: Ident,
    /// Prefix length.
    pub length: Option<u64>,
    /// Explicit `ASC` (true) or `DESC` (false).
    pub asc: Option<bool>,
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column)?;
        if let Some(length) = self.length {
            write!(f, "({length})")?;
        }
        match self.asc {
            Some(true) => f.write_str(" ASC"),
            Some(false) => f.write_str(" DESC"),
            None => Ok(()),
        }
    }
}

/// `REFERENCES table (cols) [ON DELETE ..] [ON UPDATE ..]`.
#[derive(Debug, Clone)]
pub struct ForeignReference {
    /// Referenced table.
    pub table: ObjectName,
    /// Referenced columns.
    pub columns: Vec<Ident>,
    /// `ON DELETE` action.
    pub on_delete: Option<ReferentialAction>,
    /// `ON UPDATE` action.
    pub on_update: Option<ReferentialAction>,
}

impl fmt::Display for ForeignReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "REFERENCES {} ({})", self.table, join(&self.columns))?;
        if let Some(action) = &self.on_delete {
            write!(f, " ON DELETE {action}")?;
        }
        if let Some(action) = &self.on_update {
            write!(f, " ON UPDATE {action}")?;
        }
        Ok(())
    }
}

/// Trailing index option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOption {
    /// `USING BTREE|HASH`.
    Using(String),
    /// `COMMENT 'text'`.
    Comment(String),
    /// `KEY_BLOCK_SIZE = n`.
    KeyBlockSize(u64),
    /// `VISIBLE` / `INVISIBLE`.
    Visible(bool),
    /// `WITH PARSER name`.
    Parser(Ident),
}

impl fmt::Display for IndexOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexOption::Using(kind) => write!(f, "USING {kind}"),
            IndexOption::Comment(text) => write!(f, "COMMENT '{}'", text.replace('\'', "''")),
            IndexOption::KeyBlockSize(size) => write!(f, "KEY_BLOCK_SIZE = {size}"),
            IndexOption::Visible(true) => f.write_str("VISIBLE"),
            IndexOption::Visible(false) => f.write_str("INVISIBLE"),
            IndexOption::Parser(name) => write!(f, "WITH PARSER {name}"),
        }
    }
}

/// Table-level constraint or index definition.
#[derive(Debug, Clone)]
pub struct TableConstraint {
    /// Constraint kind.
    pub kind: ConstraintKind,
    /// `CONSTRAINT symbol`.
    pub symbol: Option<Ident>,
    /// Index name written after the kind keyword.
    pub index_name: Option<Ident>,
    /// `KEY` / `INDEX` keyword as written.
    pub keyword: Option<IndexKeyword>,
    /// Key columns in order; empty for `CHECK`.
    pub key_parts: Vec<KeyPart>,
    /// Target of a `FOREIGN KEY`.
    pub reference: Option<ForeignReference>,
    /// Expression of a `CHECK`.
    pub check: Option<Expr>,
    /// Trailing index options.
    pub options: Vec<IndexOption>,
}

impl TableConstraint {
    /// Effective name: the index name when given, otherwise the constraint symbol.
    pub fn name(&self) -> Option<&str> {
        self.index_name
            .as_ref()
            .or(self.symbol.as_ref())
            .map(|ident| ident.value.as_str())
    }
}

impl fmt::Display for TableConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(symbol) = &self.symbol {
            write!(f, "CONSTRAINT {symbol} ")?;
        }
        let head = match self.kind {
            ConstraintKind::PrimaryKey => "PRIMARY KEY",
            ConstraintKind::Unique => "UNIQUE",
            ConstraintKind::Index => "",
            ConstraintKind::FullText => "FULLTEXT",
            ConstraintKind::Spatial => "SPATIAL",
            ConstraintKind::ForeignKey => "FOREIGN KEY",
            ConstraintKind::Check => "CHECK",
        };
        let mut words: Vec<String> = Vec::new();
        if !head.is_empty() {
            words.push(head.to_string());
        }
        if let Some(keyword) = self.keyword {
            words.push(keyword.to_string());
        }
        if let Some(name) = &self.index_name {
            words.push(name.to_string());
        }
        f.write_str(&words.join(" "))?;

        if let Some(check) = &self.check {
            return write!(f, " ({check})");
        }
        write!(f, " ({})", join(&self.key_parts))?;
        if let Some(reference) = &self.reference {
            write!(f, " {reference}")?;
        }
        for option in &self.options {
            write!(f, " {option}")?;
        }
        Ok(())
    }
}

/// Table option kinds the rules distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOptionKind {
    /// `ENGINE`.
    Engine,
    /// `[DEFAULT] CHARSET` / `CHARACTER SET`.
    Charset,
    /// `[DEFAULT] COLLATE`.
    Collate,
    /// `AUTO_INCREMENT`.
    AutoIncrement,
    /// `COMMENT`.
    Comment,
    /// Any other option, by upper-case name.
    Other(String),
}

impl fmt::Display for TableOptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableOptionKind::Engine => f.write_str("ENGINE"),
            TableOptionKind::Charset => f.write_str("CHARSET"),
            TableOptionKind::Collate => f.write_str("COLLATE"),
            TableOptionKind::AutoIncrement => f.write_str("AUTO_INCREMENT"),
            TableOptionKind::Comment => f.write_str("COMMENT"),
            TableOptionKind::Other(name) => f.write_str(name),
        }
    }
}

/// `kind [=] value`; `is_default` marks `kind = DEFAULT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOption {
    /// Option name.
    pub kind: TableOptionKind,
    /// Unquoted value.
    pub value: String,
    /// Set to `DEFAULT` rather than a value.
    pub is_default: bool,
}

impl fmt::Display for TableOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default {
            return write!(f, "{} = DEFAULT", self.kind);
        }
        match self.kind {
            TableOptionKind::Comment => {
                write!(f, "COMMENT = '{}'", self.value.replace('\'', "''"))
            }
            _ => write!(f, "{} = {}", self.kind, self.value),
        }
    }
}

/// Partitioning strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionStrategy {
    /// `HASH(expr)`.
    Hash,
    /// `KEY(cols)`.
    Key,
    /// `RANGE(expr)` / `RANGE COLUMNS(cols)`.
    Range,
    /// `LIST(expr)` / `LIST COLUMNS(cols)`.
    List,
}

/// One level of a partitioning clause.
#[derive(Debug, Clone)]
pub struct PartitionMethod {
    /// Partitioning strategy.
    pub strategy: PartitionStrategy,
    /// `LINEAR HASH` / `LINEAR KEY`.
    pub linear: bool,
    /// Expression of `HASH(expr)`, `RANGE(expr)` and `LIST(expr)`.
    pub expr: Option<Expr>,
    /// Columns of `KEY(cols)`, `RANGE COLUMNS(cols)` and `LIST COLUMNS(cols)`.
    pub columns: Vec<Ident>,
    /// `KEY ALGORITHM = n`.
    pub algorithm: Option<u64>,
}

impl fmt::Display for PartitionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.linear {
            f.write_str("LINEAR ")?;
        }
        let name = match self.strategy {
            PartitionStrategy::Hash => "HASH",
            PartitionStrategy::Key => "KEY",
            PartitionStrategy::Range => "RANGE",
            PartitionStrategy::List => "LIST",
        };
        f.write_str(name)?;
        if let Some(algorithm) = self.algorithm {
            write!(f, " ALGORITHM = {algorithm}")?;
        }
        match &self.expr {
            Some(expr) => write!(f, " ({expr})"),
            None if self.strategy == PartitionStrategy::Key => {
                write!(f, " ({})", join(&self.columns))
            }
            None => write!(f, " COLUMNS({})", join(&self.columns)),
        }
    }
}

/// `SUBPARTITION BY ... [SUBPARTITIONS n]`.
#[derive(Debug, Clone)]
pub struct SubPartition {
    /// Subpartitioning method.
    pub method: PartitionMethod,
    /// `SUBPARTITIONS n`.
    pub count: Option<u64>,
}

/// `PARTITION BY ...` clause.
#[derive(Debug, Clone)]
pub struct PartitionOptions {
    /// Top-level method.
    pub method: PartitionMethod,
    /// `PARTITIONS n`.
    pub count: Option<u64>,
    /// `SUBPARTITION BY` level.
    pub sub: Option<SubPartition>,
    /// Restored text of the parenthesized partition definition list.
    pub definitions: Option<String>,
}

impl fmt::Display for PartitionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PARTITION BY {}", self.method)?;
        if let Some(count) = self.count {
            write!(f, " PARTITIONS {count}")?;
        }
        if let Some(sub) = &self.sub {
            write!(f, " SUBPARTITION BY {}", sub.method)?;
            if let Some(count) = sub.count {
                write!(f, " SUBPARTITIONS {count}")?;
            }
        }
        if let Some(definitions) = &self.definitions {
            write!(f, " {definitions}")?;
        }
        Ok(())
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
