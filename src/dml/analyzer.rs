//! Impact summary of data-modifying statements.
//!
//! For `DELETE` and `UPDATE` the analyzer synthesizes the read-only query that selects exactly
//! the rows the statement would touch. For `INSERT` it counts the supplied rows. Nothing here
//! passes or fails a statement; the output is descriptive.

use serde::Serialize;
use sqlparser::ast::{
    Delete, Expr, FromTable, Join, JoinConstraint, JoinOperator, OrderByExpr, Query, SelectItem,
    SetExpr, Statement as SqlStatement, TableFactor, TableWithJoins,
};
use sqlparser::dialect::MySqlDialect;
use sqlparser::keywords::Keyword;
use sqlparser::parser::{Parser, ParserError};
use tracing::{debug, warn};

use crate::parser::expr::subqueries;
use crate::parser::mysql::{expect_end, split_statements};
use crate::parser::names::qualified_name;

const NOT_DML: &str = "statement provided is not a valid DELETE, UPDATE or INSERT query";

/// Kind of data-modifying statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmlKind {
    /// `DELETE`.
    Delete,
    /// `UPDATE`.
    Update,
    /// `INSERT` or `REPLACE`.
    Insert,
}

impl DmlKind {
    /// Upper-case label used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            DmlKind::Delete => "DELETE",
            DmlKind::Update => "UPDATE",
            DmlKind::Insert => "INSERT",
        }
    }
}

/// Analysis of one statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DmlReport {
    /// Statement text, trimmed.
    pub sql: String,
    /// Referenced tables, deduplicated in encounter order.
    pub tables: Vec<String>,
    /// `DELETE`, `UPDATE` or `INSERT`; empty on error.
    pub dml_type: String,
    /// Query selecting the affected rows, or the row source of an insert.
    pub scan_clause: String,
    /// Number of `VALUES` rows of an insert.
    pub insert_count: usize,
    /// Set only when the statement could not be analyzed.
    pub error_msg: String,
}

impl DmlReport {
    fn new(sql: &str) -> Self {
        Self {
            sql: sql.trim().to_string(),
            ..Self::default()
        }
    }

    fn failed(sql: &str, error: impl Into<String>) -> Self {
        Self {
            error_msg: error.into(),
            ..Self::new(sql)
        }
    }

    /// Statement kind, if the statement was analyzed.
    pub fn kind(&self) -> Option<DmlKind> {
        [DmlKind::Delete, DmlKind::Update, DmlKind::Insert]
            .into_iter()
            .find(|kind| kind.as_str() == self.dml_type)
    }

    fn set_tables(&mut self, tables: impl IntoIterator<Item = String>) {
        for table in tables {
            if !self.tables.contains(&table) {
                self.tables.push(table);
            }
        }
    }
}

/// A parsed statement. `UPDATE` is parsed in its MySQL form, which the generic parser
/// only accepts for a single table without `ORDER BY` or `LIMIT`.
enum Parsed {
    Update(Update),
    Other(SqlStatement),
}

/// `UPDATE table_references SET .. [WHERE ..] [ORDER BY ..] [LIMIT n]`.
struct Update {
    sources: Vec<TableWithJoins>,
    selection: Option<Expr>,
    order_by: Vec<OrderByExpr>,
    limit: Option<Expr>,
}

/// Analyze every statement of a batch.
///
/// A syntax error anywhere yields a single report for the whole input.
pub fn analyze(sql: &str) -> Vec<DmlReport> {
    match parse_all(sql) {
        Ok(statements) => statements
            .into_iter()
            .map(|(text, parsed)| analyze_statement(&text, &parsed))
            .collect(),
        Err(err) => {
            warn!(error = %err, "failed to parse DML batch");
            vec![DmlReport::failed(sql, format!("Syntax error: {err}"))]
        }
    }
}

fn parse_all(sql: &str) -> Result<Vec<(String, Parsed)>, ParserError> {
    split_statements(sql)?
        .into_iter()
        .map(|fragment| {
            let dialect = MySqlDialect {};
            let mut parser = Parser::new(&dialect).with_tokens_with_locations(fragment.tokens);
            let parsed = if parser.parse_keyword(Keyword::UPDATE) {
                Parsed::Update(parse_update(&mut parser)?)
            } else {
                Parsed::Other(parser.parse_statement()?)
            };
            expect_end(&parser)?;
            Ok((fragment.text, parsed))
        })
        .collect()
}

/// Everything after the `UPDATE` keyword, comma-separated table references included.
fn parse_update(parser: &mut Parser<'_>) -> Result<Update, ParserError> {
    let _ = parser.parse_keyword(Keyword::LOW_PRIORITY);
    let _ = parser.parse_keyword(Keyword::IGNORE);
    let sources = parser.parse_comma_separated(Parser::parse_table_and_joins)?;
    parser.expect_keyword(Keyword::SET)?;
    parser.parse_comma_separated(Parser::parse_assignment)?;
    let selection = if parser.parse_keyword(Keyword::WHERE) {
        Some(parser.parse_expr()?)
    } else {
        None
    };
    let order_by = if parser.parse_keywords(&[Keyword::ORDER, Keyword::BY]) {
        parser.parse_comma_separated(|p| p.parse_order_by_expr())?
    } else {
        Vec::new()
    };
    let limit = if parser.parse_keyword(Keyword::LIMIT) {
        Some(parser.parse_expr()?)
    } else {
        None
    };
    Ok(Update {
        sources,
        selection,
        order_by,
        limit,
    })
}

fn analyze_statement(sql: &str, parsed: &Parsed) -> DmlReport {
    let mut report = DmlReport::new(sql);
    match parsed {
        Parsed::Update(update) => {
            report.dml_type = DmlKind::Update.as_str().to_string();
            report.set_tables(referenced_tables(&update.sources));
            report.scan_clause = scan_clause(
                &update.sources,
                update.selection.as_ref(),
                &update.order_by,
                update.limit.as_ref(),
            );
        }
        Parsed::Other(SqlStatement::Delete(delete)) => {
            let sources = delete_sources(delete);
            report.dml_type = DmlKind::Delete.as_str().to_string();
            report.set_tables(referenced_tables(sources));
            report.scan_clause = scan_clause(
                sources,
                delete.selection.as_ref(),
                &delete.order_by,
                delete.limit.as_ref(),
            );
        }
        Parsed::Other(SqlStatement::Insert(insert)) => {
            report.dml_type = DmlKind::Insert.as_str().to_string();
            report.set_tables([qualified_name(&insert.table_name)]);
            if let Some(source) = &insert.source {
                match source.body.as_ref() {
                    SetExpr::Values(values) => report.insert_count = values.rows.len(),
                    _ => report.scan_clause = source.to_string(),
                }
            }
        }
        Parsed::Other(_) => report.error_msg = NOT_DML.to_string(),
    }
    debug!(
        dml_type = %report.dml_type,
        tables = report.tables.len(),
        "analyzed statement"
    );
    report
}

/// `USING` tables when present, otherwise the `FROM` list.
fn delete_sources(delete: &Delete) -> &[TableWithJoins] {
    match (&delete.using, &delete.from) {
        (Some(using), _) => using,
        (None, FromTable::WithFromKeyword(from) | FromTable::WithoutKeyword(from)) => from,
    }
}

fn scan_clause(
    sources: &[TableWithJoins],
    selection: Option<&Expr>,
    order_by: &[OrderByExpr],
    limit: Option<&Expr>,
) -> String {
    let mut clause = format!("SELECT DISTINCT * FROM {}", join(sources));
    if let Some(selection) = selection {
        clause.push_str(&format!(" WHERE {selection}"));
    }
    if !order_by.is_empty() {
        clause.push_str(&format!(" ORDER BY {}", join(order_by)));
    }
    if let Some(limit) = limit {
        clause.push_str(&format!(" LIMIT {limit}"));
    }
    clause
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Tables named anywhere in a FROM tree, in encounter order, duplicates kept. Subqueries in
/// join conditions and inside derived tables count.
fn referenced_tables(sources: &[TableWithJoins]) -> Vec<String> {
    sources.iter().flat_map(tables_in_join).collect()
}

fn tables_in_join(table: &TableWithJoins) -> Vec<String> {
    let mut tables = tables_in_factor(&table.relation);
    for join in &table.joins {
        tables.extend(tables_in_factor(&join.relation));
        if let Some(JoinConstraint::On(condition)) = join_constraint(join) {
            tables.extend(tables_in_subqueries(condition));
        }
    }
    tables
}

fn join_constraint(join: &Join) -> Option<&JoinConstraint> {
    match &join.join_operator {
        JoinOperator::Inner(constraint)
        | JoinOperator::LeftOuter(constraint)
        | JoinOperator::RightOuter(constraint)
        | JoinOperator::FullOuter(constraint)
        | JoinOperator::Semi(constraint)
        | JoinOperator::LeftSemi(constraint)
        | JoinOperator::RightSemi(constraint)
        | JoinOperator::Anti(constraint)
        | JoinOperator::LeftAnti(constraint)
        | JoinOperator::RightAnti(constraint)
        | JoinOperator::AsOf { constraint, .. } => Some(constraint),
        JoinOperator::CrossJoin | JoinOperator::CrossApply | JoinOperator::OuterApply => None,
    }
}

fn tables_in_subqueries(expr: &Expr) -> Vec<String> {
    subqueries(expr).into_iter().flat_map(tables_in_query).collect()
}

fn tables_in_factor(factor: &TableFactor) -> Vec<String> {
    match factor {
        TableFactor::Table { name, .. } => vec![qualified_name(name)],
        TableFactor::Derived { subquery, .. } => tables_in_query(subquery),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => tables_in_join(table_with_joins),
        _ => Vec::new(),
    }
}

fn tables_in_query(query: &Query) -> Vec<String> {
    tables_in_set_expr(&query.body)
}

fn tables_in_set_expr(body: &SetExpr) -> Vec<String> {
    match body {
        SetExpr::Select(select) => {
            let mut tables = referenced_tables(&select.from);
            let projected = select.projection.iter().filter_map(|item| match item {
                SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => {
                    Some(expr)
                }
                _ => None,
            });
            for expr in projected
                .chain(select.selection.as_ref())
                .chain(select.having.as_ref())
            {
                tables.extend(tables_in_subqueries(expr));
            }
            tables
        }
        SetExpr::Query(query) => tables_in_query(query),
        SetExpr::SetOperation { left, right, .. } => {
            let mut tables = tables_in_set_expr(left);
            tables.extend(tables_in_set_expr(right));
            tables
        }
        _ => Vec::new(),
    }
}
