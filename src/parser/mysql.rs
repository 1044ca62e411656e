//! MySQL statement front end.
//!
//! A batch is tokenized once with the `sqlparser` MySQL tokenizer, split on top-level
//! semicolons, and each fragment is parsed into [`Statement`]. The schema statements the
//! rule engine governs (`CREATE TABLE`, `ALTER TABLE` and the forms it rejects outright) are
//! parsed here on top of `sqlparser` primitives, since their MySQL grammar (free-order table
//! options, partitioning, key-part lengths, alter specs) goes beyond the generic AST. Every
//! other statement is delegated to [`Parser::parse_statement`].

use sqlparser::ast::{
    ColumnDef, ColumnOption, ColumnOptionDef, DataType, Expr, Statement as SqlStatement,
};
use sqlparser::dialect::MySqlDialect;
use sqlparser::keywords::Keyword;
use sqlparser::parser::{IsOptional, Parser, ParserError};
use sqlparser::tokenizer::{Location, Token, TokenWithSpan, Tokenizer, Word};
use tracing::debug;

use super::statement::{
    AlterApproach, AlterSpec, AlterTable, ColumnPosition, ConstraintKind, CreateTable,
    ForeignReference, IndexKeyword, IndexOption, KeyPart, ParsedStatement, PartitionAction,
    PartitionMethod, PartitionOptions, PartitionStrategy, Statement, SubPartition,
    TableConstraint, TableOption, TableOptionKind,
};

/// One statement-sized slice of a batch.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// Source text, trimmed, without the terminating `;`.
    pub text: String,
    /// Tokens of the fragment, whitespace and comments included.
    pub tokens: Vec<TokenWithSpan>,
}

/// Split a batch on top-level semicolons.
///
/// Fragments holding only whitespace or comments are dropped. A tokenizer failure fails
/// the whole batch.
pub fn split_statements(sql: &str) -> Result<Vec<Fragment>, ParserError> {
    let dialect = MySqlDialect {};
    let tokens = Tokenizer::new(&dialect, sql).tokenize_with_location()?;
    let source = SourceMap::new(sql);

    let mut fragments = Vec::new();
    let mut current: Vec<TokenWithSpan> = Vec::new();
    let mut depth = 0usize;
    for token in tokens {
        match token.token {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            Token::SemiColon if depth == 0 => {
                if let Some(fragment) = source.fragment(std::mem::take(&mut current)) {
                    fragments.push(fragment);
                }
                continue;
            }
            _ => {}
        }
        current.push(token);
    }
    if let Some(fragment) = source.fragment(current) {
        fragments.push(fragment);
    }
    Ok(fragments)
}

/// Parse every statement of a batch.
///
/// A syntax error in any fragment fails the whole batch.
pub fn parse_batch(sql: &str) -> Result<Vec<ParsedStatement>, ParserError> {
    let fragments = split_statements(sql)?;
    debug!(fragments = fragments.len(), "split batch");
    fragments
        .into_iter()
        .map(|fragment| {
            let statement = parse_fragment(fragment.tokens)?;
            Ok(ParsedStatement {
                sql: fragment.text,
                statement,
            })
        })
        .collect()
}

/// Parse the tokens of a single fragment.
pub fn parse_fragment(tokens: Vec<TokenWithSpan>) -> Result<Statement, ParserError> {
    let dialect = MySqlDialect {};
    let mut parser = Parser::new(&dialect).with_tokens_with_locations(tokens);
    let statement = parse_statement(&mut parser)?;
    expect_end(&parser)?;
    Ok(statement)
}

/// Byte offsets of 1-based line/column token locations.
struct SourceMap<'a> {
    sql: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> SourceMap<'a> {
    fn new(sql: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(sql.match_indices('\n').map(|(index, _)| index + 1))
            .collect();
        Self { sql, line_starts }
    }

    fn offset(&self, location: Location) -> usize {
        let line = usize::try_from(location.line).unwrap_or(usize::MAX);
        let Some(&start) = line.checked_sub(1).and_then(|line| self.line_starts.get(line)) else {
            return self.sql.len();
        };
        let column = usize::try_from(location.column).unwrap_or(usize::MAX);
        self.sql[start..]
            .char_indices()
            .nth(column.saturating_sub(1))
            .map_or(self.sql.len(), |(index, _)| start + index)
    }

    fn fragment(&self, tokens: Vec<TokenWithSpan>) -> Option<Fragment> {
        let mut significant = tokens
            .iter()
            .filter(|token| !matches!(token.token, Token::Whitespace(_)));
        let first = significant.next()?;
        let last = significant.last().unwrap_or(first);
        let start = self.offset(first.span.start);
        let end = self.offset(last.span.end).max(start);
        Some(Fragment {
            text: self.sql[start..end].trim().to_string(),
            tokens,
        })
    }
}

fn parse_statement(parser: &mut Parser<'_>) -> Result<Statement, ParserError> {
    match word_at(parser, 0).as_deref() {
        Some("CREATE") => parse_create(parser),
        Some("ALTER") => parse_alter(parser),
        Some("DROP") => parse_drop(parser),
        Some("TRUNCATE") => {
            skip_to_end(parser);
            Ok(Statement::DropTable)
        }
        Some("RENAME") if is_word(parser, 1, "TABLE") => {
            parser.next_token();
            parser.next_token();
            parser.parse_comma_separated(|parser| {
                parser.parse_object_name(false)?;
                parser.expect_keyword(Keyword::TO)?;
                parser.parse_object_name(false)
            })?;
            Ok(Statement::RenameTable)
        }
        _ => parser.parse_statement().map(classify),
    }
}

fn parse_create(parser: &mut Parser<'_>) -> Result<Statement, ParserError> {
    let target = match (word_at(parser, 1), word_at(parser, 2)) {
        (Some(first), second) if first == "TEMPORARY" && second.as_deref() == Some("TABLE") => {
            "TEMPORARY TABLE"
        }
        (Some(first), _) if first == "TABLE" => "TABLE",
        (Some(first), _) if first == "INDEX" => "INDEX",
        (Some(first), Some(second))
            if matches!(first.as_str(), "UNIQUE" | "FULLTEXT" | "SPATIAL") && second == "INDEX" =>
        {
            "INDEX"
        }
        (Some(first), _) if first == "DATABASE" || first == "SCHEMA" => "DATABASE",
        _ => return parser.parse_statement().map(classify),
    };
    parser.next_token();
    match target {
        "TEMPORARY TABLE" | "TABLE" => {
            let temporary = eat_word(parser, "TEMPORARY");
            eat_word(parser, "TABLE");
            parse_create_table(parser, temporary).map(|table| Statement::CreateTable(Box::new(table)))
        }
        "INDEX" => {
            skip_to_end(parser);
            Ok(Statement::ModifyIndex)
        }
        _ => {
            skip_to_end(parser);
            Ok(Statement::ModifyDatabase)
        }
    }
}

fn parse_alter(parser: &mut Parser<'_>) -> Result<Statement, ParserError> {
    let table_at = if is_word(parser, 1, "IGNORE") { 2 } else { 1 };
    if is_word(parser, table_at, "TABLE") {
        for _ in 0..=table_at {
            parser.next_token();
        }
        return parse_alter_table(parser).map(Statement::AlterTable);
    }
    if is_word(parser, 1, "DATABASE") || is_word(parser, 1, "SCHEMA") {
        skip_to_end(parser);
        return Ok(Statement::ModifyDatabase);
    }
    parser.parse_statement().map(classify)
}

fn parse_drop(parser: &mut Parser<'_>) -> Result<Statement, ParserError> {
    let statement = match word_at(parser, 1).as_deref() {
        Some("TABLE") => Statement::DropTable,
        Some("TEMPORARY") if is_word(parser, 2, "TABLE") => Statement::DropTable,
        Some("INDEX") => Statement::ModifyIndex,
        Some("DATABASE" | "SCHEMA") => Statement::ModifyDatabase,
        _ => return parser.parse_statement().map(classify),
    };
    skip_to_end(parser);
    Ok(statement)
}

/// Classify a statement parsed by `sqlparser` itself.
fn classify(statement: SqlStatement) -> Statement {
    match statement {
        SqlStatement::CreateIndex(_) => Statement::ModifyIndex,
        SqlStatement::CreateDatabase { .. } | SqlStatement::CreateSchema { .. } => {
            Statement::ModifyDatabase
        }
        SqlStatement::Truncate { .. } => Statement::DropTable,
        SqlStatement::CreateView { .. }
        | SqlStatement::CreateVirtualTable { .. }
        | SqlStatement::CreateRole { .. }
        | SqlStatement::CreateFunction(_)
        | SqlStatement::CreateTrigger { .. }
        | SqlStatement::CreateProcedure { .. }
        | SqlStatement::CreateSequence { .. }
        | SqlStatement::CreateType { .. }
        | SqlStatement::CreateExtension { .. }
        | SqlStatement::CreatePolicy { .. }
        | SqlStatement::AlterView { .. }
        | SqlStatement::AlterIndex { .. }
        | SqlStatement::AlterRole { .. }
        | SqlStatement::AlterPolicy { .. }
        | SqlStatement::Drop { .. }
        | SqlStatement::DropFunction { .. }
        | SqlStatement::DropProcedure { .. }
        | SqlStatement::DropTrigger { .. }
        | SqlStatement::DropPolicy { .. }
        | SqlStatement::Comment { .. } => Statement::Unsupported(statement.to_string()),
        _ => Statement::NotDdl,
    }
}

fn parse_create_table(parser: &mut Parser<'_>, temporary: bool) -> Result<CreateTable, ParserError> {
    let if_not_exists = eat_words(parser, &["IF", "NOT", "EXISTS"]);
    let name = parser.parse_object_name(false)?;
    let mut table = CreateTable {
        name,
        temporary,
        if_not_exists,
        like: None,
        query: None,
        columns: Vec::new(),
        constraints: Vec::new(),
        options: Vec::new(),
        partition: None,
    };

    if eat_word(parser, "LIKE") {
        table.like = Some(parser.parse_object_name(false)?);
        return Ok(table);
    }
    if parser.peek_token().token == Token::LParen && is_word(parser, 1, "LIKE") {
        parser.next_token();
        parser.next_token();
        table.like = Some(parser.parse_object_name(false)?);
        parser.expect_token(&Token::RParen)?;
        return Ok(table);
    }

    if parser.peek_token().token == Token::LParen && !is_query_start(parser, 1) {
        parser.next_token();
        loop {
            if is_constraint_start(parser) {
                table.constraints.push(parse_table_constraint(parser)?);
            } else {
                table.columns.push(parse_column_def(parser)?);
            }
            if !parser.consume_token(&Token::Comma) {
                parser.expect_token(&Token::RParen)?;
                break;
            }
        }
    }

    table.options = parse_table_options(parser)?;
    if eat_words(parser, &["PARTITION", "BY"]) {
        table.partition = Some(parse_partition_options(parser)?);
    }

    let _ = eat_word(parser, "IGNORE") || eat_word(parser, "REPLACE");
    eat_word(parser, "AS");
    if is_query_start(parser, 0) {
        table.query = Some(parser.parse_query()?);
    }
    Ok(table)
}

fn is_query_start(parser: &Parser<'_>, n: usize) -> bool {
    is_word(parser, n, "SELECT")
        || is_word(parser, n, "WITH")
        || is_word(parser, n, "VALUES")
        || is_word(parser, n, "TABLE")
        || (parser.peek_nth_token(n).token == Token::LParen && is_query_start(parser, n + 1))
}

/// Column definition with the MySQL attributes `sqlparser` does not model.
pub(crate) fn parse_column_def(parser: &mut Parser<'_>) -> Result<ColumnDef, ParserError> {
    let name = parser.parse_identifier(false)?;
    let data_type = parser.parse_data_type()?;
    let mut collation = None;
    let mut options = Vec::new();
    loop {
        if skip_column_attribute(parser)? {
            continue;
        }
        if eat_word(parser, "UNIQUE") {
            eat_word(parser, "KEY");
            options.push(unnamed(ColumnOption::Unique {
                is_primary: false,
                characteristics: None,
            }));
        } else if eat_word(parser, "KEY") {
            options.push(unnamed(ColumnOption::Unique {
                is_primary: true,
                characteristics: None,
            }));
        } else if parser.parse_keyword(Keyword::COLLATE) {
            collation = Some(parser.parse_object_name(false)?);
        } else if parser.parse_keyword(Keyword::CONSTRAINT) {
            let name = Some(parser.parse_identifier(false)?);
            match parser.parse_optional_column_option()? {
                Some(option) => options.push(ColumnOptionDef { name, option }),
                None => {
                    return parser.expected(
                        "constraint details after CONSTRAINT <name>",
                        parser.peek_token(),
                    )
                }
            }
        } else if let Some(option) = parser.parse_optional_column_option()? {
            options.push(unnamed(option));
        } else {
            break;
        }
    }
    Ok(ColumnDef {
        name,
        data_type,
        collation,
        options,
    })
}

fn unnamed(option: ColumnOption) -> ColumnOptionDef {
    ColumnOptionDef { name: None, option }
}

fn skip_column_attribute(parser: &mut Parser<'_>) -> Result<bool, ParserError> {
    if eat_any_word(parser, &["SIGNED", "UNSIGNED", "ZEROFILL", "VISIBLE", "INVISIBLE"]).is_some() {
        return Ok(true);
    }
    if eat_word(parser, "SRID") {
        parser.parse_literal_uint()?;
        return Ok(true);
    }
    if eat_any_word(parser, &["COLUMN_FORMAT", "STORAGE", "CHARSET"]).is_some() {
        parse_word_value(parser)?;
        return Ok(true);
    }
    Ok(false)
}

fn is_constraint_start(parser: &Parser<'_>) -> bool {
    matches!(
        word_at(parser, 0).as_deref(),
        Some(
            "CONSTRAINT" | "PRIMARY" | "UNIQUE" | "KEY" | "INDEX" | "FULLTEXT" | "SPATIAL"
                | "FOREIGN" | "CHECK"
        )
    )
}

fn parse_index_keyword(parser: &mut Parser<'_>) -> Option<IndexKeyword> {
    if eat_word(parser, "KEY") {
        Some(IndexKeyword::Key)
    } else if eat_word(parser, "INDEX") {
        Some(IndexKeyword::Index)
    } else {
        None
    }
}

/// Table-level constraint or index definition.
pub(crate) fn parse_table_constraint(
    parser: &mut Parser<'_>,
) -> Result<TableConstraint, ParserError> {
    let symbol = if eat_word(parser, "CONSTRAINT") && !is_constraint_start(parser) {
        Some(parser.parse_identifier(false)?)
    } else {
        None
    };

    let (kind, keyword) = if eat_words(parser, &["PRIMARY", "KEY"]) {
        (ConstraintKind::PrimaryKey, None)
    } else if eat_word(parser, "UNIQUE") {
        (ConstraintKind::Unique, parse_index_keyword(parser))
    } else if eat_word(parser, "FULLTEXT") {
        (ConstraintKind::FullText, parse_index_keyword(parser))
    } else if eat_word(parser, "SPATIAL") {
        (ConstraintKind::Spatial, parse_index_keyword(parser))
    } else if eat_words(parser, &["FOREIGN", "KEY"]) {
        (ConstraintKind::ForeignKey, None)
    } else if eat_word(parser, "CHECK") {
        (ConstraintKind::Check, None)
    } else if let Some(keyword) = parse_index_keyword(parser) {
        (ConstraintKind::Index, Some(keyword))
    } else {
        return parser.expected("a table constraint", parser.peek_token());
    };

    let mut constraint = TableConstraint {
        kind,
        symbol,
        index_name: None,
        keyword,
        key_parts: Vec::new(),
        reference: None,
        check: None,
        options: Vec::new(),
    };

    if kind == ConstraintKind::Check {
        parser.expect_token(&Token::LParen)?;
        constraint.check = Some(parser.parse_expr()?);
        parser.expect_token(&Token::RParen)?;
        let _ = eat_words(parser, &["NOT", "ENFORCED"]) || eat_word(parser, "ENFORCED");
        return Ok(constraint);
    }

    if parser.peek_token().token != Token::LParen && !is_word(parser, 0, "USING") {
        constraint.index_name = Some(parser.parse_identifier(false)?);
    }
    if eat_word(parser, "USING") {
        constraint.options.push(IndexOption::Using(parse_word_value(parser)?));
    }
    constraint.key_parts = parse_key_parts(parser)?;
    if kind == ConstraintKind::ForeignKey {
        constraint.reference = Some(parse_foreign_reference(parser)?);
    }
    constraint.options.extend(parse_index_options(parser)?);
    Ok(constraint)
}

fn parse_key_parts(parser: &mut Parser<'_>) -> Result<Vec<KeyPart>, ParserError> {
    parser.expect_token(&Token::LParen)?;
    let parts = parser.parse_comma_separated(|parser| {
        let column = parser.parse_identifier(false)?;
        let length = if parser.consume_token(&Token::LParen) {
            let length = parser.parse_literal_uint()?;
            parser.expect_token(&Token::RParen)?;
            Some(length)
        } else {
            None
        };
        let asc = if parser.parse_keyword(Keyword::ASC) {
            Some(true)
        } else if parser.parse_keyword(Keyword::DESC) {
            Some(false)
        } else {
            None
        };
        Ok(KeyPart {
            column,
            length,
            asc,
        })
    })?;
    parser.expect_token(&Token::RParen)?;
    Ok(parts)
}

fn parse_foreign_reference(parser: &mut Parser<'_>) -> Result<ForeignReference, ParserError> {
    parser.expect_keyword(Keyword::REFERENCES)?;
    let table = parser.parse_object_name(false)?;
    let columns = parse_key_parts(parser)?
        .into_iter()
        .map(|part| part.column)
        .collect();
    let mut reference = ForeignReference {
        table,
        columns,
        on_delete: None,
        on_update: None,
    };
    loop {
        if eat_word(parser, "MATCH") {
            parse_word_value(parser)?;
        } else if reference.on_delete.is_none() && eat_words(parser, &["ON", "DELETE"]) {
            reference.on_delete = Some(parser.parse_referential_action()?);
        } else if reference.on_update.is_none() && eat_words(parser, &["ON", "UPDATE"]) {
            reference.on_update = Some(parser.parse_referential_action()?);
        } else {
            return Ok(reference);
        }
    }
}

fn parse_index_options(parser: &mut Parser<'_>) -> Result<Vec<IndexOption>, ParserError> {
    let mut options = Vec::new();
    loop {
        if eat_word(parser, "USING") {
            options.push(IndexOption::Using(parse_word_value(parser)?));
        } else if eat_word(parser, "COMMENT") {
            options.push(IndexOption::Comment(parser.parse_literal_string()?));
        } else if eat_word(parser, "KEY_BLOCK_SIZE") {
            let _ = parser.consume_token(&Token::Eq);
            options.push(IndexOption::KeyBlockSize(parser.parse_literal_uint()?));
        } else if eat_word(parser, "VISIBLE") {
            options.push(IndexOption::Visible(true));
        } else if eat_word(parser, "INVISIBLE") {
            options.push(IndexOption::Visible(false));
        } else if eat_words(parser, &["WITH", "PARSER"]) {
            options.push(IndexOption::Parser(parser.parse_identifier(false)?));
        } else {
            return Ok(options);
        }
    }
}

const GENERIC_TABLE_OPTIONS: &[&str] = &[
    "AUTOEXTEND_SIZE",
    "AVG_ROW_LENGTH",
    "CHECKSUM",
    "COMPRESSION",
    "CONNECTION",
    "DELAY_KEY_WRITE",
    "ENCRYPTION",
    "ENGINE_ATTRIBUTE",
    "INSERT_METHOD",
    "KEY_BLOCK_SIZE",
    "MAX_ROWS",
    "MIN_ROWS",
    "PACK_KEYS",
    "PASSWORD",
    "ROW_FORMAT",
    "SECONDARY_ENGINE",
    "SECONDARY_ENGINE_ATTRIBUTE",
    "STATS_AUTO_RECALC",
    "STATS_PERSISTENT",
    "STATS_SAMPLE_PAGES",
    "TABLESPACE",
    "UNION",
];

fn is_table_option_start(parser: &Parser<'_>, n: usize) -> bool {
    let Some(word) = word_at(parser, n) else {
        return false;
    };
    match word.as_str() {
        "ENGINE" | "CHARSET" | "COLLATE" | "AUTO_INCREMENT" | "COMMENT" => true,
        "CHARACTER" => is_word(parser, n + 1, "SET"),
        "DEFAULT" => {
            is_word(parser, n + 1, "CHARSET")
                || is_word(parser, n + 1, "COLLATE")
                || (is_word(parser, n + 1, "CHARACTER") && is_word(parser, n + 2, "SET"))
        }
        "DATA" | "INDEX" => is_word(parser, n + 1, "DIRECTORY"),
        other => GENERIC_TABLE_OPTIONS.contains(&other),
    }
}

/// Table options in any order, optionally comma separated.
fn parse_table_options(parser: &mut Parser<'_>) -> Result<Vec<TableOption>, ParserError> {
    let mut options = Vec::new();
    loop {
        if !options.is_empty()
            && parser.peek_token().token == Token::Comma
            && is_table_option_start(parser, 1)
        {
            parser.next_token();
        }
        if !is_table_option_start(parser, 0) {
            return Ok(options);
        }
        options.push(parse_table_option(parser)?);
    }
}

fn parse_table_option(parser: &mut Parser<'_>) -> Result<TableOption, ParserError> {
    eat_word(parser, "DEFAULT");
    let kind = if eat_word(parser, "ENGINE") {
        TableOptionKind::Engine
    } else if eat_word(parser, "CHARSET") || eat_words(parser, &["CHARACTER", "SET"]) {
        TableOptionKind::Charset
    } else if eat_word(parser, "COLLATE") {
        TableOptionKind::Collate
    } else if eat_word(parser, "AUTO_INCREMENT") {
        TableOptionKind::AutoIncrement
    } else if eat_word(parser, "COMMENT") {
        TableOptionKind::Comment
    } else if let Some(word) = eat_any_word(parser, &["DATA", "INDEX"]) {
        eat_word(parser, "DIRECTORY");
        TableOptionKind::Other(format!("{word} DIRECTORY"))
    } else if let Some(word) = eat_any_word(parser, GENERIC_TABLE_OPTIONS) {
        TableOptionKind::Other(word)
    } else {
        return parser.expected("a table option", parser.peek_token());
    };
    let _ = parser.consume_token(&Token::Eq);

    if eat_word(parser, "DEFAULT") {
        return Ok(TableOption {
            kind,
            value: String::new(),
            is_default: true,
        });
    }
    let value = match kind {
        TableOptionKind::Other(_) if parser.peek_token().token == Token::LParen => {
            parse_balanced_text(parser)?
        }
        TableOptionKind::Other(_) => parser.next_token().token.to_string(),
        _ => parse_word_value(parser)?,
    };
    Ok(TableOption {
        kind,
        value,
        is_default: false,
    })
}

fn parse_partition_method(parser: &mut Parser<'_>) -> Result<PartitionMethod, ParserError> {
    let linear = eat_word(parser, "LINEAR");
    let mut method = PartitionMethod {
        strategy: PartitionStrategy::Hash,
        linear,
        expr: None,
        columns: Vec::new(),
        algorithm: None,
    };
    if eat_word(parser, "HASH") {
        method.expr = Some(parse_parenthesized_expr(parser)?);
    } else if eat_word(parser, "KEY") {
        method.strategy = PartitionStrategy::Key;
        if eat_word(parser, "ALGORITHM") {
            let _ = parser.consume_token(&Token::Eq);
            method.algorithm = Some(parser.parse_literal_uint()?);
        }
        method.columns = parser.parse_parenthesized_column_list(IsOptional::Mandatory, true)?;
    } else if let Some(word) = eat_any_word(parser, &["RANGE", "LIST"]) {
        method.strategy = if word == "RANGE" {
            PartitionStrategy::Range
        } else {
            PartitionStrategy::List
        };
        if eat_word(parser, "COLUMNS") {
            method.columns =
                parser.parse_parenthesized_column_list(IsOptional::Mandatory, false)?;
        } else {
            method.expr = Some(parse_parenthesized_expr(parser)?);
        }
    } else {
        return parser.expected("HASH, KEY, RANGE or LIST", parser.peek_token());
    }
    Ok(method)
}

/// Everything after `PARTITION BY`.
fn parse_partition_options(parser: &mut Parser<'_>) -> Result<PartitionOptions, ParserError> {
    let method = parse_partition_method(parser)?;
    let count = if eat_word(parser, "PARTITIONS") {
        Some(parser.parse_literal_uint()?)
    } else {
        None
    };
    let sub = if eat_words(parser, &["SUBPARTITION", "BY"]) {
        let method = parse_partition_method(parser)?;
        let count = if eat_word(parser, "SUBPARTITIONS") {
            Some(parser.parse_literal_uint()?)
        } else {
            None
        };
        Some(SubPartition { method, count })
    } else {
        None
    };
    let definitions = if parser.peek_token().token == Token::LParen {
        Some(parse_balanced_text(parser)?)
    } else {
        None
    };
    Ok(PartitionOptions {
        method,
        count,
        sub,
        definitions,
    })
}

fn parse_parenthesized_expr(parser: &mut Parser<'_>) -> Result<Expr, ParserError> {
    parser.expect_token(&Token::LParen)?;
    let expr = parser.parse_expr()?;
    parser.expect_token(&Token::RParen)?;
    Ok(expr)
}

/// Restore a parenthesized group verbatim, collapsing whitespace runs to one space.
fn parse_balanced_text(parser: &mut Parser<'_>) -> Result<String, ParserError> {
    parser.expect_token(&Token::LParen)?;
    let mut text = String::from("(");
    let mut depth = 1usize;
    while depth > 0 {
        let Some(token) = parser.next_token_no_skip().map(|token| token.token.clone()) else {
            return parser.expected(")", TokenWithSpan::new_eof());
        };
        match token {
            Token::EOF => return parser.expected(")", TokenWithSpan::new_eof()),
            Token::Whitespace(_) => {
                if !text.ends_with([' ', '(']) {
                    text.push(' ');
                }
                continue;
            }
            Token::LParen => depth += 1,
            Token::RParen => {
                depth -= 1;
                if text.ends_with(' ') {
                    text.pop();
                }
            }
            _ => {}
        }
        text.push_str(&token.to_string());
    }
    Ok(text)
}

fn parse_alter_table(parser: &mut Parser<'_>) -> Result<AlterTable, ParserError> {
    let name = parser.parse_object_name(false)?;
    let mut specs = Vec::new();
    if parser.peek_token().token != Token::EOF {
        loop {
            specs.push(parse_alter_spec(parser)?);
            if !parser.consume_token(&Token::Comma) {
                break;
            }
        }
    }
    if eat_words(parser, &["PARTITION", "BY"]) {
        let options = parse_partition_options(parser)?;
        specs.push(AlterSpec::Partition(PartitionAction::Repartition(Box::new(
            options,
        ))));
    }
    Ok(AlterTable { name, specs })
}

fn parse_alter_spec(parser: &mut Parser<'_>) -> Result<AlterSpec, ParserError> {
    if is_table_option_start(parser, 0) {
        return parse_table_options(parser).map(AlterSpec::Options);
    }
    let Some(word) = word_at(parser, 0) else {
        return parser.expected("an ALTER TABLE operation", parser.peek_token());
    };
    match word.as_str() {
        "ADD" => {
            parser.next_token();
            parse_alter_add(parser)
        }
        "DROP" => {
            parser.next_token();
            parse_alter_drop(parser)
        }
        "MODIFY" => {
            parser.next_token();
            eat_word(parser, "COLUMN");
            let column = parse_column_def(parser)?;
            let position = parse_column_position(parser)?;
            Ok(AlterSpec::ModifyColumn { column, position })
        }
        "CHANGE" => {
            parser.next_token();
            eat_word(parser, "COLUMN");
            let old_name = parser.parse_identifier(false)?;
            let column = parse_column_def(parser)?;
            let position = parse_column_position(parser)?;
            Ok(AlterSpec::ChangeColumn {
                old_name,
                column,
                position,
            })
        }
        "RENAME" => {
            parser.next_token();
            parse_alter_rename(parser)
        }
        "ALTER" => {
            parser.next_token();
            parse_alter_alter(parser)
        }
        "CONVERT" => {
            parser.next_token();
            parser.expect_keyword(Keyword::TO)?;
            if !(eat_word(parser, "CHARSET") || eat_words(parser, &["CHARACTER", "SET"])) {
                return parser.expected("CHARACTER SET", parser.peek_token());
            }
            let mut options = vec![TableOption {
                kind: TableOptionKind::Charset,
                value: parse_word_value(parser)?,
                is_default: false,
            }];
            if eat_word(parser, "COLLATE") {
                options.push(TableOption {
                    kind: TableOptionKind::Collate,
                    value: parse_word_value(parser)?,
                    is_default: false,
                });
            }
            Ok(AlterSpec::Options(options))
        }
        "ENABLE" | "DISABLE" => {
            parser.next_token();
            parser.expect_keyword(Keyword::KEYS)?;
            Ok(AlterSpec::Keys {
                enabled: word == "ENABLE",
            })
        }
        "LOCK" | "ALGORITHM" => {
            parser.next_token();
            let _ = parser.consume_token(&Token::Eq);
            let value = parse_word_value(parser)?;
            Ok(AlterSpec::Approach(if word == "LOCK" {
                AlterApproach::Lock(value)
            } else {
                AlterApproach::Algorithm(value)
            }))
        }
        "FORCE" => {
            parser.next_token();
            Ok(AlterSpec::Approach(AlterApproach::Force))
        }
        "WITH" | "WITHOUT" if is_word(parser, 1, "VALIDATION") => {
            parser.next_token();
            parser.next_token();
            Ok(AlterSpec::Approach(if word == "WITH" {
                AlterApproach::WithValidation
            } else {
                AlterApproach::WithoutValidation
            }))
        }
        "ORDER" => {
            parser.next_token();
            parser.expect_keyword(Keyword::BY)?;
            let columns = parser.parse_comma_separated(|parser| parser.parse_order_by_expr())?;
            let columns: Vec<String> = columns.iter().map(ToString::to_string).collect();
            Ok(AlterSpec::Other(format!("ORDER BY {}", columns.join(", "))))
        }
        "DISCARD" | "IMPORT" if is_word(parser, 1, "TABLESPACE") => {
            parser.next_token();
            parser.next_token();
            Ok(AlterSpec::Other(format!("{word} TABLESPACE")))
        }
        "PARTITION" if is_word(parser, 1, "BY") => {
            parser.next_token();
            parser.next_token();
            let options = parse_partition_options(parser)?;
            Ok(AlterSpec::Partition(PartitionAction::Repartition(Box::new(
                options,
            ))))
        }
        _ => parse_partition_maintenance(parser),
    }
}

fn parse_column_position(parser: &mut Parser<'_>) -> Result<Option<ColumnPosition>, ParserError> {
    if eat_word(parser, "FIRST") {
        Ok(Some(ColumnPosition::First))
    } else if eat_word(parser, "AFTER") {
        Ok(Some(ColumnPosition::After(parser.parse_identifier(false)?)))
    } else {
        Ok(None)
    }
}

fn parse_alter_add(parser: &mut Parser<'_>) -> Result<AlterSpec, ParserError> {
    if eat_word(parser, "PARTITION") {
        if eat_word(parser, "PARTITIONS") {
            parser.parse_literal_uint()?;
        } else {
            parse_balanced_text(parser)?;
        }
        return Ok(AlterSpec::Partition(PartitionAction::Add));
    }
    if is_constraint_start(parser) {
        return parse_table_constraint(parser).map(AlterSpec::AddConstraint);
    }
    eat_word(parser, "COLUMN");
    if parser.consume_token(&Token::LParen) {
        let columns = parser.parse_comma_separated(parse_column_def)?;
        parser.expect_token(&Token::RParen)?;
        return Ok(AlterSpec::AddColumns {
            columns,
            position: None,
        });
    }
    let column = parse_column_def(parser)?;
    let position = parse_column_position(parser)?;
    Ok(AlterSpec::AddColumns {
        columns: vec![column],
        position,
    })
}

fn parse_alter_drop(parser: &mut Parser<'_>) -> Result<AlterSpec, ParserError> {
    if eat_words(parser, &["PRIMARY", "KEY"]) {
        return Ok(AlterSpec::DropPrimaryKey);
    }
    if eat_words(parser, &["FOREIGN", "KEY"]) {
        let name = parser.parse_identifier(false)?;
        return Ok(AlterSpec::DropForeignKey { name });
    }
    if parse_index_keyword(parser).is_some() {
        let name = parser.parse_identifier(false)?;
        return Ok(AlterSpec::DropIndex { name });
    }
    if eat_any_word(parser, &["CHECK", "CONSTRAINT"]).is_some() {
        let name = parser.parse_identifier(false)?;
        return Ok(AlterSpec::DropCheck { name });
    }
    if eat_word(parser, "PARTITION") {
        parse_partition_names(parser)?;
        return Ok(AlterSpec::Partition(PartitionAction::Drop));
    }
    eat_word(parser, "COLUMN");
    let name = parser.parse_identifier(false)?;
    Ok(AlterSpec::DropColumn { name })
}

fn parse_alter_rename(parser: &mut Parser<'_>) -> Result<AlterSpec, ParserError> {
    if eat_word(parser, "COLUMN") {
        let old_name = parser.parse_identifier(false)?;
        parser.expect_keyword(Keyword::TO)?;
        let new_name = parser.parse_identifier(false)?;
        return Ok(AlterSpec::RenameColumn { old_name, new_name });
    }
    if parse_index_keyword(parser).is_some() {
        let old_name = parser.parse_identifier(false)?;
        parser.expect_keyword(Keyword::TO)?;
        let new_name = parser.parse_identifier(false)?;
        return Ok(AlterSpec::RenameIndex { old_name, new_name });
    }
    let _ = eat_word(parser, "TO") || eat_word(parser, "AS");
    let new_name = parser.parse_object_name(false)?;
    Ok(AlterSpec::RenameTable { new_name })
}

fn parse_alter_alter(parser: &mut Parser<'_>) -> Result<AlterSpec, ParserError> {
    if eat_word(parser, "INDEX") {
        let name = parser.parse_identifier(false)?;
        let visible = match eat_any_word(parser, &["VISIBLE", "INVISIBLE"]) {
            Some(word) => word == "VISIBLE",
            None => return parser.expected("VISIBLE or INVISIBLE", parser.peek_token()),
        };
        return Ok(AlterSpec::IndexVisibility { name, visible });
    }
    if eat_any_word(parser, &["CHECK", "CONSTRAINT"]).is_some() {
        let name = parser.parse_identifier(false)?;
        let enforced = !eat_word(parser, "NOT");
        if !eat_word(parser, "ENFORCED") {
            return parser.expected("ENFORCED", parser.peek_token());
        }
        return Ok(AlterSpec::CheckEnforcement { name, enforced });
    }

    eat_word(parser, "COLUMN");
    let name = parser.parse_identifier(false)?;
    let mut options = Vec::new();
    if eat_words(parser, &["SET", "DEFAULT"]) {
        let value = if parser.peek_token().token == Token::LParen {
            parse_parenthesized_expr(parser)?
        } else {
            parser.parse_expr()?
        };
        options.push(unnamed(ColumnOption::Default(value)));
    } else if !(eat_words(parser, &["DROP", "DEFAULT"])
        || eat_words(parser, &["SET", "VISIBLE"])
        || eat_words(parser, &["SET", "INVISIBLE"]))
    {
        return parser.expected("SET DEFAULT, DROP DEFAULT or SET VISIBLE", parser.peek_token());
    }
    Ok(AlterSpec::AlterColumn {
        column: ColumnDef {
            name,
            data_type: DataType::Unspecified,
            collation: None,
            options,
        },
    })
}

fn parse_partition_maintenance(parser: &mut Parser<'_>) -> Result<AlterSpec, ParserError> {
    let Some(word) = word_at(parser, 0) else {
        return parser.expected("an ALTER TABLE operation", parser.peek_token());
    };
    if word == "REMOVE" && is_word(parser, 1, "PARTITIONING") {
        parser.next_token();
        parser.next_token();
        return Ok(AlterSpec::Partition(PartitionAction::RemovePartitioning));
    }
    if !is_word(parser, 1, "PARTITION") {
        return parser.expected("an ALTER TABLE operation", parser.peek_token());
    }
    let action = match word.as_str() {
        "COALESCE" => PartitionAction::Coalesce,
        "TRUNCATE" => PartitionAction::Truncate,
        "REBUILD" => PartitionAction::Rebuild,
        "REORGANIZE" => PartitionAction::Reorganize,
        "CHECK" => PartitionAction::Check,
        "EXCHANGE" => PartitionAction::Exchange,
        "OPTIMIZE" => PartitionAction::Optimize,
        "REPAIR" => PartitionAction::Repair,
        "ANALYZE" => PartitionAction::Analyze,
        "IMPORT" => PartitionAction::ImportTablespace,
        "DISCARD" => PartitionAction::DiscardTablespace,
        _ => return parser.expected("an ALTER TABLE operation", parser.peek_token()),
    };
    parser.next_token();
    parser.next_token();

    match action {
        PartitionAction::Coalesce => {
            parser.parse_literal_uint()?;
        }
        PartitionAction::Reorganize => {
            if !is_word(parser, 0, "INTO") {
                parse_partition_names(parser)?;
            }
            if eat_word(parser, "INTO") {
                parse_balanced_text(parser)?;
            }
        }
        PartitionAction::Exchange => {
            parser.parse_identifier(false)?;
            eat_word(parser, "WITH");
            eat_word(parser, "TABLE");
            parser.parse_object_name(false)?;
            let _ = eat_words(parser, &["WITH", "VALIDATION"])
                || eat_words(parser, &["WITHOUT", "VALIDATION"]);
        }
        PartitionAction::ImportTablespace | PartitionAction::DiscardTablespace => {
            parse_partition_names(parser)?;
            if !eat_word(parser, "TABLESPACE") {
                return parser.expected("TABLESPACE", parser.peek_token());
            }
        }
        _ => parse_partition_names(parser)?,
    }
    Ok(AlterSpec::Partition(action))
}

fn parse_partition_names(parser: &mut Parser<'_>) -> Result<(), ParserError> {
    if eat_word(parser, "ALL") {
        return Ok(());
    }
    parser.parse_comma_separated(|parser| parser.parse_identifier(false))?;
    Ok(())
}

/// A word, string or number, as its unquoted value.
fn parse_word_value(parser: &mut Parser<'_>) -> Result<String, ParserError> {
    let token = parser.next_token();
    match token.token {
        Token::Word(word) => Ok(word.value),
        Token::SingleQuotedString(value) | Token::DoubleQuotedString(value) => Ok(value),
        Token::Number(value, _) => Ok(value),
        _ => parser.expected("a value", token),
    }
}

fn skip_to_end(parser: &mut Parser<'_>) {
    while parser.next_token().token != Token::EOF {}
}

pub(crate) fn expect_end(parser: &Parser<'_>) -> Result<(), ParserError> {
    let token = parser.peek_token();
    if token.token == Token::EOF {
        Ok(())
    } else {
        parser.expected("end of statement", token)
    }
}

/// Upper-cased value of the `n`th significant token when it is an unquoted word.
fn word_at(parser: &Parser<'_>, n: usize) -> Option<String> {
    match parser.peek_nth_token(n).token {
        Token::Word(Word {
            value,
            quote_style: None,
            ..
        }) => Some(value.to_ascii_uppercase()),
        _ => None,
    }
}

fn is_word(parser: &Parser<'_>, n: usize, word: &str) -> bool {
    word_at(parser, n).as_deref() == Some(word)
}

fn eat_word(parser: &mut Parser<'_>, word: &str) -> bool {
    let matched = is_word(parser, 0, word);
    if matched {
        parser.next_token();
    }
    matched
}

/// Consume the words only when all of them follow in order.
fn eat_words(parser: &mut Parser<'_>, words: &[&str]) -> bool {
    let matched = words
        .iter()
        .enumerate()
        .all(|(n, word)| is_word(parser, n, word));
    if matched {
        for _ in words {
            parser.next_token();
        }
    }
    matched
}

fn eat_any_word(parser: &mut Parser<'_>, words: &[&str]) -> Option<String> {
    let word = word_at(parser, 0).filter(|word| words.contains(&word.as_str()))?;
    parser.next_token();
    Some(word)
}
