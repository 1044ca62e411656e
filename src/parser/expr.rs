use sqlparser::ast::{Expr, FunctionArg, FunctionArgExpr, FunctionArguments, Query};

/// Column names referenced anywhere inside an expression, in pre-order.
///
/// Duplicates are kept in encounter order. `None` yields an empty list.
/// Qualified references (`t.created_at`) contribute their terminal column
/// component. Subqueries are opaque.
pub fn column_names(expr: Option<&Expr>) -> Vec<String> {
    expr.map(|expr| fold_column_names(expr, Vec::new()))
        .unwrap_or_default()
}

fn fold_column_names(expr: &Expr, mut acc: Vec<String>) -> Vec<String> {
    acc.extend(referenced_columns(expr));
    children(expr)
        .into_iter()
        .fold(acc, |acc, child| fold_column_names(child, acc))
}

/// Outermost subqueries of an expression, in pre-order. Queries nested inside a returned
/// subquery are left to the caller.
pub fn subqueries(expr: &Expr) -> Vec<&Query> {
    match expr {
        Expr::Subquery(query) | Expr::Exists { subquery: query, .. } => vec![query.as_ref()],
        Expr::InSubquery { expr, subquery, .. } => {
            let mut queries = subqueries(expr);
            queries.push(subquery.as_ref());
            queries
        }
        _ => children(expr).into_iter().flat_map(subqueries).collect(),
    }
}

/// Column references carried by the node itself.
fn referenced_columns(expr: &Expr) -> Vec<String> {
    match expr {
        Expr::Identifier(ident) => vec![ident.value.clone()],
        Expr::CompoundIdentifier(parts) => parts
            .last()
            .map(|part| vec![part.value.clone()])
            .unwrap_or_default(),
        Expr::MatchAgainst { columns, .. } => {
            columns.iter().map(|column| column.value.clone()).collect()
        }
        _ => Vec::new(),
    }
}

/// Direct sub-expressions of a node, left to right.
fn children(expr: &Expr) -> Vec<&Expr> {
    match expr {
        Expr::JsonAccess { value, .. } => vec![value.as_ref()],
        Expr::CompositeAccess { expr, .. }
        | Expr::IsFalse(expr)
        | Expr::IsNotFalse(expr)
        | Expr::IsTrue(expr)
        | Expr::IsNotTrue(expr)
        | Expr::IsNull(expr)
        | Expr::IsNotNull(expr)
        | Expr::IsUnknown(expr)
        | Expr::IsNotUnknown(expr)
        | Expr::InSubquery { expr, .. }
        | Expr::UnaryOp { expr, .. }
        | Expr::Cast { expr, .. }
        | Expr::Extract { expr, .. }
        | Expr::Ceil { expr, .. }
        | Expr::Floor { expr, .. }
        | Expr::Collate { expr, .. }
        | Expr::Nested(expr)
        | Expr::Named { expr, .. }
        | Expr::Subscript { expr, .. }
        | Expr::OuterJoin(expr)
        | Expr::Prior(expr) => vec![expr.as_ref()],
        Expr::IsDistinctFrom(left, right) | Expr::IsNotDistinctFrom(left, right) => {
            vec![left.as_ref(), right.as_ref()]
        }
        Expr::InList { expr, list, .. } => std::iter::once(expr.as_ref()).chain(list).collect(),
        Expr::InUnnest {
            expr, array_expr, ..
        } => vec![expr.as_ref(), array_expr.as_ref()],
        Expr::Between {
            expr, low, high, ..
        } => vec![expr.as_ref(), low.as_ref(), high.as_ref()],
        Expr::BinaryOp { left, right, .. }
        | Expr::AnyOp { left, right, .. }
        | Expr::AllOp { left, right, .. } => vec![left.as_ref(), right.as_ref()],
        Expr::Like { expr, pattern, .. }
        | Expr::ILike { expr, pattern, .. }
        | Expr::SimilarTo { expr, pattern, .. }
        | Expr::RLike { expr, pattern, .. } => vec![expr.as_ref(), pattern.as_ref()],
        Expr::Convert { expr, styles, .. } => {
            std::iter::once(expr.as_ref()).chain(styles).collect()
        }
        Expr::AtTimeZone {
            timestamp,
            time_zone,
        } => vec![timestamp.as_ref(), time_zone.as_ref()],
        Expr::Position { expr, r#in } => vec![expr.as_ref(), r#in.as_ref()],
        Expr::Substring {
            expr,
            substring_from,
            substring_for,
            ..
        } => std::iter::once(expr.as_ref())
            .chain(substring_from.as_deref())
            .chain(substring_for.as_deref())
            .collect(),
        Expr::Trim {
            expr,
            trim_what,
            trim_characters,
            ..
        } => std::iter::once(expr.as_ref())
            .chain(trim_what.as_deref())
            .chain(trim_characters.iter().flatten())
            .collect(),
        Expr::Overlay {
            expr,
            overlay_what,
            overlay_from,
            overlay_for,
        } => vec![expr.as_ref(), overlay_what.as_ref(), overlay_from.as_ref()]
            .into_iter()
            .chain(overlay_for.as_deref())
            .collect(),
        Expr::MapAccess { column, .. } => vec![column.as_ref()],
        Expr::Function(func) => {
            let args: Vec<&Expr> = match &func.args {
                FunctionArguments::List(list) => {
                    list.args.iter().filter_map(function_arg_expr).collect()
                }
                FunctionArguments::None | FunctionArguments::Subquery(_) => Vec::new(),
            };
            args.into_iter().chain(func.filter.as_deref()).collect()
        }
        Expr::Case {
            operand,
            conditions,
            results,
            else_result,
        } => operand
            .as_deref()
            .into_iter()
            .chain(conditions.iter().zip(results).flat_map(|(c, r)| [c, r]))
            .chain(else_result.as_deref())
            .collect(),
        Expr::Tuple(items) => items.iter().collect(),
        Expr::GroupingSets(sets) | Expr::Cube(sets) | Expr::Rollup(sets) => {
            sets.iter().flatten().collect()
        }
        Expr::Array(array) => array.elem.iter().collect(),
        Expr::Interval(interval) => vec![interval.value.as_ref()],
        // Leaves, plus subquery scopes, which `subqueries` reaches.
        _ => Vec::new(),
    }
}

/// Extract the expression payload from a SQL function argument.
pub fn function_arg_expr(arg: &FunctionArg) -> Option<&Expr> {
    match arg {
        FunctionArg::Unnamed(FunctionArgExpr::Expr(expr))
        | FunctionArg::Named {
            arg: FunctionArgExpr::Expr(expr),
            ..
        }
        | FunctionArg::ExprNamed {
            arg: FunctionArgExpr::Expr(expr),
            ..
        } => Some(expr),
        _ => None,
    }
}

/// Returns `true` for a call to `CURRENT_TIMESTAMP`, with or without parentheses.
///
/// Only the function itself qualifies; `NOW()` or a literal does not.
pub fn is_current_timestamp(expr: Option<&Expr>) -> bool {
    let Some(Expr::Function(func)) = expr else {
        return false;
    };
    func.name
        .0
        .last()
        .is_some_and(|ident| ident.value.eq_ignore_ascii_case("current_timestamp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlparser::ast::Ident;
    use sqlparser::dialect::MySqlDialect;
    use sqlparser::parser::Parser;

    fn parse_expr(sql: &str) -> Expr {
        Parser::new(&MySqlDialect {})
            .try_with_sql(sql)
            .unwrap()
            .parse_expr()
            .unwrap()
    }

    #[test]
    fn absent_expression_has_no_columns() {
        assert!(column_names(None).is_empty());
    }

    #[test]
    fn column_names_walk_nested_function_calls_in_pre_order() {
        let expr = parse_expr("YEAR(created_at) + TO_DAYS(ABS(t.updated_at)) - id");
        assert_eq!(
            column_names(Some(&expr)),
            vec!["created_at", "updated_at", "id"]
        );
    }

    #[test]
    fn column_names_keep_duplicates_in_encounter_order() {
        let expr = parse_expr("CASE WHEN a > b THEN a ELSE c END");
        assert_eq!(column_names(Some(&expr)), vec!["a", "b", "a", "c"]);
    }

    #[test]
    fn column_names_descend_into_lists_and_ranges() {
        let expr = parse_expr("region IN (home, 'x') AND amount BETWEEN low AND high");
        assert_eq!(
            column_names(Some(&expr)),
            vec!["region", "home", "amount", "low", "high"]
        );
    }

    #[test]
    fn bare_identifier_yields_itself() {
        let expr = Expr::Identifier(Ident::new("tenant_id"));
        assert_eq!(column_names(Some(&expr)), vec!["tenant_id"]);
    }

    #[test]
    fn subqueries_are_found_under_boolean_operators() {
        let expr = parse_expr(
            "a = 1 AND b IN (SELECT k FROM c) OR EXISTS (SELECT 1 FROM d WHERE d.x IN (SELECT x FROM e))",
        );
        let found: Vec<String> = subqueries(&expr).iter().map(ToString::to_string).collect();
        assert_eq!(
            found,
            vec![
                "SELECT k FROM c",
                "SELECT 1 FROM d WHERE d.x IN (SELECT x FROM e)"
            ]
        );
        assert_eq!(column_names(Some(&expr)), vec!["a", "b"]);
    }

    #[test]
    fn current_timestamp_is_recognized_only_by_name() {
        assert!(is_current_timestamp(Some(&parse_expr("CURRENT_TIMESTAMP"))));
        assert!(is_current_timestamp(Some(&parse_expr("current_timestamp()"))));
        assert!(!is_current_timestamp(Some(&parse_expr("NOW()"))));
        assert!(!is_current_timestamp(Some(&parse_expr("'2020-01-01'"))));
        assert!(!is_current_timestamp(None));
    }
}
