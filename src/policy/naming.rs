use super::finding::{Finding, FindingKind};
use super::reserved::is_reserved;
use super::result::StatementResult;

const DATABASE_SEPARATOR: char = '.';

/// Naming rules for a table name as written (`schema.table` when qualified).
pub fn check_table_name(result: &mut StatementResult, name: &str) {
    if let Some((database, _)) = name.split_once(DATABASE_SEPARATOR) {
        result.add(
            Finding::new(
                FindingKind::TableWithDatabaseName,
                format!("table name with database name `{database}` is not allowed"),
            )
            .about(database),
        );
    }
    if !is_lower_case(name) {
        result.add(
            Finding::new(
                FindingKind::TableNotLowerCase,
                format!("use of upper case in table name `{name}` is not allowed"),
            )
            .about(name),
        );
    }
    if is_reserved(name) {
        result.add(
            Finding::new(
                FindingKind::TableReservedWord,
                format!("use of reserved word `{name}` as table name is not allowed"),
            )
            .about(name),
        );
    }
    if has_hyphen(name) {
        result.add(
            Finding::new(
                FindingKind::TableNameWithHyphen,
                format!("table `{name}` contains invalid character hyphen `-`, please use `_` instead"),
            )
            .about(name),
        );
    }
}

/// Naming rules for a column name.
pub fn check_column_name(result: &mut StatementResult, name: &str) {
    if has_hyphen(name) {
        result.add(
            Finding::new(
                FindingKind::ColumnNameWithHyphen,
                format!("column `{name}` contains invalid character hyphen `-`, please use `_` instead"),
            )
            .about(name),
        );
    }
    if is_reserved(name) {
        result.add(
            Finding::new(
                FindingKind::ColumnReservedWord,
                format!("use of reserved word `{name}` as column name is not allowed"),
            )
            .about(name),
        );
    }
    if !is_lower_case(name) {
        result.add(
            Finding::new(
                FindingKind::ColumnNotLowerCase,
                format!("use of upper case in column `{name}` is not allowed"),
            )
            .about(name),
        );
    }
}

fn has_hyphen(name: &str) -> bool {
    name.contains('-')
}

fn is_lower_case(name: &str) -> bool {
    name.to_lowercase() == name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_kinds(name: &str) -> Vec<FindingKind> {
        let mut result = StatementResult::new("");
        check_table_name(&mut result, name);
        result.findings().iter().map(|f| f.kind).collect()
    }

    fn column_kinds(name: &str) -> Vec<FindingKind> {
        let mut result = StatementResult::new("");
        check_column_name(&mut result, name);
        result.findings().iter().map(|f| f.kind).collect()
    }

    #[test]
    fn conventional_names_pass() {
        assert!(table_kinds("order_items").is_empty());
        assert!(column_kinds("created_at").is_empty());
    }

    #[test]
    fn qualified_table_reports_the_database_segment() {
        let mut result = StatementResult::new("");
        check_table_name(&mut result, "shop.orders");
        assert_eq!(
            result.findings()[0].message,
            "table name with database name `shop` is not allowed"
        );
    }

    #[test]
    fn table_rules_fire_in_order() {
        assert_eq!(
            table_kinds("Shop.Order-Items"),
            vec![
                FindingKind::TableWithDatabaseName,
                FindingKind::TableNotLowerCase,
                FindingKind::TableNameWithHyphen
            ]
        );
        assert_eq!(table_kinds("order"), vec![FindingKind::TableReservedWord]);
    }

    #[test]
    fn column_rules_fire_in_order() {
        assert_eq!(
            column_kinds("Order"),
            vec![FindingKind::ColumnReservedWord, FindingKind::ColumnNotLowerCase]
        );
        assert_eq!(column_kinds("user-id"), vec![FindingKind::ColumnNameWithHyphen]);
    }
}
