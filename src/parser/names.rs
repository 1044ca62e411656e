use sqlparser::ast::ObjectName;

/// Render an object name as its unquoted dotted form (`shop.orders`).
pub fn qualified_name(name: &ObjectName) -> String {
    name.0
        .iter()
        .map(|part| part.value.as_str())
        .collect::<Vec<_>>()
        .join(".")
}

/// Terminal component of an object name (`orders` for `shop.orders`).
pub fn relation_name(name: &ObjectName) -> String {
    name.0
        .last()
        .map(|part| part.value.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlparser::ast::Ident;

    #[test]
    fn qualified_and_relation_names_drop_quoting() {
        let name = ObjectName(vec![Ident::with_quote('`', "shop"), Ident::new("Orders")]);
        assert_eq!(qualified_name(&name), "shop.Orders");
        assert_eq!(relation_name(&name), "Orders");
    }

    #[test]
    fn empty_object_name_has_no_relation() {
        let name = ObjectName(Vec::new());
        assert_eq!(qualified_name(&name), "");
        assert_eq!(relation_name(&name), "");
    }
}
