use sqlgate::dml::{analyze, DmlKind};
use sqlgate::output::formatter::render_dml;

#[test]
fn delete_is_turned_into_a_scan_of_the_affected_rows() {
    let reports = analyze("DELETE FROM orders WHERE status = 'cancelled';");

    assert_eq!(reports.len(), 1);
    assert_eq!(
        reports[0].scan_clause,
        "SELECT DISTINCT * FROM orders WHERE status = 'cancelled'"
    );
    assert_eq!(reports[0].tables, vec!["orders"]);
    assert_eq!(reports[0].kind(), Some(DmlKind::Delete));
}

#[test]
fn batch_reports_each_statement_in_order() {
    let reports = analyze(
        "UPDATE orders SET status = 'paid' WHERE id IN (1, 2);\n\
         -- backfill\n\
         INSERT INTO order_audit (order_id, action) VALUES (1, 'paid'), (2, 'paid'), (3, 'void');\n\
         DELETE FROM sessions USING sessions JOIN users ON users.id = sessions.user_id WHERE users.banned = 1;\n\
         SELECT COUNT(*) FROM orders;",
    );

    let kinds: Vec<Option<DmlKind>> = reports.iter().map(|report| report.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            Some(DmlKind::Update),
            Some(DmlKind::Insert),
            Some(DmlKind::Delete),
            None
        ]
    );

    assert_eq!(
        reports[0].scan_clause,
        "SELECT DISTINCT * FROM orders WHERE id IN (1, 2)"
    );
    assert_eq!(reports[1].insert_count, 3);
    assert_eq!(reports[1].tables, vec!["order_audit"]);
    assert_eq!(reports[2].tables, vec!["sessions", "users"]);
    assert_eq!(
        reports[3].error_msg,
        "statement provided is not a valid DELETE, UPDATE or INSERT query"
    );
}

#[test]
fn syntax_error_yields_one_failed_report() {
    let reports = analyze("DELETE FROM orders WHERE;\nUPDATE orders SET a = 1");

    assert_eq!(reports.len(), 1);
    assert!(reports[0].error_msg.starts_with("Syntax error: "));
    assert!(reports[0].tables.is_empty());
    assert!(reports[0].scan_clause.is_empty());
}

#[test]
fn reports_render_as_a_json_array() {
    let rendered = render_dml(&analyze("DELETE FROM logs LIMIT 10")).expect("reports should render");
    let value: serde_json::Value = serde_json::from_str(&rendered).expect("output should be JSON");

    assert_eq!(value[0]["dml_type"], "DELETE");
    assert_eq!(value[0]["scan_clause"], "SELECT DISTINCT * FROM logs LIMIT 10");
}
