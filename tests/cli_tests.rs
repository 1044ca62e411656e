use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_file(prefix: &str, extension: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}_{nanos}.{extension}"))
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sqlgate"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("should run sqlgate binary");
    // The binary may exit (e.g. on a bad policy) before reading stdin.
    if let Err(err) = child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin.as_bytes())
    {
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe, "should write stdin");
    }
    child.wait_with_output().expect("should wait for sqlgate")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn clean_fixture_exits_successfully() {
    let output = Command::new(env!("CARGO_BIN_EXE_sqlgate"))
        .arg("tests/fixtures/orders/input.sql")
        .output()
        .expect("should run sqlgate binary");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let reviews = stdout_json(&output);
    assert_eq!(reviews.as_array().map(Vec::len), Some(2));
    assert_eq!(reviews[0]["old_table"], "orders");
}

#[test]
fn blocking_findings_exit_with_one() {
    let output = run_with_stdin(&[], "ALTER TABLE orders DROP COLUMN id;");

    assert_eq!(output.status.code(), Some(1));
    let reviews = stdout_json(&output);
    assert_eq!(reviews[0]["error_msg"][0], "cannot drop or rename column `id`");
    assert_eq!(
        reviews[0]["warning_msg"][0],
        "drop column `id` require DE's confirmation"
    );
}

#[test]
fn advisory_findings_alone_do_not_fail() {
    let output = run_with_stdin(&[], "ALTER TABLE orders ADD COLUMN a INT NOT NULL");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn files_are_reviewed_as_one_batch() {
    let output = Command::new(env!("CARGO_BIN_EXE_sqlgate"))
        .args([
            "tests/fixtures/orders/input.sql",
            "tests/fixtures/legacy_ledger/input.sql",
        ])
        .output()
        .expect("should run sqlgate binary");

    assert_eq!(output.status.code(), Some(1));
    let reviews = stdout_json(&output);
    assert_eq!(reviews.as_array().map(Vec::len), Some(3));
    assert_eq!(reviews[2]["old_table"], "Ledger");
}

#[test]
fn dml_mode_reports_scan_clauses() {
    let output = run_with_stdin(
        &["--mode", "dml"],
        "DELETE FROM orders WHERE status = 'cancelled';",
    );

    assert_eq!(output.status.code(), Some(0));
    let reports = stdout_json(&output);
    assert_eq!(
        reports[0]["scan_clause"],
        "SELECT DISTINCT * FROM orders WHERE status = 'cancelled'"
    );
}

#[test]
fn dml_mode_exits_with_one_on_rejected_statements() {
    let output = run_with_stdin(&["--mode", "dml"], "SELECT 1");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn markdown_is_rejected_in_dml_mode() {
    let output = run_with_stdin(&["--mode", "dml", "--format", "markdown"], "DELETE FROM t");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Markdown output is only available in ddl mode"),
        "got:\n{stderr}"
    );
}

#[test]
fn missing_input_file_exits_with_two() {
    let output = Command::new(env!("CARGO_BIN_EXE_sqlgate"))
        .arg("tests/fixtures/does-not-exist.sql")
        .output()
        .expect("should run sqlgate binary");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Error: cannot read tests/fixtures/does-not-exist.sql"),
        "got:\n{stderr}"
    );
}

#[test]
fn policy_file_changes_the_conventions() {
    let policy = unique_temp_file("sqlgate_policy", "json");
    std::fs::write(&policy, r#"{"index_prefix": "idx_"}"#).expect("should write policy");

    let output = run_with_stdin(
        &["--policy", policy.to_str().expect("utf-8 path")],
        "ALTER TABLE orders ADD INDEX idx_status (status)",
    );
    std::fs::remove_file(&policy).expect("should remove policy");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn invalid_policy_exits_with_two() {
    let policy = unique_temp_file("sqlgate_bad_policy", "json");
    std::fs::write(&policy, "{not json").expect("should write policy");

    let output = run_with_stdin(
        &["--policy", policy.to_str().expect("utf-8 path")],
        "ALTER TABLE orders ENGINE=InnoDB",
    );
    std::fs::remove_file(&policy).expect("should remove policy");

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error: "));
}

#[test]
fn output_flag_writes_the_report_to_a_file() {
    let destination = unique_temp_file("sqlgate_report", "md");
    let output = run_with_stdin(
        &[
            "--format",
            "markdown",
            "--output",
            destination.to_str().expect("utf-8 path"),
        ],
        "ALTER TABLE orders RENAME TO orders_v2",
    );

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    let report = std::fs::read_to_string(&destination).expect("report should be written");
    std::fs::remove_file(&destination).expect("should remove report");
    assert!(report.starts_with("# sqlgate Review Report\n"));
    assert!(report.contains("| 1 | orders -> orders_v2 | RENAME TABLE | PASS | 0 | 0 |"));
}
