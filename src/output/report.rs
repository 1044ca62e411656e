use std::fmt::Write;

use crate::policy::finding::Severity;
use crate::policy::result::StatementResult;

/// Build a markdown report with a verdict table and per-statement findings.
pub fn build_report(results: &[StatementResult]) -> String {
    let mut report = String::new();

    writeln!(report, "# sqlgate Review Report").unwrap();
    writeln!(report).unwrap();

    writeln!(report, "## Summary").unwrap();
    writeln!(report).unwrap();
    writeln!(report, "| # | Table | Changes | Verdict | Blocking | Advisory |").unwrap();
    writeln!(report, "|---|-------|---------|---------|----------|----------|").unwrap();

    for (index, result) in results.iter().enumerate() {
        let changes = result
            .tags()
            .iter()
            .map(|tag| tag.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            report,
            "| {} | {} | {} | {} | {} | {} |",
            index + 1,
            format_table(result),
            if changes.is_empty() { "-" } else { &changes },
            verdict(result),
            result.with_severity(Severity::Blocking).count(),
            result.with_severity(Severity::Advisory).count()
        )
        .unwrap();
    }

    let flagged: Vec<(usize, &StatementResult)> = results
        .iter()
        .enumerate()
        .filter(|(_, result)| {
            result
                .findings()
                .iter()
                .any(|finding| finding.severity != Severity::Suppressed)
        })
        .collect();
    if flagged.is_empty() {
        return report;
    }

    writeln!(report).unwrap();
    writeln!(report, "## Findings").unwrap();

    for (index, result) in flagged {
        writeln!(report).unwrap();
        writeln!(report, "### {}. `{}`", index + 1, one_line(result.sql())).unwrap();
        writeln!(report).unwrap();
        for (severity, label) in [
            (Severity::Blocking, "blocking"),
            (Severity::Advisory, "advisory"),
        ] {
            for finding in result.with_severity(severity) {
                writeln!(report, "- **[{label}]** {}", finding.message).unwrap();
            }
        }
    }

    report
}

fn verdict(result: &StatementResult) -> &'static str {
    if result.is_blocked() {
        "BLOCKED"
    } else if result.with_severity(Severity::Advisory).next().is_some() {
        "WARN"
    } else {
        "PASS"
    }
}

fn format_table(result: &StatementResult) -> String {
    match (result.old_table(), result.new_table()) {
        ("", _) => "-".to_string(),
        (old, "") => old.to_string(),
        (old, new) => format!("{old} -> {new}"),
    }
}

fn one_line(sql: &str) -> String {
    sql.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('`', "")
}
