use super::config::PolicyConfig;
use super::finding::{Finding, FindingKind};
use super::result::StatementResult;
use crate::parser::statement::{TableOption, TableOptionKind};

/// Per-option rules. Character set carries no value rule.
pub fn check_options(result: &mut StatementResult, options: &[TableOption], config: &PolicyConfig) {
    for option in options {
        match option.kind {
            TableOptionKind::Collate
                if option.value.eq_ignore_ascii_case(&config.discouraged_collation) =>
            {
                result.add(
                    Finding::new(
                        FindingKind::DiscouragedCollation,
                        format!(
                            "use of collate `{}` is not allowed, please use `{}` instead",
                            config.discouraged_collation, config.substitute_collation
                        ),
                    )
                    .about(option.value.as_str()),
                );
            }
            TableOptionKind::Engine
                if !option.is_default && !option.value.eq_ignore_ascii_case(&config.engine) =>
            {
                result.add(
                    Finding::new(
                        FindingKind::InvalidEngine,
                        format!("table engine must be set to {}", config.engine),
                    )
                    .about(option.value.as_str()),
                );
            }
            _ => {}
        }
    }
}

/// A created table must state its character set and collation.
pub fn check_required_options(result: &mut StatementResult, options: &[TableOption]) {
    let declares = |kind: TableOptionKind| options.iter().any(|option| option.kind == kind);
    if !declares(TableOptionKind::Charset) {
        result.report(
            FindingKind::CharsetMissing,
            "table charset must be explicitly specified",
        );
    }
    if !declares(TableOptionKind::Collate) {
        result.report(
            FindingKind::CollationMissing,
            "table collate must be explicitly specified",
        );
    }
}
