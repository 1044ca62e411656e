//! Review MySQL schema changes against table conventions and summarize the rows touched by DML.
#![warn(missing_docs)]

/// Impact analysis of `DELETE`, `UPDATE` and `INSERT` statements.
pub mod dml;
/// Process-level error type.
pub mod error;
/// Review rendering: JSON, markdown report, output destination.
pub mod output;
/// MySQL statement front end and the statement model the rules consume.
pub mod parser;
/// Convention rules, findings, severities and statement dispatch.
pub mod policy;
