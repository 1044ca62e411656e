use std::fmt;
use std::path::Path;

use crate::dml::DmlReport;
use crate::error::{Error, Result};
use crate::output::report;
use crate::policy::result::{Review, StatementResult};

/// Rendering of review output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON array.
    #[default]
    Json,
    /// Markdown report.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

/// Render statement reviews in the requested format.
pub fn render_reviews(results: &[StatementResult], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let reviews: Vec<Review> = results.iter().map(StatementResult::review).collect();
            serde_json::to_string_pretty(&reviews).map_err(Error::Serialize)
        }
        OutputFormat::Markdown => Ok(report::build_report(results)),
    }
}

/// Render DML reports as JSON.
pub fn render_dml(reports: &[DmlReport]) -> Result<String> {
    serde_json::to_string_pretty(reports).map_err(Error::Serialize)
}

/// Write rendered output to a file, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, ensure_trailing_newline(content)).map_err(|source| {
            Error::Write {
                path: path.to_path_buf(),
                source,
            }
        }),
        None => {
            print!("{}", ensure_trailing_newline(content));
            Ok(())
        }
    }
}

fn ensure_trailing_newline(content: &str) -> String {
    if content.ends_with('\n') {
        content.to_string()
    } else {
        format!("{content}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("md".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn json_reviews_are_an_array() {
        let rendered = render_reviews(&[StatementResult::new("SELECT 1")], OutputFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value[0]["sql"], "SELECT 1");
    }

    #[test]
    fn output_file_gets_a_trailing_newline() {
        let path = std::env::temp_dir().join(format!("sqlgate-{}.json", std::process::id()));
        write_output(Some(&path), "[]").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]\n");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn unwritable_destination_reports_path() {
        let path = Path::new("/nonexistent-dir/sqlgate/out.json");
        let err = write_output(Some(path), "[]").unwrap_err();
        assert!(err.to_string().starts_with("cannot write /nonexistent-dir/sqlgate/out.json"));
    }
}
