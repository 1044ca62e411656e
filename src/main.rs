//! CLI entry point for `sqlgate`.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use sqlgate::dml;
use sqlgate::error::{Error, Result};
use sqlgate::output::formatter::{self, OutputFormat};
use sqlgate::policy::{review_sql, PolicyConfig, StatementResult};
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Ddl,
    Dml,
}

impl std::str::FromStr for Mode {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ddl" => Ok(Mode::Ddl),
            "dml" => Ok(Mode::Dml),
            _ => Err(format!("Invalid mode: {s}")),
        }
    }
}

#[derive(Parser)]
#[command(
    name = "sqlgate",
    about = "Review MySQL schema changes against table conventions and summarize DML impact"
)]
struct Cli {
    /// Input SQL files (reads stdin when none are given)
    input: Vec<PathBuf>,

    /// Review schema changes (`ddl`) or analyze data changes (`dml`)
    #[arg(long, default_value = "ddl")]
    mode: Mode,

    /// Output format: `json` or `markdown` (markdown is ddl only)
    #[arg(long, default_value = "json")]
    format: OutputFormat,

    /// JSON policy overriding the built-in convention constants
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Write output to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print verbose diagnostics
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if cli.mode == Mode::Dml && cli.format == OutputFormat::Markdown {
        eprintln!("Markdown output is only available in ddl mode");
        process::exit(2);
    }

    match run(&cli) {
        Ok(true) => process::exit(1),
        Ok(false) => {}
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    }
}

/// Returns whether any statement failed review.
fn run(cli: &Cli) -> Result<bool> {
    let config = match &cli.policy {
        Some(path) => PolicyConfig::from_json(&read_file(path)?)?,
        None => PolicyConfig::default(),
    };
    let sql = read_input(&cli.input)?;

    let (rendered, failed) = match cli.mode {
        Mode::Ddl => {
            let results = review_sql(&sql, &config);
            debug!(statements = results.len(), "reviewed batch");
            let failed = results.iter().any(StatementResult::is_blocked);
            (formatter::render_reviews(&results, cli.format)?, failed)
        }
        Mode::Dml => {
            let reports = dml::analyze(&sql);
            debug!(statements = reports.len(), "analyzed batch");
            let failed = reports.iter().any(|report| !report.error_msg.is_empty());
            (formatter::render_dml(&reports)?, failed)
        }
    };

    formatter::write_output(cli.output.as_deref(), &rendered)?;
    Ok(failed)
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Concatenate every input file, or read stdin when there are none.
fn read_input(paths: &[PathBuf]) -> Result<String> {
    if paths.is_empty() {
        let mut sql = String::new();
        std::io::stdin()
            .read_to_string(&mut sql)
            .map_err(Error::Stdin)?;
        return Ok(sql);
    }

    let mut combined_sql = String::new();
    for path in paths {
        combined_sql.push_str(&read_file(path)?);
        combined_sql.push_str("\n;\n");
    }
    Ok(combined_sql)
}
