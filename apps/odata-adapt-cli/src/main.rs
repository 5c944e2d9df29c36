//! `odata-adapt`: parse the OData-style query string of a URL and optionally
//! apply it to a JSON array of rows.
//!
//! # Usage
//!
//! ```bash
//! # Show the parsed query
//! odata-adapt 'https://example.com/books?$select=title&$top=5'
//!
//! # Apply it to rows, hiding a field of the "book" record type
//! odata-adapt --record-type book --hidden authorId --data books.json \
//!     'https://example.com/books?$orderby=title%20desc'
//!
//! # Show the effective configuration
//! odata-adapt --config odata-adapt.yaml --print-config
//! ```
//!
//! Rejected queries print an `application/problem+json` body on stdout and
//! exit with status 2.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
// CLI tools are expected to print to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod config;
mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use odata_adapt::{MemoryQuery, Problem, QueryApplier, QueryStringParser};
use serde::Serialize;

use crate::config::{AppConfig, CliOverrides};

const REJECTED: u8 = 2;

/// Parse OData-style `$select`, `$top`, `$skip` and `$orderby` parameters
#[derive(Parser, Debug)]
#[command(name = "odata-adapt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// URL (absolute or relative) whose query string is parsed
    #[arg(value_name = "URL", required_unless_present = "print_config")]
    url: Option<String>,

    /// Record type used for hidden-field checks
    #[arg(long, default_value = "record")]
    record_type: String,

    /// Hide a field of the record type (can be specified multiple times)
    #[arg(long, value_name = "FIELD", action = clap::ArgAction::Append)]
    hidden: Vec<String>,

    /// Let hidden fields through `$select`
    #[arg(long)]
    no_enforce: bool,

    /// JSON file holding an array of objects to apply the query to
    #[arg(long, value_name = "FILE")]
    data: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    if let Some(path) = &cli.config
        && !path.is_file()
    {
        bail!("config file does not exist: {}", path.display());
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(&CliOverrides {
        record_type: cli.record_type.clone(),
        hidden: cli.hidden.clone(),
        verbose: cli.verbose,
    });
    logging::init_logging(&config.logging);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(ExitCode::SUCCESS);
    }

    let Some(url) = cli.url.as_deref() else {
        bail!("missing URL");
    };
    let rows = match &cli.data {
        Some(path) => Some(load_rows(path)?),
        None => None,
    };

    match adapt(cli, &config, url, rows) {
        Ok(output) => {
            print_json(&output)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let problem = Problem::from(err).with_instance(url);
            print_json(&problem)?;
            Ok(ExitCode::from(REJECTED))
        }
    }
}

/// Parse `url`, check it against the configured visibility and apply it to
/// `rows` when given.
fn adapt(
    cli: &Cli,
    config: &AppConfig,
    url: &str,
    rows: Option<MemoryQuery>,
) -> odata_adapt::Result<serde_json::Value> {
    let parser = QueryStringParser::new(config.limits.clone());
    let query = parser.parse_url(url)?;
    let applier = QueryApplier::new(&config.visibility, cli.record_type.as_str())
        .enforce_visibility(!cli.no_enforce);

    let Some(rows) = rows else {
        applier.validate(&query, &MemoryQuery::default())?;
        return serde_json::to_value(&query)
            .map_err(|e| odata_adapt::Error::Backend(e.to_string()));
    };

    let adapted = applier.apply(query, rows)?;
    let rows = if applier.enforces_visibility() {
        adapted.rows_visible(&config.visibility, &cli.record_type)
    } else {
        adapted.rows()
    };
    tracing::info!(rows = rows.len(), "query applied");
    Ok(serde_json::Value::Array(rows))
}

fn load_rows(path: &Path) -> Result<MemoryQuery> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    MemoryQuery::from_json(value).with_context(|| format!("unusable rows in {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
