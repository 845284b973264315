//! # CLI
//!
//! Command line surface of the runner binary, for CI pipelines.
//!
//! - `fcle-contract list`
//! - `fcle-contract run --suite deposit --format json --report out.json`
//!
//! Exit code is non-zero when any case fails.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::environment::HarnessConfig;
use crate::error::HarnessError;
use crate::suites;
use crate::testing::report::RunReport;
use crate::testing::runner::Suite;

#[derive(Debug, Parser)]
#[command(name = "fcle-contract", version, about = "Case-matrix contract tests for the FCLE backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every suite with its case labels.
    List,
    /// Run suites against the configured backend.
    Run(RunArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Suite to run; repeat for several. All suites when omitted.
    #[arg(short, long = "suite")]
    pub suites: Vec<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the report to this file.
    #[arg(short, long)]
    pub report: Option<PathBuf>,
}

/// Output format for run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl RunArgs {
    /// Named suites in the order given, or every suite.
    pub fn selected_suites(&self) -> Result<Vec<Suite>, HarnessError> {
        if self.suites.is_empty() {
            return Ok(suites::all());
        }
        self.suites.iter().map(|name| suites::find(name)).collect()
    }
}

pub fn render_listing(config: &HarnessConfig) -> String {
    let mut out = String::new();
    for suite in suites::all() {
        let labels = suite.labels(config);
        let _ = writeln!(out, "{} ({} cases)", suite.name, labels.len());
        for label in labels {
            let _ = writeln!(out, "  {label}");
        }
    }
    out
}

pub fn render_report(report: &RunReport, format: OutputFormat) -> Result<String, HarnessError> {
    match format {
        OutputFormat::Text => Ok(report.render_text()),
        OutputFormat::Json => report.to_json(),
    }
}

pub fn write_report(path: &Path, contents: &str) -> Result<(), HarnessError> {
    std::fs::write(path, contents).map_err(|source| HarnessError::Io {
        context: format!("failed to write report to {}", path.display()),
        source,
    })
}
