//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of reports,
//! plus the table and status-line helpers the CLI prints with.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::{render_csv, render_scans_csv};
pub use json_format::render_json;
pub use plain::{
    print_admin, print_dashboard, print_error, print_info, print_projects, print_scans,
    print_success, print_users, print_warning, render_plain,
};

use crate::report::VulnerabilityReport;
use serde::Serialize;
use std::fmt;
use std::io;

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for spreadsheets
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

/// Render a vulnerability report in the requested format.
pub fn render_report(report: &VulnerabilityReport, format: OutputFormat) -> io::Result<String> {
    match format {
        OutputFormat::Plain => Ok(render_plain(report)),
        OutputFormat::Json => render_json(report),
        OutputFormat::Csv => render_csv(report),
    }
}
