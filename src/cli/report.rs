//! Report subcommands.
//!
//! Handles `secportal report` (filtered findings with export),
//! `secportal dashboard` and `secportal admin`.

use super::Context;
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat};
use crate::report::{self, VulnerabilityFilter};
use crate::types::{ProjectId, Role, Severity};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

/// Vulnerability report.
#[derive(Parser, Debug)]
pub struct ReportCommand {
    /// Only findings of this project
    #[arg(short, long)]
    pub project: Option<ProjectId>,

    /// Only findings of this severity
    #[arg(short, long, value_enum)]
    pub severity: Option<Severity>,

    /// Output format (defaults to the configured report format)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Output file path (prints to stdout if not specified)
    #[arg(short = 'o', long = "output")]
    pub output_file: Option<PathBuf>,
}

impl ReportCommand {
    /// Execute the report command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let format = match self.format {
            Some(format) => format,
            None => ctx
                .settings
                .default_report_format
                .parse()
                .map_err(CliError::Other)?,
        };

        let filter = VulnerabilityFilter {
            project: self.project.clone(),
            severity: self.severity,
        };
        let report = report::vulnerability_report(&ctx.service, &filter)?;
        let content = output::render_report(&report, format)?;

        if let Some(path) = &self.output_file {
            fs::write(path, &content).map_err(|e| {
                CliError::Other(format!("failed to write {}: {}", path.display(), e))
            })?;

            if !ctx.quiet {
                output::print_success(&format!(
                    "Exported {} findings to {} ({})",
                    report.summary.total,
                    path.display(),
                    format
                ));
            }
        } else {
            print!("{}", content);
        }

        Ok(())
    }
}

pub fn dashboard(ctx: &Context) -> CliResult<()> {
    output::print_dashboard(&report::dashboard(&ctx.service)?);
    Ok(())
}

/// Administrator overview.
#[derive(Parser, Debug)]
pub struct AdminCommand {
    /// Number of recent scans to list
    #[arg(short = 'n', long, default_value = "10")]
    pub recent: usize,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

impl AdminCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let user = ctx.require_user()?;
        if user.role != Role::Admin {
            return Err(CliError::Other(format!(
                "{} is a {}; the admin overview needs an admin",
                user.email, user.role
            )));
        }

        let stats = report::admin_overview(&ctx.service, self.recent)?;
        if self.json {
            println!("{}", output::render_json(&stats)?);
        } else {
            output::print_admin(&stats);
        }
        Ok(())
    }
}
