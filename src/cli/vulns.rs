//! Vulnerability triage subcommands.

use super::Context;
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat};
use crate::report::{self, VulnerabilityFilter};
use crate::types::{ProjectId, Severity, VulnerabilityId, VulnerabilityPatch, VulnerabilityStatus};
use clap::{Parser, Subcommand};

/// List and triage vulnerabilities.
#[derive(Parser, Debug)]
pub struct VulnsCommand {
    #[command(subcommand)]
    pub action: VulnsAction,
}

#[derive(Subcommand, Debug)]
pub enum VulnsAction {
    /// List findings, optionally filtered
    List {
        #[arg(short, long)]
        project: Option<ProjectId>,

        #[arg(short, long, value_enum)]
        severity: Option<Severity>,

        /// Only findings in this state
        #[arg(long, value_enum)]
        status: Option<VulnerabilityStatus>,
    },

    /// Move a finding to a new triage state
    Status {
        /// Vulnerability id
        id: VulnerabilityId,

        #[arg(value_enum)]
        status: VulnerabilityStatus,
    },
}

impl VulnsCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        match &self.action {
            VulnsAction::List {
                project,
                severity,
                status,
            } => {
                let filter = VulnerabilityFilter {
                    project: project.clone(),
                    severity: *severity,
                };
                let mut report = report::vulnerability_report(&ctx.service, &filter)?;
                if let Some(status) = status {
                    report.rows.retain(|r| r.status == *status);
                }

                if ctx.verbose {
                    for row in &report.rows {
                        output::print_info(&format!("{} {}", row.id, row.kind));
                    }
                }
                print!("{}", output::render_report(&report, OutputFormat::Plain)?);
                Ok(())
            }
            VulnsAction::Status { id, status } => {
                let vuln = ctx
                    .service
                    .update_vulnerability(id, VulnerabilityPatch::status(*status))?
                    .ok_or_else(|| CliError::NotFound(format!("vulnerability '{}'", id)))?;

                if !ctx.quiet {
                    output::print_success(&format!("{} in {} is now {}", vuln.kind, vuln.file, vuln.status));
                }
                Ok(())
            }
        }
    }
}
