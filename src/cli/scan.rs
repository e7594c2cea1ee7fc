//! Scan subcommand implementation.
//!
//! Handles `secportal scan <project>...` and `secportal scans`.

use super::Context;
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat};
use crate::report;
use crate::scan::{wait_all, MockScanner, ScanRunner, SharedScanner};
use crate::types::{ProjectId, ScanResult, ScanStatus, ScanType};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// Run a mock scan against one or more projects.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Projects to scan
    #[arg(value_name = "PROJECT", required = true, num_args = 1..)]
    pub projects: Vec<ProjectId>,

    /// Kind of analysis to record
    #[arg(short = 't', long = "type", value_enum, default_value = "static")]
    pub scan_type: ScanType,

    /// Simulated scan duration in milliseconds (defaults to the configured delay)
    #[arg(short = 'd', long)]
    pub delay_ms: Option<u64>,

    /// Output format for the finished scans
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

impl ScanCommand {
    /// Execute the scan command.
    pub async fn execute(&self, ctx: &Context) -> CliResult<()> {
        let tester = ctx.require_user()?;
        let delay = Duration::from_millis(self.delay_ms.unwrap_or(ctx.settings.scan_delay_ms));
        let scanner: SharedScanner = Arc::new(MockScanner::new(self.scan_type, delay));
        let runner = ScanRunner::new(Arc::clone(&ctx.service));

        let mut jobs = Vec::with_capacity(self.projects.len());
        for project in &self.projects {
            match runner.start(project, &tester.id, Arc::clone(&scanner)) {
                Ok(job) => jobs.push(job),
                Err(e) => output::print_warning(&format!("skipping {}: {}", project, e)),
            }
        }

        if jobs.is_empty() {
            return Err(CliError::Other("no scans were started".to_string()));
        }

        let started = jobs.len();
        let spinner = self.spinner(ctx, started);
        let outcomes = wait_all(jobs).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let mut finished = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                Ok(scan) => finished.push(scan),
                Err(e) => output::print_warning(&format!("scan job failed: {}", e)),
            }
        }

        self.print(ctx, &finished)?;

        let failed = started
            - finished
                .iter()
                .filter(|s| s.status == ScanStatus::Completed)
                .count();
        if failed > 0 {
            return Err(CliError::Other(format!("{} of {} scans failed", failed, started)));
        }
        Ok(())
    }

    fn spinner(&self, ctx: &Context, count: usize) -> Option<ProgressBar> {
        if ctx.quiet || self.output != OutputFormat::Plain {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Running {} {} scan(s)...", count, self.scan_type));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    fn print(&self, ctx: &Context, scans: &[ScanResult]) -> CliResult<()> {
        if self.output == OutputFormat::Json {
            println!("{}", output::render_json(scans)?);
            return Ok(());
        }

        let projects = ctx.service.projects()?;
        let users = ctx.service.users()?;
        let rows = report::scan_rows(scans, &projects, &users, scans.len());

        if self.output == OutputFormat::Csv {
            print!("{}", output::render_scans_csv(&rows)?);
            return Ok(());
        }

        for row in &rows {
            if row.status == ScanStatus::Completed {
                output::print_success(&format!(
                    "{} on '{}': {} findings, risk score {}",
                    row.scan_type, row.project, row.findings, row.risk_score
                ));
            } else {
                output::print_warning(&format!(
                    "{} on '{}' ended {}",
                    row.scan_type, row.project, row.status
                ));
            }
        }
        if ctx.verbose {
            output::print_scans(&rows);
        }
        Ok(())
    }
}

/// View scan history.
#[derive(Parser, Debug)]
pub struct ScansCommand {
    /// Only scans of this project
    #[arg(short, long)]
    pub project: Option<ProjectId>,

    /// Number of recent scans to show
    #[arg(short = 'n', long, default_value = "20")]
    pub count: usize,
}

impl ScansCommand {
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let mut scans = ctx.service.scans()?;
        if let Some(project) = &self.project {
            scans.retain(|s| &s.project_id == project);
        }

        let projects = ctx.service.projects()?;
        let users = ctx.service.users()?;
        output::print_scans(&report::scan_rows(&scans, &projects, &users, self.count));
        Ok(())
    }
}
