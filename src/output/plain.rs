//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::report::{AdminStats, DashboardStats, ScanRow, VulnerabilityReport};
use crate::types::{Project, ScanStatus, Severity, User, VulnerabilityStatus};
use console::{style, Style};
use std::fmt::{self, Write as _};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Critical => Style::new().magenta().bold(),
        Severity::High => Style::new().red().bold(),
        Severity::Medium => Style::new().yellow(),
        Severity::Low => Style::new().green(),
    }
}

fn status_style(status: VulnerabilityStatus) -> Style {
    match status {
        VulnerabilityStatus::Open => Style::new().red(),
        VulnerabilityStatus::InProgress => Style::new().yellow(),
        VulnerabilityStatus::Fixed => Style::new().green(),
        VulnerabilityStatus::Ignored => Style::new().dim(),
    }
}

/// Render a vulnerability report as a text table.
pub fn render_plain(report: &VulnerabilityReport) -> String {
    let mut out = String::new();
    // Writing into a String never fails.
    let _ = write_plain(&mut out, report);
    out
}

fn write_plain(out: &mut String, report: &VulnerabilityReport) -> fmt::Result {
    let s = &report.summary;

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out, "                  {} Vulnerability Report", style("secportal").cyan().bold())?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;
    writeln!(
        out,
        "  {} {} total, {} critical, {} open, {} fixed",
        style("Summary:").bold(),
        style(s.total).bold(),
        style(s.critical).magenta().bold(),
        style(s.open).red(),
        style(s.fixed).green()
    )?;
    writeln!(out)?;

    if report.rows.is_empty() {
        writeln!(out, "  {}", style("No vulnerabilities found with the selected filters.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:<10}  {:<12}  {:<22}  {:<16}  {}",
            style("SEVERITY").bold(),
            style("STATUS").bold(),
            style("TYPE").bold(),
            style("PROJECT").bold(),
            style("FILE").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for row in &report.rows {
            writeln!(
                out,
                "  {:<10}  {:<12}  {:<22}  {:<16}  {}",
                severity_style(row.severity).apply_to(row.severity.to_string().to_uppercase()),
                status_style(row.status).apply_to(row.status.to_string()),
                truncate_string(&row.kind, 22),
                truncate_string(&row.project, 16),
                style(&row.file).dim()
            )?;
            writeln!(out, "  {:>10}  {} {}", "", style("fix:").dim(), row.suggested_fix)?;
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    writeln!(out)
}

/// Print the project list.
pub fn print_projects(projects: &[Project]) {
    if projects.is_empty() {
        println!("{}", style("No projects yet.").dim());
        return;
    }

    println!(
        "\n{:<22} {:<20} {:<16} {:<24} {}",
        "ID", "NAME", "OWNER", "TECH STACK", "LAST SCANNED"
    );
    println!("{}", "-".repeat(100));

    for project in projects {
        let last = project
            .last_scanned
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "{:<22} {:<20} {:<16} {:<24} {}",
            project.id.short(),
            truncate_string(&project.name, 20),
            truncate_string(&project.owner, 16),
            truncate_string(&project.tech_stack.join(", "), 24),
            last
        );
    }
    println!();
}

/// Print the user list.
pub fn print_users(users: &[User], current: Option<&User>) {
    println!("\n  {:<20} {:<28} {:<20} {}", "ID", "EMAIL", "NAME", "ROLE");
    println!("{}", "-".repeat(80));

    for user in users {
        let marker = if current.map_or(false, |c| c.id == user.id) {
            style("*").green().bold().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{} {:<20} {:<28} {:<20} {}",
            marker,
            user.id.short(),
            truncate_string(&user.email, 28),
            truncate_string(&user.name, 20),
            user.role
        );
    }
    println!();
}

/// Print resolved scan rows.
pub fn print_scans(rows: &[ScanRow]) {
    if rows.is_empty() {
        println!("{}", style("No scans yet.").dim());
        return;
    }

    println!(
        "\n{:<15} {:<16} {:<18} {:<11} {:<10} {:>6} {:>6} {:>9}",
        "SCAN", "PROJECT", "TESTER", "TYPE", "STATUS", "ISSUES", "RISK", "TIME"
    );
    println!("{}", "-".repeat(98));

    for row in rows {
        let status = match row.status {
            ScanStatus::Completed => style(row.status.to_string()).green(),
            ScanStatus::Failed => style(row.status.to_string()).red(),
            ScanStatus::Pending | ScanStatus::Running => style(row.status.to_string()).yellow(),
        };
        let elapsed = row
            .duration_ms
            .map(|ms| format!("{:.1}s", ms as f64 / 1000.0))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<15} {:<16} {:<18} {:<11} {:<10} {:>6} {:>6} {:>9}",
            row.id.short(),
            truncate_string(&row.project, 16),
            truncate_string(&row.tester, 18),
            row.scan_type,
            status,
            row.findings,
            row.risk_score,
            elapsed
        );
    }
    println!();
}

/// Print the portfolio overview.
pub fn print_dashboard(stats: &DashboardStats) {
    println!();
    println!("{}", style(RULE).cyan());
    println!("                       {} Dashboard", style("secportal").cyan().bold());
    println!("{}", style(RULE).cyan());
    println!();
    println!("  {} {}", style("Projects:").bold(), stats.total_projects);
    println!("  {} {}", style("Vulnerabilities:").bold(), stats.total_vulnerabilities);
    println!("  {} {}", style("Critical:").bold(), style(stats.critical).magenta().bold());
    println!("  {} {}", style("Resolved:").bold(), style(stats.resolved).green());
    println!();

    let total = stats.by_severity.total().max(1);
    for severity in Severity::ALL {
        let count = stats.by_severity.get(severity);
        let bar = "█".repeat(count * 40 / total);
        println!(
            "  {:<9} {:>4}  {}",
            severity.to_string(),
            count,
            severity_style(severity).apply_to(bar)
        );
    }
    println!();
}

/// Print the administrator overview.
pub fn print_admin(stats: &AdminStats) {
    println!();
    println!("  {} {}", style("Users:").bold(), stats.total_users);
    println!("  {} {}", style("Active testers:").bold(), stats.active_testers);
    println!("  {} {}", style("Projects:").bold(), stats.total_projects);
    println!("  {} {}", style("Scans:").bold(), stats.total_scans);

    print_scans(&stats.recent_scans);
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate a string to a maximum length, adding ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
