//! CSV output formatting.

use crate::report::{ScanRow, VulnerabilityReport};
use std::io;

const HEADER: [&str; 8] = [
    "Project",
    "Type",
    "File",
    "Severity",
    "Status",
    "Description",
    "Suggested Fix",
    "Discovered",
];

const SCAN_HEADER: [&str; 9] = [
    "Scan",
    "Project",
    "Tester",
    "Type",
    "Status",
    "Findings",
    "Risk Score",
    "Started",
    "Duration (ms)",
];

/// Render report rows as CSV, one header line plus one line per finding.
pub fn render_csv(report: &VulnerabilityReport) -> io::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(HEADER)?;

    for row in &report.rows {
        let severity = row.severity.to_string();
        let status = row.status.to_string();
        let discovered = row.discovered_at.to_rfc3339();

        wtr.write_record([
            row.project.as_str(),
            row.kind.as_str(),
            row.file.as_str(),
            severity.as_str(),
            status.as_str(),
            row.description.as_str(),
            row.suggested_fix.as_str(),
            discovered.as_str(),
        ])?;
    }

    finish(wtr)
}

/// Render resolved scans as CSV, one line per scan.
pub fn render_scans_csv(rows: &[ScanRow]) -> io::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(SCAN_HEADER)?;

    for row in rows {
        let scan_type = row.scan_type.to_string();
        let status = row.status.to_string();
        let findings = row.findings.to_string();
        let risk = row.risk_score.to_string();
        let started = row.started_at.to_rfc3339();
        let duration = row.duration_ms.map(|ms| ms.to_string()).unwrap_or_default();

        wtr.write_record([
            row.id.as_str(),
            row.project.as_str(),
            row.tester.as_str(),
            scan_type.as_str(),
            status.as_str(),
            findings.as_str(),
            risk.as_str(),
            started.as_str(),
            duration.as_str(),
        ])?;
    }

    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> io::Result<String> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
