//! Read-only aggregation over the stored collections.
//!
//! References between collections are never validated on write, so every
//! lookup here tolerates a dangling id and shows [`UNKNOWN`] instead.

use crate::error::StorageResult;
use crate::service::PortalService;
use crate::types::{
    Project, ProjectId, Role, ScanId, ScanResult, ScanStatus, ScanType, Severity, User, UserId,
    Vulnerability, VulnerabilityId, VulnerabilityStatus,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Placeholder for a reference whose target no longer exists.
pub const UNKNOWN: &str = "Unknown";

/// Which vulnerabilities a report covers. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VulnerabilityFilter {
    pub project: Option<ProjectId>,
    pub severity: Option<Severity>,
}

impl VulnerabilityFilter {
    pub fn matches(&self, vuln: &Vulnerability) -> bool {
        self.project.as_ref().map_or(true, |p| &vuln.project_id == p)
            && self.severity.map_or(true, |s| vuln.severity == s)
    }
}

/// One line of a vulnerability report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityRow {
    pub id: VulnerabilityId,
    pub project: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub file: String,
    pub severity: Severity,
    pub status: VulnerabilityStatus,
    pub description: String,
    pub suggested_fix: String,
    pub discovered_at: DateTime<Utc>,
}

/// Headline numbers for a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total: usize,
    pub critical: usize,
    pub open: usize,
    pub fixed: usize,
}

/// Filtered vulnerability listing with its summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityReport {
    pub generated_at: DateTime<Utc>,
    pub summary: ReportSummary,
    pub rows: Vec<VulnerabilityRow>,
}

/// Count of findings per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityBreakdown {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityBreakdown {
    pub fn from_vulnerabilities<'a, I>(vulns: I) -> Self
    where
        I: IntoIterator<Item = &'a Vulnerability>,
    {
        let mut breakdown = Self::default();
        for vuln in vulns {
            match vuln.severity {
                Severity::Critical => breakdown.critical += 1,
                Severity::High => breakdown.high += 1,
                Severity::Medium => breakdown.medium += 1,
                Severity::Low => breakdown.low += 1,
            }
        }
        breakdown
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// Portfolio overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_projects: usize,
    pub total_vulnerabilities: usize,
    pub critical: usize,
    pub resolved: usize,
    pub by_severity: SeverityBreakdown,
}

/// A scan with its references resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRow {
    pub id: ScanId,
    pub project: String,
    pub tester: String,
    pub scan_type: ScanType,
    pub status: ScanStatus,
    pub risk_score: u32,
    pub findings: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Wall time in milliseconds once the scan has finished.
    pub duration_ms: Option<i64>,
}

/// Administrator overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: usize,
    pub total_projects: usize,
    pub total_scans: usize,
    pub active_testers: usize,
    /// Most recent scans first.
    pub recent_scans: Vec<ScanRow>,
}

/// Build the filtered vulnerability report.
pub fn vulnerability_report(
    service: &PortalService,
    filter: &VulnerabilityFilter,
) -> StorageResult<VulnerabilityReport> {
    let project_list = service.projects()?;
    let projects = project_names(&project_list);

    let rows: Vec<VulnerabilityRow> = service
        .vulnerabilities()?
        .into_iter()
        .filter(|v| filter.matches(v))
        .map(|v| VulnerabilityRow {
            project: resolve(&projects, &v.project_id),
            id: v.id,
            kind: v.kind,
            file: v.file,
            severity: v.severity,
            status: v.status,
            description: v.description,
            suggested_fix: v.suggested_fix,
            discovered_at: v.discovered_at,
        })
        .collect();

    let summary = ReportSummary {
        total: rows.len(),
        critical: rows.iter().filter(|r| r.severity == Severity::Critical).count(),
        open: rows.iter().filter(|r| r.status == VulnerabilityStatus::Open).count(),
        fixed: rows.iter().filter(|r| r.status == VulnerabilityStatus::Fixed).count(),
    };

    Ok(VulnerabilityReport {
        generated_at: Utc::now(),
        summary,
        rows,
    })
}

/// Build the portfolio overview.
pub fn dashboard(service: &PortalService) -> StorageResult<DashboardStats> {
    let vulns = service.vulnerabilities()?;
    let by_severity = SeverityBreakdown::from_vulnerabilities(&vulns);

    Ok(DashboardStats {
        total_projects: service.projects()?.len(),
        total_vulnerabilities: vulns.len(),
        critical: by_severity.critical,
        resolved: vulns
            .iter()
            .filter(|v| v.status == VulnerabilityStatus::Fixed)
            .count(),
        by_severity,
    })
}

/// Build the administrator overview with up to `recent` scans.
pub fn admin_overview(service: &PortalService, recent: usize) -> StorageResult<AdminStats> {
    let users = service.users()?;
    let projects = service.projects()?;
    let scans = service.scans()?;

    Ok(AdminStats {
        total_users: users.len(),
        total_projects: projects.len(),
        total_scans: scans.len(),
        active_testers: users.iter().filter(|u| u.role == Role::Tester).count(),
        recent_scans: scan_rows(&scans, &projects, &users, recent),
    })
}

/// Resolve scans for display, newest first, at most `limit` of them.
pub fn scan_rows(
    scans: &[ScanResult],
    projects: &[Project],
    users: &[User],
    limit: usize,
) -> Vec<ScanRow> {
    let names = project_names(projects);
    let user_names: HashMap<&UserId, &str> =
        users.iter().map(|u| (&u.id, u.name.as_str())).collect();

    let mut rows: Vec<ScanRow> = scans
        .iter()
        .map(|scan| ScanRow {
            id: scan.id.clone(),
            project: resolve(&names, &scan.project_id),
            tester: user_names
                .get(&scan.tester_id)
                .map_or_else(|| UNKNOWN.to_string(), |name| name.to_string()),
            scan_type: scan.scan_type,
            status: scan.status,
            risk_score: scan.risk_score,
            findings: scan.vulnerabilities.len(),
            started_at: scan.started_at,
            completed_at: scan.completed_at,
            duration_ms: scan.duration().map(|d| d.num_milliseconds()),
        })
        .collect();

    rows.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    rows.truncate(limit);
    rows
}

fn project_names(projects: &[Project]) -> HashMap<&ProjectId, &str> {
    projects.iter().map(|p| (&p.id, p.name.as_str())).collect()
}

fn resolve(names: &HashMap<&ProjectId, &str>, id: &ProjectId) -> String {
    names
        .get(id)
        .map_or_else(|| UNKNOWN.to_string(), |name| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewProject, NewScan, NewVulnerability, VulnerabilityPatch};

    fn add_vuln(
        service: &PortalService,
        project: &ProjectId,
        severity: Severity,
    ) -> Vulnerability {
        service
            .create_vulnerability(NewVulnerability {
                project_id: project.clone(),
                kind: "XSS Vulnerability".into(),
                file: "/components/Comment.tsx".into(),
                severity,
                description: "desc".into(),
                suggested_fix: "fix".into(),
                status: VulnerabilityStatus::Open,
                discovered_by: UserId::from("tester-1"),
            })
            .unwrap()
    }

    #[test]
    fn test_report_filters_and_summarizes() {
        let service = PortalService::in_memory();
        let p1 = service.create_project(NewProject::named("P1")).unwrap();
        let p2 = service.create_project(NewProject::named("P2")).unwrap();

        let fixed = add_vuln(&service, &p1.id, Severity::Critical);
        add_vuln(&service, &p1.id, Severity::Low);
        add_vuln(&service, &p2.id, Severity::Critical);
        service
            .update_vulnerability(
                &fixed.id,
                VulnerabilityPatch::status(VulnerabilityStatus::Fixed),
            )
            .unwrap();

        let all = vulnerability_report(&service, &VulnerabilityFilter::default()).unwrap();
        assert_eq!(
            all.summary,
            ReportSummary {
                total: 3,
                critical: 2,
                open: 2,
                fixed: 1
            }
        );

        let filter = VulnerabilityFilter {
            project: Some(p1.id.clone()),
            severity: Some(Severity::Critical),
        };
        let report = vulnerability_report(&service, &filter).unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].project, "P1");
        assert_eq!(report.rows[0].status, VulnerabilityStatus::Fixed);
    }

    #[test]
    fn test_dangling_project_shows_unknown() {
        let service = PortalService::in_memory();
        let project = service.create_project(NewProject::named("Gone")).unwrap();
        add_vuln(&service, &project.id, Severity::Medium);
        service.delete_project(&project.id).unwrap();

        let report = vulnerability_report(&service, &VulnerabilityFilter::default()).unwrap();
        assert_eq!(report.rows[0].project, UNKNOWN);
    }

    #[test]
    fn test_dashboard_counts() {
        let service = PortalService::in_memory();
        let project = service.create_project(NewProject::named("P1")).unwrap();
        for severity in [Severity::Critical, Severity::High, Severity::High] {
            add_vuln(&service, &project.id, severity);
        }

        let stats = dashboard(&service).unwrap();
        assert_eq!(stats.total_projects, 1);
        assert_eq!(stats.total_vulnerabilities, 3);
        assert_eq!(stats.critical, 1);
        assert_eq!(stats.resolved, 0);
        assert_eq!(stats.by_severity.get(Severity::High), 2);
        assert_eq!(stats.by_severity.total(), 3);
    }

    #[test]
    fn test_admin_overview_resolves_names() {
        let service = PortalService::in_memory();
        let project = service.create_project(NewProject::named("P1")).unwrap();
        service
            .create_scan(NewScan::pending(
                project.id.clone(),
                UserId::from("tester-1"),
                ScanType::Static,
            ))
            .unwrap();
        service
            .create_scan(NewScan::pending(
                ProjectId::from("project-gone"),
                UserId::from("user-gone"),
                ScanType::Dynamic,
            ))
            .unwrap();

        let stats = admin_overview(&service, 10).unwrap();
        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.active_testers, 1);
        assert_eq!(stats.total_scans, 2);

        let known = stats
            .recent_scans
            .iter()
            .find(|r| r.scan_type == ScanType::Static)
            .unwrap();
        assert_eq!(known.project, "P1");
        assert_eq!(known.tester, "Security Tester");
        assert!(known.duration_ms.is_none());

        let dangling = stats
            .recent_scans
            .iter()
            .find(|r| r.scan_type == ScanType::Dynamic)
            .unwrap();
        assert_eq!(dangling.project, UNKNOWN);
        assert_eq!(dangling.tester, UNKNOWN);

        assert_eq!(admin_overview(&service, 1).unwrap().recent_scans.len(), 1);
    }

    #[test]
    fn test_report_json_is_camel_case_throughout() {
        let service = PortalService::in_memory();
        let project = service.create_project(NewProject::named("P1")).unwrap();
        add_vuln(&service, &project.id, Severity::High);

        let report = vulnerability_report(&service, &VulnerabilityFilter::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert!(json.get("generatedAt").is_some());
        assert!(json.get("generated_at").is_none());
        assert_eq!(json["summary"]["total"], 1);
        assert!(json["rows"][0].get("suggestedFix").is_some());
    }
}
