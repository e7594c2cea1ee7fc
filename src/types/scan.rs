//! Scan records.

use super::{ProjectId, ScanId, UserId, VulnerabilityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of analysis a scan performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    /// Source code analysis.
    Static,
    /// Third-party dependency audit.
    Dependency,
    /// Runtime probing of a deployed build.
    Dynamic,
}

impl Default for ScanType {
    fn default() -> Self {
        Self::Static
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Dependency => write!(f, "dependency"),
            Self::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Lifecycle of a scan job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl ScanStatus {
    /// Whether the scan has reached a final state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A persisted scan and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub id: ScanId,
    pub project_id: ProjectId,
    pub tester_id: UserId,
    pub scan_type: ScanType,
    pub status: ScanStatus,
    /// Findings produced by this scan, in discovery order.
    pub vulnerabilities: Vec<VulnerabilityId>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub risk_score: u32,
}

impl ScanResult {
    /// Wall-clock duration, once the scan has finished.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|done| done - self.started_at)
    }
}

/// Caller-supplied fields for a new scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScan {
    pub project_id: ProjectId,
    pub tester_id: UserId,
    pub scan_type: ScanType,
    pub status: ScanStatus,
    #[serde(default)]
    pub vulnerabilities: Vec<VulnerabilityId>,
    #[serde(default)]
    pub risk_score: u32,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl NewScan {
    /// A scan queued for `project_id`, not yet started.
    pub fn pending(project_id: ProjectId, tester_id: UserId, scan_type: ScanType) -> Self {
        Self {
            project_id,
            tester_id,
            scan_type,
            status: ScanStatus::Pending,
            vulnerabilities: Vec::new(),
            risk_score: 0,
            completed_at: None,
        }
    }

    pub(crate) fn into_scan(self) -> ScanResult {
        ScanResult {
            id: ScanId::generate(),
            project_id: self.project_id,
            tester_id: self.tester_id,
            scan_type: self.scan_type,
            status: self.status,
            vulnerabilities: self.vulnerabilities,
            started_at: Utc::now(),
            completed_at: self.completed_at,
            risk_score: self.risk_score,
        }
    }
}

/// Shallow update for a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanPatch {
    pub status: Option<ScanStatus>,
    pub vulnerabilities: Option<Vec<VulnerabilityId>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub risk_score: Option<u32>,
}

impl ScanPatch {
    pub fn status(status: ScanStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn apply(self, scan: &mut ScanResult) {
        if let Some(status) = self.status {
            scan.status = status;
        }
        if let Some(vulns) = self.vulnerabilities {
            scan.vulnerabilities = vulns;
        }
        if let Some(at) = self.completed_at {
            scan.completed_at = Some(at);
        }
        if let Some(score) = self.risk_score {
            scan.risk_score = score;
        }
    }
}
