//! Vulnerability findings and their severities.

use super::{ProjectId, UserId, VulnerabilityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How bad a finding is.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// Contribution of one finding of this severity to a risk score.
    pub const fn weight(self) -> u32 {
        match self {
            Self::Critical => 10,
            Self::High => 7,
            Self::Medium => 4,
            Self::Low => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Sum of severity weights over a set of findings.
pub fn risk_score<I>(severities: I) -> u32
where
    I: IntoIterator<Item = Severity>,
{
    severities.into_iter().map(Severity::weight).sum()
}

/// Triage state of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum VulnerabilityStatus {
    Open,
    InProgress,
    Fixed,
    Ignored,
}

impl fmt::Display for VulnerabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Fixed => write!(f, "fixed"),
            Self::Ignored => write!(f, "ignored"),
        }
    }
}

/// A single finding recorded against a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    pub id: VulnerabilityId,
    pub project_id: ProjectId,
    #[serde(rename = "type")]
    pub kind: String,
    pub file: String,
    pub severity: Severity,
    pub description: String,
    pub suggested_fix: String,
    pub status: VulnerabilityStatus,
    pub discovered_at: DateTime<Utc>,
    pub discovered_by: UserId,
}

/// Caller-supplied fields for a new vulnerability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVulnerability {
    pub project_id: ProjectId,
    #[serde(rename = "type")]
    pub kind: String,
    pub file: String,
    pub severity: Severity,
    pub description: String,
    pub suggested_fix: String,
    pub status: VulnerabilityStatus,
    pub discovered_by: UserId,
}

impl NewVulnerability {
    pub(crate) fn into_vulnerability(self) -> Vulnerability {
        Vulnerability {
            id: VulnerabilityId::generate(),
            project_id: self.project_id,
            kind: self.kind,
            file: self.file,
            severity: self.severity,
            description: self.description,
            suggested_fix: self.suggested_fix,
            status: self.status,
            discovered_at: Utc::now(),
            discovered_by: self.discovered_by,
        }
    }
}

/// Shallow update for a vulnerability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityPatch {
    pub project_id: Option<ProjectId>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub file: Option<String>,
    pub severity: Option<Severity>,
    pub description: Option<String>,
    pub suggested_fix: Option<String>,
    pub status: Option<VulnerabilityStatus>,
    pub discovered_by: Option<UserId>,
}

impl VulnerabilityPatch {
    /// Patch that only changes the triage status.
    pub fn status(status: VulnerabilityStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn apply(self, vuln: &mut Vulnerability) {
        if let Some(project_id) = self.project_id {
            vuln.project_id = project_id;
        }
        if let Some(kind) = self.kind {
            vuln.kind = kind;
        }
        if let Some(file) = self.file {
            vuln.file = file;
        }
        if let Some(severity) = self.severity {
            vuln.severity = severity;
        }
        if let Some(description) = self.description {
            vuln.description = description;
        }
        if let Some(fix) = self.suggested_fix {
            vuln.suggested_fix = fix;
        }
        if let Some(status) = self.status {
            vuln.status = status;
        }
        if let Some(by) = self.discovered_by {
            vuln.discovered_by = by;
        }
    }
}
