//! Scanner trait abstraction.
//!
//! Defines a common interface for anything that can look at a project and
//! report findings, so the job runner does not care whether results come
//! from a real engine or from the built-in mock catalogue.

use crate::error::JobResult;
use crate::types::{
    NewVulnerability, Project, ScanType, Severity, UserId, VulnerabilityStatus,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A finding reported by a scanner, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Vulnerability class, e.g. "SQL Injection".
    pub kind: String,
    /// File or component the finding points at.
    pub file: String,
    pub severity: Severity,
    pub description: String,
    pub suggested_fix: String,
}

impl Finding {
    pub fn new(
        kind: impl Into<String>,
        file: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
        suggested_fix: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            file: file.into(),
            severity,
            description: description.into(),
            suggested_fix: suggested_fix.into(),
        }
    }

    /// Turn into an open vulnerability on `project` discovered by `tester`.
    pub fn into_vulnerability(self, project: &Project, tester: &UserId) -> NewVulnerability {
        NewVulnerability {
            project_id: project.id.clone(),
            kind: self.kind,
            file: self.file,
            severity: self.severity,
            description: self.description,
            suggested_fix: self.suggested_fix,
            status: VulnerabilityStatus::Open,
            discovered_by: tester.clone(),
        }
    }
}

/// Trait for vulnerability scanner implementations.
///
/// # Example
///
/// ```ignore
/// use secportal::scan::{VulnerabilityScanner, Finding};
///
/// async fn count<S: VulnerabilityScanner>(scanner: &S, project: &Project) -> usize {
///     scanner.discover(project).await.map(|f| f.len()).unwrap_or(0)
/// }
/// ```
#[async_trait]
pub trait VulnerabilityScanner: Send + Sync {
    /// Get the scan type this scanner implements.
    fn scan_type(&self) -> ScanType;

    /// Examine `project` and report what was found.
    ///
    /// May take arbitrarily long; the job runner races it against
    /// cancellation.
    async fn discover(&self, project: &Project) -> JobResult<Vec<Finding>>;
}

/// A shared scanner for dynamic dispatch across jobs.
pub type SharedScanner = Arc<dyn VulnerabilityScanner>;
