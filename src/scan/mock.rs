//! Built-in mock scanner.
//!
//! Waits for a fixed delay and then reports the same five fictitious
//! findings for every project. There is no real analysis behind it.

use super::traits::{Finding, VulnerabilityScanner};
use crate::error::JobResult;
use crate::types::{Project, ScanType, Severity};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Scanner that returns [`MockScanner::catalogue`] after `delay`.
#[derive(Debug, Clone)]
pub struct MockScanner {
    scan_type: ScanType,
    delay: Duration,
}

impl MockScanner {
    pub fn new(scan_type: ScanType, delay: Duration) -> Self {
        Self { scan_type, delay }
    }

    /// The fixed findings every mock scan reports.
    pub fn catalogue() -> Vec<Finding> {
        vec![
            Finding::new(
                "SQL Injection",
                "/api/users.js",
                Severity::Critical,
                "Unsanitized user input directly used in SQL query",
                "Use parameterized queries or ORM to prevent SQL injection",
            ),
            Finding::new(
                "XSS Vulnerability",
                "/components/Comment.tsx",
                Severity::High,
                "User input rendered without sanitization",
                "Use DOMPurify or escape HTML entities before rendering",
            ),
            Finding::new(
                "Insecure Dependency",
                "package.json",
                Severity::Medium,
                "Outdated version of express with known vulnerabilities",
                "Update express to latest version (^4.18.0)",
            ),
            Finding::new(
                "Weak Password Policy",
                "/auth/register.js",
                Severity::Low,
                "Password validation allows weak passwords",
                "Implement stronger password requirements (min 12 chars, special chars)",
            ),
            Finding::new(
                "Missing Rate Limiting",
                "/api/login.js",
                Severity::High,
                "No rate limiting on authentication endpoint",
                "Implement rate limiting using express-rate-limit",
            ),
        ]
    }
}

impl Default for MockScanner {
    fn default() -> Self {
        Self::new(ScanType::Static, Duration::from_millis(3000))
    }
}

#[async_trait]
impl VulnerabilityScanner for MockScanner {
    fn scan_type(&self) -> ScanType {
        self.scan_type
    }

    async fn discover(&self, project: &Project) -> JobResult<Vec<Finding>> {
        debug!(project = %project.id, delay_ms = self.delay.as_millis() as u64, "mock scan started");
        tokio::time::sleep(self.delay).await;
        Ok(Self::catalogue())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{risk_score, NewProject};

    #[test]
    fn test_catalogue_shape() {
        let findings = MockScanner::catalogue();
        assert_eq!(findings.len(), 5);

        let count = |s: Severity| findings.iter().filter(|f| f.severity == s).count();
        assert_eq!(count(Severity::Critical), 1);
        assert_eq!(count(Severity::High), 2);
        assert_eq!(count(Severity::Medium), 1);
        assert_eq!(count(Severity::Low), 1);

        assert_eq!(risk_score(findings.iter().map(|f| f.severity)), 30);
    }

    #[tokio::test]
    async fn test_discover_returns_catalogue() {
        let scanner = MockScanner::new(ScanType::Dependency, Duration::ZERO);
        let project = NewProject::named("P1").into_project();

        let findings = scanner.discover(&project).await.unwrap();
        assert_eq!(findings, MockScanner::catalogue());
        assert_eq!(scanner.scan_type(), ScanType::Dependency);
    }
}
