//! Scan jobs.
//!
//! A scan runs as a background tokio task that walks the stored record
//! through `pending → running → completed`, or to `failed` when the
//! scanner errors or the job is cancelled. Findings are stored as
//! vulnerabilities and the scan's risk score is the weighted sum of their
//! severities.

mod mock;
mod traits;

pub use mock::MockScanner;
pub use traits::{Finding, SharedScanner, VulnerabilityScanner};

use crate::error::{JobResult, ScanError};
use crate::service::PortalService;
use crate::types::{
    risk_score, NewScan, Project, ProjectId, ProjectPatch, ScanId, ScanPatch, ScanResult,
    ScanStatus, UserId, VulnerabilityId,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Starts scan jobs against a shared [`PortalService`].
#[derive(Clone)]
pub struct ScanRunner {
    service: Arc<PortalService>,
}

impl ScanRunner {
    pub fn new(service: Arc<PortalService>) -> Self {
        Self { service }
    }

    /// Queue a scan of `project_id` and start it in the background.
    ///
    /// The scan record exists (as `pending`) by the time this returns.
    /// An unknown project fails here and writes nothing. Must be called
    /// from within a tokio runtime.
    pub fn start(
        &self,
        project_id: &ProjectId,
        tester_id: &UserId,
        scanner: SharedScanner,
    ) -> JobResult<ScanJob> {
        let project = self
            .service
            .project(project_id)?
            .ok_or_else(|| ScanError::ProjectNotFound(project_id.to_string()))?;

        let scan = self.service.create_scan(NewScan::pending(
            project.id.clone(),
            tester_id.clone(),
            scanner.scan_type(),
        ))?;

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let job = Job {
            service: Arc::clone(&self.service),
            scan: scan.clone(),
            project,
            scanner,
        };
        let handle = tokio::spawn(job.run(cancel_rx));

        Ok(ScanJob {
            id: scan.id,
            cancel: cancel_tx,
            handle,
        })
    }

    /// Start a scan and wait for it to finish.
    pub async fn run(
        &self,
        project_id: &ProjectId,
        tester_id: &UserId,
        scanner: SharedScanner,
    ) -> JobResult<ScanResult> {
        self.start(project_id, tester_id, scanner)?.wait().await
    }
}

/// Handle to a running scan.
///
/// Dropping the handle detaches the job; it keeps running to completion.
pub struct ScanJob {
    id: ScanId,
    cancel: watch::Sender<bool>,
    handle: JoinHandle<JobResult<ScanResult>>,
}

impl ScanJob {
    /// Id of the scan record this job drives.
    pub fn id(&self) -> &ScanId {
        &self.id
    }

    /// Ask the job to stop. The scan ends up `failed`.
    ///
    /// Has no effect once the scanner has already returned.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Wait for the job and return the final scan record.
    pub async fn wait(self) -> JobResult<ScanResult> {
        self.handle
            .await
            .map_err(|e| ScanError::TaskAborted(e.to_string()))?
    }
}

/// Wait for every job, in the order given.
pub async fn wait_all(jobs: Vec<ScanJob>) -> Vec<JobResult<ScanResult>> {
    futures::future::join_all(jobs.into_iter().map(ScanJob::wait)).await
}

/// State moved into the background task.
struct Job {
    service: Arc<PortalService>,
    scan: ScanResult,
    project: Project,
    scanner: SharedScanner,
}

impl Job {
    /// Drive the scan to a terminal state. Any error once the record
    /// exists leaves it `failed`, with the findings stored so far linked.
    async fn run(self, cancel: watch::Receiver<bool>) -> JobResult<ScanResult> {
        let mut created = Vec::new();

        match self.execute(cancel, &mut created).await {
            Ok(scan) => Ok(scan),
            Err(e) => {
                warn!(scan = %self.scan.id, error = %e, stored = created.len(), "scan failed");
                let patch = ScanPatch {
                    status: Some(ScanStatus::Failed),
                    vulnerabilities: (!created.is_empty()).then_some(created),
                    completed_at: Some(self.finished_at()),
                    ..Default::default()
                };
                if let Err(mark) = self.finish(patch) {
                    warn!(scan = %self.scan.id, error = %mark, "could not mark scan failed");
                }
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        mut cancel: watch::Receiver<bool>,
        created: &mut Vec<VulnerabilityId>,
    ) -> JobResult<ScanResult> {
        self.service
            .update_scan(&self.scan.id, ScanPatch::status(ScanStatus::Running))?;
        info!(scan = %self.scan.id, project = %self.project.id, "scan running");

        let outcome = tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => Err(ScanError::Cancelled),
            found = self.scanner.discover(&self.project) => found,
        };
        let findings = outcome?;

        let score = risk_score(findings.iter().map(|f| f.severity));
        for finding in findings {
            let vuln = self.service.create_vulnerability(
                finding.into_vulnerability(&self.project, &self.scan.tester_id),
            )?;
            created.push(vuln.id);
        }

        let completed_at = self.finished_at();
        if self
            .service
            .update_project(&self.project.id, ProjectPatch::scanned_at(completed_at))?
            .is_none()
        {
            warn!(project = %self.project.id, "project removed while scan was running");
        }

        let found = created.len();
        let scan = self.finish(ScanPatch {
            status: Some(ScanStatus::Completed),
            vulnerabilities: Some(created.clone()),
            completed_at: Some(completed_at),
            risk_score: Some(score),
        })?;

        info!(scan = %scan.id, found, risk_score = score, "scan completed");
        Ok(scan)
    }

    fn finish(&self, patch: ScanPatch) -> JobResult<ScanResult> {
        self.service
            .update_scan(&self.scan.id, patch)?
            .ok_or_else(|| ScanError::TaskAborted(format!("scan {} disappeared", self.scan.id)))
    }

    /// Completion time, never earlier than the start even if the clock
    /// stepped backwards.
    fn finished_at(&self) -> chrono::DateTime<Utc> {
        Utc::now().max(self.scan.started_at)
    }
}

/// Resolves once cancellation is requested. Never resolves if the handle
/// was dropped without cancelling.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppSettings;
    use crate::error::{StorageError, StorageResult};
    use crate::storage::{keys, KeyValueStore, MemoryStore};
    use crate::types::{NewProject, ScanType, Severity, VulnerabilityStatus};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Memory store that refuses writes to one key once its budget is spent.
    struct FailingStore {
        inner: MemoryStore,
        key: &'static str,
        budget: Arc<AtomicUsize>,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            if key == self.key
                && self
                    .budget
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_err()
            {
                return Err(StorageError::WriteFailed {
                    key: key.to_string(),
                    reason: "disk full".to_string(),
                });
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            self.inner.remove(key)
        }
    }

    fn failing_setup(key: &'static str) -> (Arc<PortalService>, Arc<AtomicUsize>, Project) {
        let budget = Arc::new(AtomicUsize::new(usize::MAX));
        let store = FailingStore {
            inner: MemoryStore::new(),
            key,
            budget: Arc::clone(&budget),
        };
        let service = Arc::new(PortalService::new(store, &AppSettings::default()));
        let project = service.create_project(NewProject::named("P1")).unwrap();
        (service, budget, project)
    }

    struct FixedScanner(Vec<Finding>);

    #[async_trait]
    impl VulnerabilityScanner for FixedScanner {
        fn scan_type(&self) -> ScanType {
            ScanType::Static
        }

        async fn discover(&self, _project: &Project) -> JobResult<Vec<Finding>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenScanner;

    #[async_trait]
    impl VulnerabilityScanner for BrokenScanner {
        fn scan_type(&self) -> ScanType {
            ScanType::Dynamic
        }

        async fn discover(&self, _project: &Project) -> JobResult<Vec<Finding>> {
            Err(ScanError::ScannerFailed("target unreachable".into()))
        }
    }

    fn setup() -> (Arc<PortalService>, ScanRunner, Project, UserId) {
        let service = Arc::new(PortalService::in_memory());
        let runner = ScanRunner::new(Arc::clone(&service));
        let project = service.create_project(NewProject::named("P1")).unwrap();
        (service, runner, project, UserId::from("tester-1"))
    }

    #[tokio::test]
    async fn test_mock_scan_completes() {
        let (service, runner, project, tester) = setup();
        let scanner = Arc::new(MockScanner::new(ScanType::Static, Duration::ZERO));

        let scan = runner.run(&project.id, &tester, scanner).await.unwrap();

        assert_eq!(scan.status, ScanStatus::Completed);
        assert_eq!(scan.risk_score, 30);
        assert_eq!(scan.vulnerabilities.len(), 5);
        assert!(scan.completed_at.unwrap() >= scan.started_at);

        let vulns = service.vulnerabilities().unwrap();
        assert_eq!(vulns.len(), 5);
        assert!(vulns
            .iter()
            .all(|v| v.discovered_by == tester && v.status == VulnerabilityStatus::Open));

        let stored_ids: Vec<_> = vulns.into_iter().map(|v| v.id).collect();
        assert_eq!(scan.vulnerabilities, stored_ids);

        let project = service.project(&project.id).unwrap().unwrap();
        assert_eq!(project.last_scanned, scan.completed_at);
    }

    #[tokio::test]
    async fn test_risk_score_matches_findings() {
        let (_service, runner, project, tester) = setup();
        let findings = vec![
            Finding::new("a", "f", Severity::Medium, "", ""),
            Finding::new("b", "f", Severity::Medium, "", ""),
            Finding::new("c", "f", Severity::Critical, "", ""),
        ];

        let scan = runner
            .run(&project.id, &tester, Arc::new(FixedScanner(findings)))
            .await
            .unwrap();
        assert_eq!(scan.risk_score, 4 + 4 + 10);
    }

    #[tokio::test]
    async fn test_empty_findings_score_zero() {
        let (_service, runner, project, tester) = setup();
        let scan = runner
            .run(&project.id, &tester, Arc::new(FixedScanner(Vec::new())))
            .await
            .unwrap();
        assert_eq!(scan.status, ScanStatus::Completed);
        assert_eq!(scan.risk_score, 0);
    }

    #[tokio::test]
    async fn test_scanner_error_marks_failed() {
        let (service, runner, project, tester) = setup();

        let job = runner
            .start(&project.id, &tester, Arc::new(BrokenScanner))
            .unwrap();
        let id = job.id().clone();
        let err = job.wait().await.unwrap_err();
        assert!(matches!(err, ScanError::ScannerFailed(_)));

        let scan = service.scan(&id).unwrap().unwrap();
        assert_eq!(scan.status, ScanStatus::Failed);
        assert!(scan.completed_at.is_some());
        assert!(service.vulnerabilities().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_marks_failed() {
        let (service, runner, project, tester) = setup();
        let scanner = Arc::new(MockScanner::new(ScanType::Static, Duration::from_secs(60)));

        let job = runner.start(&project.id, &tester, scanner).unwrap();
        let id = job.id().clone();
        job.cancel();

        assert!(matches!(job.wait().await, Err(ScanError::Cancelled)));

        let scan = service.scan(&id).unwrap().unwrap();
        assert_eq!(scan.status, ScanStatus::Failed);
        assert!(scan.completed_at.unwrap() >= scan.started_at);
        assert!(service.project(&project.id).unwrap().unwrap().last_scanned.is_none());
    }

    #[tokio::test]
    async fn test_unknown_project_writes_nothing() {
        let (service, runner, _project, tester) = setup();
        let result = runner.start(
            &ProjectId::from("project-missing"),
            &tester,
            Arc::new(MockScanner::new(ScanType::Static, Duration::ZERO)),
        );

        assert!(matches!(result, Err(ScanError::ProjectNotFound(_))));
        assert!(service.scans().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pending_record_exists_before_job_runs() {
        let (service, runner, project, tester) = setup();
        let scanner = Arc::new(MockScanner::new(ScanType::Dependency, Duration::from_secs(60)));

        let job = runner.start(&project.id, &tester, scanner).unwrap();
        let stored = service.scan(job.id()).unwrap().unwrap();
        assert!(!stored.status.is_terminal());
        assert_eq!(stored.scan_type, ScanType::Dependency);

        job.cancel();
        let _ = job.wait().await;
    }

    #[tokio::test]
    async fn test_wait_all_runs_jobs_concurrently() {
        let (service, runner, project, tester) = setup();
        let other = service.create_project(NewProject::named("P2")).unwrap();
        let scanner: SharedScanner = Arc::new(MockScanner::new(ScanType::Static, Duration::ZERO));

        let jobs = vec![
            runner.start(&project.id, &tester, Arc::clone(&scanner)).unwrap(),
            runner.start(&other.id, &tester, scanner).unwrap(),
        ];
        let results = wait_all(jobs).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(service.vulnerabilities().unwrap().len(), 10);
        assert_eq!(service.scans().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_storage_error_marks_failed() {
        let (service, budget, project) = failing_setup(keys::VULNERABILITIES);
        budget.store(0, Ordering::SeqCst);

        let runner = ScanRunner::new(Arc::clone(&service));
        let scanner = Arc::new(MockScanner::new(ScanType::Static, Duration::ZERO));
        let job = runner
            .start(&project.id, &UserId::from("tester-1"), scanner)
            .unwrap();
        let id = job.id().clone();

        let err = job.wait().await.unwrap_err();
        assert!(matches!(err, ScanError::Storage(StorageError::WriteFailed { .. })));

        let scan = service.scan(&id).unwrap().unwrap();
        assert_eq!(scan.status, ScanStatus::Failed);
        assert!(scan.completed_at.unwrap() >= scan.started_at);
        assert!(scan.vulnerabilities.is_empty());
        assert!(service.project(&project.id).unwrap().unwrap().last_scanned.is_none());
    }

    #[tokio::test]
    async fn test_partial_findings_stay_linked_to_failed_scan() {
        let (service, budget, project) = failing_setup(keys::VULNERABILITIES);
        budget.store(2, Ordering::SeqCst);

        let runner = ScanRunner::new(Arc::clone(&service));
        let scanner = Arc::new(MockScanner::new(ScanType::Static, Duration::ZERO));
        let job = runner
            .start(&project.id, &UserId::from("tester-1"), scanner)
            .unwrap();
        let id = job.id().clone();
        assert!(job.wait().await.is_err());

        let scan = service.scan(&id).unwrap().unwrap();
        assert_eq!(scan.status, ScanStatus::Failed);
        let stored: Vec<_> = service
            .vulnerabilities()
            .unwrap()
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(stored.len(), 2);
        assert_eq!(scan.vulnerabilities, stored);
    }
}
