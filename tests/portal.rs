use clap::Parser;
use secportal::cli::{Cli, Context};
use secportal::config::AppSettings;
use secportal::report::{self, VulnerabilityFilter};
use secportal::scan::{MockScanner, ScanRunner};
use secportal::service::PortalService;
use secportal::storage::FileStore;
use secportal::types::{NewProject, Role, ScanStatus, ScanType, Severity};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn file_service(dir: &Path) -> PortalService {
    let store = FileStore::open(dir).unwrap();
    PortalService::new(store, &AppSettings::default())
}

fn cli(dir: &TempDir, args: &[&str]) -> Cli {
    let data_dir = dir.path().join("data");
    let config = dir.path().join("settings.json");
    if !config.exists() {
        let settings = AppSettings {
            scan_delay_ms: 1,
            ..AppSettings::default()
        };
        settings.save_to(&config).unwrap();
    }
    let mut argv = vec![
        "secportal".to_string(),
        "--quiet".to_string(),
        "--data-dir".to_string(),
        data_dir.display().to_string(),
        "--config".to_string(),
        config.display().to_string(),
    ];
    argv.extend(args.iter().map(|a| a.to_string()));
    Cli::parse_from(argv)
}

#[tokio::test]
async fn test_signup_project_scan_end_to_end() {
    let dir = TempDir::new().unwrap();
    let service = Arc::new(file_service(dir.path()));

    let admin = service.signup("a@x.com", "A", Role::Admin, "pw").unwrap();
    assert_eq!(service.users().unwrap().len(), 4);
    assert_eq!(service.current_user().unwrap().unwrap().id, admin.id);

    let project = service
        .create_project(NewProject::named("P1").with_owner("A"))
        .unwrap();

    let scanner = Arc::new(MockScanner::new(ScanType::Static, Duration::from_millis(5)));
    let scan = ScanRunner::new(Arc::clone(&service))
        .run(&project.id, &admin.id, scanner)
        .await
        .unwrap();

    assert_eq!(scan.status, ScanStatus::Completed);
    assert_eq!(scan.vulnerabilities.len(), 5);
    assert_eq!(scan.risk_score, 30);
    assert!(scan.completed_at.unwrap() >= scan.started_at);

    let vulns = service.vulnerabilities().unwrap();
    assert_eq!(vulns.len(), 5);
    assert!(vulns.iter().all(|v| v.project_id == project.id));
    assert!(service.project(&project.id).unwrap().unwrap().last_scanned.is_some());

    let critical = report::vulnerability_report(
        &service,
        &VulnerabilityFilter {
            project: Some(project.id.clone()),
            severity: Some(Severity::Critical),
        },
    )
    .unwrap();
    assert_eq!(critical.summary.total, 1);
    assert_eq!(critical.rows[0].project, "P1");
}

#[test]
fn test_file_store_survives_reopen() {
    let dir = TempDir::new().unwrap();

    let project_id = {
        let service = file_service(dir.path());
        service.signup("t@x.com", "T", Role::Tester, "secret").unwrap();
        service
            .create_project(NewProject::named("Persisted").with_owner("T"))
            .unwrap()
            .id
    };

    let reopened = file_service(dir.path());
    let project = reopened.project(&project_id).unwrap().unwrap();
    assert_eq!(project.name, "Persisted");
    assert_eq!(reopened.current_user().unwrap().unwrap().email, "t@x.com");

    reopened.logout().unwrap();
    assert!(reopened.login("t@x.com", "secret").unwrap().is_some());
    assert!(reopened.login("t@x.com", "wrong").unwrap().is_none());
}

#[test]
fn test_demo_accounts_log_in_with_default_password() {
    let dir = TempDir::new().unwrap();
    let service = file_service(dir.path());

    let admin = service.login("admin@secportal.com", "demo123").unwrap().unwrap();
    assert_eq!(admin.role, Role::Admin);
    assert!(service.login("ADMIN@secportal.com", "demo123").unwrap().is_none());
}

#[tokio::test]
async fn test_cli_commands_share_one_store() {
    let dir = TempDir::new().unwrap();

    let signup = cli(&dir, &["signup", "cli@x.com", "--name", "Cli", "--role", "tester", "--password", "pw"]);
    let ctx = Context::open(&signup).unwrap();
    signup.command.execute(&ctx).await.unwrap();

    let create = cli(&dir, &["projects", "create", "Web", "--tech", "rust,tokio"]);
    let ctx = Context::open(&create).unwrap();
    create.command.execute(&ctx).await.unwrap();

    let project = ctx.service.projects().unwrap().remove(0);
    assert_eq!(project.owner, "Cli");
    assert_eq!(project.tech_stack, vec!["rust", "tokio"]);

    let scan = cli(&dir, &["scan", project.id.as_str(), "--delay-ms", "1", "--output", "json"]);
    let ctx = Context::open(&scan).unwrap();
    scan.command.execute(&ctx).await.unwrap();

    let scans = ctx.service.scans().unwrap();
    assert_eq!(scans.len(), 1);
    assert_eq!(scans[0].status, ScanStatus::Completed);

    let logout = cli(&dir, &["logout"]);
    let ctx = Context::open(&logout).unwrap();
    logout.command.execute(&ctx).await.unwrap();

    let admin = cli(&dir, &["admin"]);
    let ctx = Context::open(&admin).unwrap();
    assert!(admin.command.execute(&ctx).await.is_err());
}

#[tokio::test]
async fn test_cli_report_writes_csv_file() {
    let dir = TempDir::new().unwrap();
    let service = Arc::new(file_service(&dir.path().join("data")));
    let tester = service.signup("r@x.com", "R", Role::Tester, "pw").unwrap();
    let project = service.create_project(NewProject::named("P1")).unwrap();
    ScanRunner::new(Arc::clone(&service))
        .run(
            &project.id,
            &tester.id,
            Arc::new(MockScanner::new(ScanType::Dependency, Duration::ZERO)),
        )
        .await
        .unwrap();

    let out = dir.path().join("report.csv");
    let out_arg = out.display().to_string();
    let report = cli(&dir, &["report", "--format", "csv", "--severity", "high", "-o", &out_arg]);
    let ctx = Context::open(&report).unwrap();
    report.command.execute(&ctx).await.unwrap();

    let csv = std::fs::read_to_string(&out).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.lines().skip(1).all(|l| l.contains(",high,")));
}

#[tokio::test]
async fn test_cli_scan_csv_output_succeeds() {
    let dir = TempDir::new().unwrap();
    let service = file_service(&dir.path().join("data"));
    service.signup("c@x.com", "C", Role::Tester, "pw").unwrap();
    let project = service.create_project(NewProject::named("P1")).unwrap();

    let scan = cli(&dir, &["scan", project.id.as_str(), "--output", "csv"]);
    let ctx = Context::open(&scan).unwrap();
    scan.command.execute(&ctx).await.unwrap();

    let scans = ctx.service.scans().unwrap();
    assert_eq!(scans[0].status, ScanStatus::Completed);
    assert_eq!(scans[0].risk_score, 30);
}

#[tokio::test]
async fn test_cli_config_init_respects_existing_file() {
    let dir = TempDir::new().unwrap();

    let init = cli(&dir, &["config", "init"]);
    let ctx = Context::open(&init).unwrap();
    assert!(init.command.execute(&ctx).await.is_err());

    let forced = cli(&dir, &["config", "init", "--force"]);
    let ctx = Context::open(&forced).unwrap();
    forced.command.execute(&ctx).await.unwrap();

    let written = AppSettings::load_from(&dir.path().join("settings.json")).unwrap();
    assert_eq!(written.scan_delay_ms, AppSettings::default().scan_delay_ms);
}
