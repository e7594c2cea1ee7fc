//! # secportal - Security Testing Portal
//!
//! secportal keeps the records of a small security testing team: user
//! accounts, the projects under test, the vulnerabilities found in them
//! and the scans that found them. Everything lives in a key-value store,
//! one JSON collection per key.
//!
//! ## Features
//!
//! - **Accounts**: Sign up, log in and keep a session across runs
//! - **Projects**: Register, update and delete projects under test
//! - **Mock Scans**: Background scan jobs that record findings and a risk score
//! - **Triage**: Move findings through open, in-progress, fixed and ignored
//! - **Reports**: Filtered vulnerability reports in plain text, JSON and CSV
//! - **Overviews**: Dashboard and administrator statistics
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use secportal::scan::{MockScanner, ScanRunner};
//! use secportal::service::PortalService;
//! use secportal::types::{NewProject, Role};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = Arc::new(PortalService::in_memory());
//!     let tester = service.signup("a@x.com", "A", Role::Tester, "hunter2")?;
//!     let project = service.create_project(NewProject::named("P1").with_owner("A"))?;
//!
//!     let scan = ScanRunner::new(Arc::clone(&service))
//!         .run(&project.id, &tester.id, Arc::new(MockScanner::default()))
//!         .await?;
//!     println!("risk score {}", scan.risk_score);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Records, typed ids and their create/patch inputs
//! - [`storage`] - The `KeyValueStore` trait with memory and file backends
//! - [`service`] - `PortalService`, the CRUD and session layer over a store
//! - [`auth`] - Argon2 password hashing
//! - [`scan`] - Background scan jobs and the mock scanner
//! - [`report`] - Filters, reports and aggregate statistics
//! - [`config`] - Settings and on-disk paths
//! - [`output`] - Plain, JSON and CSV rendering
//! - [`error`] - Error types

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod report;
pub mod scan;
pub mod service;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ScanError, StorageError};
pub use scan::{MockScanner, ScanJob, ScanRunner};
pub use service::PortalService;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use types::{Project, ScanResult, Severity, User, Vulnerability};
