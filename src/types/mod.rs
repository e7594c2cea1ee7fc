//! Core record types for the portal.
//!
//! Every collection has a typed id, a stored record, a `New*` struct with
//! the caller-supplied fields, and a `*Patch` struct for shallow updates.

mod id;
mod project;
mod scan;
mod user;
mod vulnerability;

pub use id::{IdError, ProjectId, ScanId, UserId, VulnerabilityId};
pub use project::{NewProject, Project, ProjectPatch};
pub use scan::{NewScan, ScanPatch, ScanResult, ScanStatus, ScanType};
pub use user::{Role, Session, User};
pub use vulnerability::{
    risk_score, NewVulnerability, Severity, Vulnerability, VulnerabilityPatch,
    VulnerabilityStatus,
};
