//! The persistence service.
//!
//! [`PortalService`] is the only reader and writer of portal state. Each
//! collection lives under one key of a [`KeyValueStore`] as a JSON array;
//! operations load the collection, change it and write it back while
//! holding the service's write lock, so callers sharing one service never
//! lose each other's updates.
//!
//! Missing records are `None`, never errors. Only backend faults surface
//! as [`StorageError`](crate::error::StorageError).

mod collection;

use crate::auth::Credential;
use crate::config::AppSettings;
use crate::error::{StorageError, StorageResult};
use crate::storage::{keys, BoxedStore, KeyValueStore, MemoryStore};
use crate::types::{
    NewProject, NewScan, NewVulnerability, Project, ProjectId, ProjectPatch, Role, ScanId,
    ScanPatch, ScanResult, Session, User, UserId, Vulnerability, VulnerabilityId,
    VulnerabilityPatch,
};
use collection::Record;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Data access layer for users, projects, vulnerabilities and scans.
pub struct PortalService {
    store: BoxedStore,
    demo_password: String,
    write_lock: Mutex<()>,
    initialized: AtomicBool,
}

impl PortalService {
    /// Wrap a backend. Nothing is read or written until the first call.
    pub fn new(store: impl KeyValueStore + 'static, settings: &AppSettings) -> Self {
        Self {
            store: Box::new(store),
            demo_password: settings.demo_password.clone(),
            write_lock: Mutex::new(()),
            initialized: AtomicBool::new(false),
        }
    }

    /// A service over a fresh in-memory store with default settings.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new(), &AppSettings::default())
    }

    // ---------------------------------------------------------------
    // Sessions
    // ---------------------------------------------------------------

    /// Log in as the first user whose email matches exactly.
    ///
    /// Returns `None`, leaving the session untouched, when the email is
    /// unknown or the password does not verify.
    pub fn login(&self, email: &str, password: &str) -> StorageResult<Option<User>> {
        let _guard = self.lock();
        self.ensure_initialized()?;

        let users = collection::load::<User>(self.store())?;
        let Some(user) = users.into_iter().find(|u| u.email == email) else {
            debug!(email, "login rejected: unknown email");
            return Ok(None);
        };

        let verified = match collection::find::<Credential>(self.store(), &user.id)? {
            Some(credential) => credential.verify(password)?,
            None => false,
        };
        if !verified {
            debug!(user = %user.id, "login rejected: bad password");
            return Ok(None);
        }

        self.write_session(&Session::open(user.clone()))?;
        info!(user = %user.id, "logged in");
        Ok(Some(user))
    }

    /// Register a new user and make it the session user.
    ///
    /// Emails are not checked for uniqueness.
    pub fn signup(
        &self,
        email: &str,
        name: &str,
        role: Role,
        password: &str,
    ) -> StorageResult<User> {
        let user = User::new(email, name, role);
        let credential = Credential::new(user.id.clone(), password)?;

        let _guard = self.lock();
        self.ensure_initialized()?;

        let user = collection::append(self.store(), user)?;
        collection::append(self.store(), credential)?;
        self.write_session(&Session::open(user.clone()))?;

        info!(user = %user.id, role = %user.role, "signed up");
        Ok(user)
    }

    /// Clear the session. Safe to call when nobody is logged in.
    pub fn logout(&self) -> StorageResult<()> {
        let _guard = self.lock();
        self.store().remove(keys::CURRENT_USER)?;
        debug!("logged out");
        Ok(())
    }

    /// The logged-in user, if any.
    pub fn current_user(&self) -> StorageResult<Option<User>> {
        Ok(self.session()?.map(|session| session.user))
    }

    /// The full session record, if any.
    pub fn session(&self) -> StorageResult<Option<Session>> {
        let _guard = self.lock();
        self.ensure_initialized()?;

        match self.store().get(keys::CURRENT_USER)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StorageError::Corrupt {
                    key: keys::CURRENT_USER.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    // ---------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------

    /// All users in insertion order, demo accounts included.
    pub fn users(&self) -> StorageResult<Vec<User>> {
        self.all::<User>()
    }

    pub fn user(&self, id: &UserId) -> StorageResult<Option<User>> {
        self.one::<User>(id)
    }

    // ---------------------------------------------------------------
    // Projects
    // ---------------------------------------------------------------

    pub fn projects(&self) -> StorageResult<Vec<Project>> {
        self.all::<Project>()
    }

    pub fn project(&self, id: &ProjectId) -> StorageResult<Option<Project>> {
        self.one::<Project>(id)
    }

    /// Store a new project with a fresh id and creation time.
    pub fn create_project(&self, project: NewProject) -> StorageResult<Project> {
        let created = self.insert(project.into_project())?;
        info!(project = %created.id, name = %created.name, "created project");
        Ok(created)
    }

    /// Merge `patch` into the project. `None` if it does not exist.
    pub fn update_project(
        &self,
        id: &ProjectId,
        patch: ProjectPatch,
    ) -> StorageResult<Option<Project>> {
        self.modify::<Project, _>(id, |project| patch.apply(project))
    }

    /// Remove the project. Always reports success, whether or not it
    /// existed. Vulnerabilities and scans that reference it are kept.
    pub fn delete_project(&self, id: &ProjectId) -> StorageResult<bool> {
        let _guard = self.lock();
        self.ensure_initialized()?;

        let removed = collection::remove::<Project>(self.store(), id)?;
        info!(project = %id, removed, "deleted project");
        Ok(true)
    }

    // ---------------------------------------------------------------
    // Vulnerabilities
    // ---------------------------------------------------------------

    pub fn vulnerabilities(&self) -> StorageResult<Vec<Vulnerability>> {
        self.all::<Vulnerability>()
    }

    pub fn vulnerability(&self, id: &VulnerabilityId) -> StorageResult<Option<Vulnerability>> {
        self.one::<Vulnerability>(id)
    }

    /// Store a new finding with a fresh id and discovery time.
    pub fn create_vulnerability(&self, vuln: NewVulnerability) -> StorageResult<Vulnerability> {
        let created = self.insert(vuln.into_vulnerability())?;
        debug!(vuln = %created.id, severity = %created.severity, "created vulnerability");
        Ok(created)
    }

    pub fn update_vulnerability(
        &self,
        id: &VulnerabilityId,
        patch: VulnerabilityPatch,
    ) -> StorageResult<Option<Vulnerability>> {
        self.modify::<Vulnerability, _>(id, |vuln| patch.apply(vuln))
    }

    // ---------------------------------------------------------------
    // Scans
    // ---------------------------------------------------------------

    pub fn scans(&self) -> StorageResult<Vec<ScanResult>> {
        self.all::<ScanResult>()
    }

    pub fn scan(&self, id: &ScanId) -> StorageResult<Option<ScanResult>> {
        self.one::<ScanResult>(id)
    }

    /// Store a new scan with a fresh id and start time.
    pub fn create_scan(&self, scan: NewScan) -> StorageResult<ScanResult> {
        let created = self.insert(scan.into_scan())?;
        info!(scan = %created.id, project = %created.project_id, "created scan");
        Ok(created)
    }

    pub fn update_scan(&self, id: &ScanId, patch: ScanPatch) -> StorageResult<Option<ScanResult>> {
        self.modify::<ScanResult, _>(id, |scan| patch.apply(scan))
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create absent collections, seeding users with the demo accounts.
    /// Runs once per service. Caller must hold the write lock.
    fn ensure_initialized(&self) -> StorageResult<()> {
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }
        let store = self.store();

        if !store.contains(keys::USERS)? {
            let demo = User::demo_accounts();
            collection::save(store, &demo)?;
            info!(accounts = demo.len(), "seeded demo accounts");
        }

        // Users without a credential (fresh seeds, or a store written
        // before credentials existed) log in with the demo password.
        if !store.contains(keys::CREDENTIALS)? {
            let credentials = collection::load::<User>(store)?
                .iter()
                .map(|user| Credential::new(user.id.clone(), &self.demo_password))
                .collect::<Result<Vec<_>, _>>()?;
            collection::save(store, &credentials)?;
            info!(accounts = credentials.len(), "issued demo credentials");
        }

        for key in [keys::PROJECTS, keys::VULNERABILITIES, keys::SCANS] {
            if !store.contains(key)? {
                store.set(key, "[]")?;
            }
        }

        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    fn write_session(&self, session: &Session) -> StorageResult<()> {
        let raw = serde_json::to_string(session)?;
        self.store().set(keys::CURRENT_USER, &raw)
    }

    fn all<T: Record>(&self) -> StorageResult<Vec<T>> {
        let _guard = self.lock();
        self.ensure_initialized()?;
        collection::load::<T>(self.store())
    }

    fn one<T: Record>(&self, id: &T::Id) -> StorageResult<Option<T>> {
        let _guard = self.lock();
        self.ensure_initialized()?;
        collection::find::<T>(self.store(), id)
    }

    fn insert<T: Record>(&self, record: T) -> StorageResult<T> {
        let _guard = self.lock();
        self.ensure_initialized()?;
        collection::append(self.store(), record)
    }

    fn modify<T, F>(&self, id: &T::Id, change: F) -> StorageResult<Option<T>>
    where
        T: Record,
        F: FnOnce(&mut T),
    {
        let _guard = self.lock();
        self.ensure_initialized()?;

        let updated = collection::modify::<T, F>(self.store(), id, change)?;
        if updated.is_none() {
            debug!(key = T::KEY, id = %id, "update skipped: record not found");
        }
        Ok(updated)
    }
}
