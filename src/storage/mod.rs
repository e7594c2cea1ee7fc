//! Key-value persistence backends.
//!
//! The portal keeps all state in a flat string-to-string store, one key
//! per collection. [`FileStore`] puts each key in its own JSON file;
//! [`MemoryStore`] keeps everything in process for tests and throwaway
//! sessions.

mod file_store;
mod memory;

pub use file_store::FileStore;
pub use memory::MemoryStore;

use crate::error::StorageResult;

/// Fixed key namespace of the persisted layout.
pub mod keys {
    pub const USERS: &str = "security_portal_users";
    pub const CURRENT_USER: &str = "security_portal_current_user";
    pub const PROJECTS: &str = "security_portal_projects";
    pub const VULNERABILITIES: &str = "security_portal_vulnerabilities";
    pub const SCANS: &str = "security_portal_scans";
    pub const CREDENTIALS: &str = "security_portal_credentials";

    /// Every key the portal writes.
    pub const ALL: [&str; 6] = [
        USERS,
        CURRENT_USER,
        PROJECTS,
        VULNERABILITIES,
        SCANS,
        CREDENTIALS,
    ];
}

/// A flat string key-value store.
///
/// Implementations must make `set` atomic per key: a concurrent `get`
/// sees either the old value or the new one.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Whether `key` currently holds a value.
    fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// A boxed store for dynamic dispatch.
pub type BoxedStore = Box<dyn KeyValueStore>;
