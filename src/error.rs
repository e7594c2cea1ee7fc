//! Error types for secportal.
//!
//! Uses `thiserror` for ergonomic error definitions. "Not found" and
//! "invalid credentials" are not errors at the service layer; they come
//! back as `None`. Everything here is a genuine fault.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the key-value backend and the persistence service.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage directory error: {0}")]
    DirectoryError(String),

    #[error("failed to read key '{key}': {reason}")]
    ReadFailed { key: String, reason: String },

    #[error("failed to write key '{key}': {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("corrupt collection '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("credential error: {0}")]
    Auth(#[from] AuthError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Credential hashing faults. A wrong password is not one of these.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("failed to hash password: {0}")]
    HashFailed(String),

    #[error("stored credential is malformed: {0}")]
    MalformedHash(String),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid configuration format: {0}")]
    InvalidFormat(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from background scan jobs.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("scan was cancelled")]
    Cancelled,

    #[error("scanner failed: {0}")]
    ScannerFailed(String),

    #[error("scan task aborted: {0}")]
    TaskAborted(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Top-level error for CLI commands.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("not logged in (run `secportal login` first)")]
    Unauthenticated,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for credential operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for scan jobs.
pub type JobResult<T> = Result<T, ScanError>;

/// Result type alias for CLI commands.
pub type CliResult<T> = Result<T, CliError>;
