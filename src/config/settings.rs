//! Application settings and paths.
//!
//! Manages XDG-compliant paths for configuration and the data store.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/secportal)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/secportal)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Resolve paths using XDG directories. Nothing is created on disk.
    pub fn resolve() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "secportal", "secportal")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the path to the key-value store directory.
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Overrides the store directory.
    pub data_dir: Option<PathBuf>,
    /// Password given to the seeded demo accounts on first use of a store.
    pub demo_password: String,
    /// Simulated duration of a mock scan in milliseconds.
    pub scan_delay_ms: u64,
    /// Report format used when none is given on the command line.
    pub default_report_format: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            demo_password: "demo123".to_string(),
            scan_delay_ms: 3000,
            default_report_format: "plain".to_string(),
        }
    }
}

impl AppSettings {
    /// Load settings from the default location.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::resolve()?.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Save settings to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        let paths = Paths::resolve()?;
        fs::create_dir_all(&paths.config_dir)?;
        self.save_to(&paths.settings_file())
    }

    /// Save settings to a specific file.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Directory holding the key-value store, honoring the override.
    pub fn store_dir(&self) -> ConfigResult<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Paths::resolve()?.store_dir()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.scan_delay_ms, 3000);
        assert_eq!(settings.demo_password, "demo123");
        assert!(settings.data_dir.is_none());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let parsed: AppSettings = serde_json::from_str(r#"{"scan_delay_ms": 10}"#).unwrap();
        assert_eq!(parsed.scan_delay_ms, 10);
        assert_eq!(parsed.default_report_format, "plain");
    }

    #[test]
    fn test_save_and_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("settings.json");

        let settings = AppSettings {
            data_dir: Some(dir.path().join("store")),
            scan_delay_ms: 0,
            ..Default::default()
        };
        settings.save_to(&file).unwrap();

        let loaded = AppSettings::load_from(&file).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.store_dir().unwrap(), dir.path().join("store"));
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("settings.json");
        fs::write(&file, "not json").unwrap();

        assert!(matches!(
            AppSettings::load_from(&file),
            Err(ConfigError::InvalidFormat(_))
        ));
    }
}
