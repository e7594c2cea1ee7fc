//! Configuration management for secportal.
//!
//! Provides XDG-compliant paths and application settings.

mod settings;

pub use settings::{AppSettings, Paths};
