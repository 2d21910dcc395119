//! Unified path management for OpenVibe files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/openvibe/             # Config directory
//! └── config.toml                 # Application configuration
//!
//! ~/.local/share/openvibe/        # Data directory
//! ├── local_storage.json          # Key/value store backing the tab bar
//! └── logs/                       # Application logs
//!     └── openvibe.log.YYYY-MM-DD
//! ```
//!
//! With a base directory override (tests, `--base-dir`), the layout becomes
//! `<base>/config/...` and `<base>/data/...`.

use std::path::PathBuf;

use openvibe_core::error::{OpenVibeError, Result};

const APP_DIR: &str = "openvibe";

/// Resolves every OpenVibe path, optionally rooted at a base directory.
#[derive(Debug, Clone, Default)]
pub struct OpenVibePaths {
    base_dir: Option<PathBuf>,
}

impl OpenVibePaths {
    /// Creates a resolver. `None` uses the platform directories.
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    /// Returns the configuration directory (e.g., `~/.config/openvibe/`).
    pub fn config_dir(&self) -> Result<PathBuf> {
        if let Some(base) = &self.base_dir {
            return Ok(base.join("config"));
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| OpenVibeError::config("Cannot determine config directory"))
    }

    /// Returns the data directory (e.g., `~/.local/share/openvibe/`).
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(base) = &self.base_dir {
            return Ok(base.join("data"));
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| OpenVibeError::config("Cannot determine data directory"))
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn local_storage_file(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("local_storage.json"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("logs"))
    }
}
