//! Configuration service.
//!
//! Loads `AppConfig` from `config.toml` and caches it. A missing or
//! unreadable file falls back to defaults.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use openvibe_core::config::AppConfig;
use openvibe_core::error::Result;

use crate::paths::OpenVibePaths;

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    pub fn new(paths: &OpenVibePaths) -> Result<Self> {
        Ok(Self::with_path(paths.config_file()?))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the configuration, loading it on first access.
    pub fn get_config(&self) -> AppConfig {
        if let Ok(guard) = self.config.read() {
            if let Some(cached) = guard.as_ref() {
                return cached.clone();
            }
        }

        let loaded = match Self::load_from(&self.path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    "[ConfigService] Using defaults, failed to load {}: {}",
                    self.path.display(),
                    e
                );
                AppConfig::default()
            }
        };

        if let Ok(mut guard) = self.config.write() {
            *guard = Some(loaded.clone());
        }
        loaded
    }

    /// Forces a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut guard) = self.config.write() {
            *guard = None;
        }
    }

    /// Strict load: a missing file is the default config, a malformed one is
    /// an error.
    pub fn load_from(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            tracing::debug!("[ConfigService] No config at {}", path.display());
            return Ok(AppConfig::default());
        }
        let raw = std::fs::read_to_string(path)?;
        AppConfig::from_toml_str(&raw)
    }
}
