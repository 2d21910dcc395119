//! Application configuration model.
//!
//! Loaded from `config.toml`; every field has a default so a missing or
//! partial file still yields a usable configuration.

use serde::{Deserialize, Serialize};

use crate::bridge::SessionMode;
use crate::window::MAIN_WINDOW_LABEL;

pub const DEFAULT_TABS_KEY: &str = "openvibe.threadTabs";
pub const DEFAULT_ACTIVE_TAB_KEY: &str = "openvibe.activeThreadTabId";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub detached_window: DetachedWindowConfig,
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> crate::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn to_toml_string(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Local storage keys for the tab bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_tabs_key")]
    pub tabs_key: String,
    #[serde(default = "default_active_tab_key")]
    pub active_tab_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tabs_key: default_tabs_key(),
            active_tab_key: default_active_tab_key(),
        }
    }
}

fn default_tabs_key() -> String {
    DEFAULT_TABS_KEY.to_string()
}

fn default_active_tab_key() -> String {
    DEFAULT_ACTIVE_TAB_KEY.to_string()
}

/// Relay bridge routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Mode a session starts in before any `/mode` command.
    #[serde(default)]
    pub default_mode: SessionMode,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_mode: SessionMode::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Geometry of detached tab windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetachedWindowConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_min_width")]
    pub min_width: u32,
    #[serde(default = "default_min_height")]
    pub min_height: u32,
    #[serde(default = "default_main_window_label")]
    pub main_window_label: String,
}

impl Default for DetachedWindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            min_width: default_min_width(),
            min_height: default_min_height(),
            main_window_label: default_main_window_label(),
        }
    }
}

fn default_width() -> u32 {
    1320
}

fn default_height() -> u32 {
    860
}

fn default_min_width() -> u32 {
    900
}

fn default_min_height() -> u32 {
    640
}

fn default_main_window_label() -> String {
    MAIN_WINDOW_LABEL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.storage.tabs_key, "openvibe.threadTabs");
        assert_eq!(config.detached_window.width, 1320);
        assert!(config.bridge.enabled);
    }

    #[test]
    fn test_partial_toml_overrides_fields() {
        let raw = r#"
[bridge]
default_mode = "agent"

[detached_window]
min_width = 1000
"#;
        let config = AppConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.bridge.default_mode, SessionMode::Agent);
        assert!(config.bridge.enabled);
        assert_eq!(config.detached_window.min_width, 1000);
        assert_eq!(config.detached_window.height, 860);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = AppConfig::default();
        let raw = config.to_toml_string().unwrap();
        assert_eq!(AppConfig::from_toml_str(&raw).unwrap(), config);
    }
}
