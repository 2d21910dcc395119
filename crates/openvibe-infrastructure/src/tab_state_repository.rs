//! Tab state repository over `LocalStorage`.

use std::sync::Arc;

use async_trait::async_trait;
use openvibe_core::config::StorageConfig;
use openvibe_core::error::{OpenVibeError, Result};
use openvibe_core::storage::LocalStorage;
use openvibe_core::tab::{PersistedTabs, TabStateRepository, decode_stored_tabs, encode_tabs};

/// Persists the tab bar as two local storage keys: the tab list as a JSON
/// array and the active tab id as a plain string.
#[derive(Clone)]
pub struct LocalStorageTabRepository {
    storage: Arc<dyn LocalStorage>,
    tabs_key: String,
    active_tab_key: String,
}

impl LocalStorageTabRepository {
    pub fn new(storage: Arc<dyn LocalStorage>, config: &StorageConfig) -> Self {
        Self {
            storage,
            tabs_key: config.tabs_key.clone(),
            active_tab_key: config.active_tab_key.clone(),
        }
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("[TabStateRepository] Failed to read {}: {}", key, e);
                None
            }
        }
    }

    fn load_blocking(&self) -> PersistedTabs {
        let now = chrono::Utc::now().timestamp_millis();
        let raw_tabs = self.read_key(&self.tabs_key);
        let tabs = decode_stored_tabs(raw_tabs.as_deref(), now);
        let active_tab_id = self
            .read_key(&self.active_tab_key)
            .filter(|id| !id.trim().is_empty());

        tracing::debug!(
            "[TabStateRepository] Loaded {} tabs (active: {:?})",
            tabs.len(),
            active_tab_id
        );
        PersistedTabs {
            tabs,
            active_tab_id,
        }
    }

    fn save_blocking(&self, state: &PersistedTabs) -> Result<()> {
        let encoded = encode_tabs(&state.tabs)?;
        self.storage.set_item(&self.tabs_key, &encoded)?;
        match state.active_tab_id.as_deref() {
            Some(id) => self.storage.set_item(&self.active_tab_key, id),
            None => self.storage.remove_item(&self.active_tab_key),
        }
    }

    fn clear_blocking(&self) -> Result<()> {
        self.storage.remove_item(&self.tabs_key)?;
        self.storage.remove_item(&self.active_tab_key)
    }
}

#[async_trait]
impl TabStateRepository for LocalStorageTabRepository {
    async fn load(&self) -> PersistedTabs {
        let repo = self.clone();
        match tokio::task::spawn_blocking(move || repo.load_blocking()).await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("[TabStateRepository] Load task failed: {}", e);
                PersistedTabs::default()
            }
        }
    }

    async fn save(&self, state: &PersistedTabs) -> Result<()> {
        let repo = self.clone();
        let state = state.clone();
        tokio::task::spawn_blocking(move || repo.save_blocking(&state))
            .await
            .map_err(|e| OpenVibeError::internal(format!("Failed to join task: {}", e)))?
    }

    async fn clear(&self) -> Result<()> {
        let repo = self.clone();
        tokio::task::spawn_blocking(move || repo.clear_blocking())
            .await
            .map_err(|e| OpenVibeError::internal(format!("Failed to join task: {}", e)))?
    }
}
