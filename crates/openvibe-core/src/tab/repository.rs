//! Tab state repository trait.

use async_trait::async_trait;

use crate::error::Result;

use super::model::Tab;

/// Snapshot of everything the tab bar persists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedTabs {
    pub tabs: Vec<Tab>,
    pub active_tab_id: Option<String>,
}

/// Repository for the persisted tab list and active tab id.
///
/// Loading is infallible: unreadable or malformed storage degrades to an
/// empty (or partially restored) tab list.
#[async_trait]
pub trait TabStateRepository: Send + Sync {
    async fn load(&self) -> PersistedTabs;

    /// Writes the full tab list and active id. Best effort, never retried.
    async fn save(&self, state: &PersistedTabs) -> Result<()>;

    /// Removes both persisted keys.
    async fn clear(&self) -> Result<()>;
}
