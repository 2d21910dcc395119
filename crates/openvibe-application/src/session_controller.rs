//! Session controller: owns the tab registry of one window.
//!
//! Every mutation is applied under a single lock and followed by a best
//! effort write-through to the [`TabStateRepository`], so the persisted tab
//! bar always reflects the latest completed mutation.

use std::sync::Arc;

use async_trait::async_trait;
use openvibe_core::bridge::{RelayCandidate, TabContext};
use openvibe_core::catalog::WorkspaceCatalog;
use openvibe_core::tab::{PersistedTabs, Tab, TabRegistry, TabStateRepository};
use tokio::sync::{Mutex, RwLock};

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub struct SessionController {
    registry: Mutex<TabRegistry>,
    catalog: RwLock<WorkspaceCatalog>,
    repository: Arc<dyn TabStateRepository>,
}

impl SessionController {
    /// Creates a controller with an empty tab bar.
    pub fn new(repository: Arc<dyn TabStateRepository>) -> Self {
        Self {
            registry: Mutex::new(TabRegistry::new()),
            catalog: RwLock::new(WorkspaceCatalog::default()),
            repository,
        }
    }

    /// Creates a controller and restores the persisted tab bar.
    pub async fn restore(repository: Arc<dyn TabStateRepository>) -> Self {
        let controller = Self::new(repository);
        controller.load().await;
        controller
    }

    /// Replaces the in-memory registry with the persisted one.
    pub async fn load(&self) {
        let persisted = self.repository.load().await;
        let restored = TabRegistry::from_parts(persisted.tabs, persisted.active_tab_id);
        tracing::info!(
            "[SessionController] Restored {} tabs (active: {:?})",
            restored.len(),
            restored.active_tab_id()
        );
        *self.registry.lock().await = restored;
    }

    pub async fn snapshot(&self) -> TabRegistry {
        self.registry.lock().await.clone()
    }

    pub async fn active_tab(&self) -> Option<Tab> {
        self.registry.lock().await.active_tab().cloned()
    }

    pub async fn contains_tab(&self, tab_id: &str) -> bool {
        self.registry.lock().await.get(tab_id).is_some()
    }

    /// Most recently activated tab other than `excluding`.
    pub async fn most_recent_tab(&self, excluding: Option<&str>) -> Option<Tab> {
        self.registry
            .lock()
            .await
            .most_recent_tab(excluding)
            .cloned()
    }

    pub async fn open_thread_tab(&self, workspace_id: &str, thread_id: &str, title: &str) -> String {
        let mut registry = self.registry.lock().await;
        let id = registry.open_thread_tab(workspace_id, thread_id, title, now_millis());
        tracing::debug!("[SessionController] Opened thread tab {}", id);
        self.persist(&registry).await;
        id
    }

    pub async fn open_workspace_tab(&self, workspace_id: &str, title: &str) -> String {
        let mut registry = self.registry.lock().await;
        let id = registry.open_workspace_tab(workspace_id, title, now_millis());
        tracing::debug!("[SessionController] Opened workspace tab {}", id);
        self.persist(&registry).await;
        id
    }

    pub async fn open_home_tab(&self, title: &str) -> String {
        let mut registry = self.registry.lock().await;
        let id = registry.open_home_tab(title, now_millis());
        self.persist(&registry).await;
        id
    }

    /// Returns false (and writes nothing) for unknown ids.
    pub async fn close_tab(&self, tab_id: &str) -> bool {
        let mut registry = self.registry.lock().await;
        if !registry.close_tab(tab_id) {
            tracing::debug!("[SessionController] close_tab: unknown tab {}", tab_id);
            return false;
        }
        tracing::debug!(
            "[SessionController] Closed {} (active now {:?})",
            tab_id,
            registry.active_tab_id()
        );
        self.persist(&registry).await;
        true
    }

    pub async fn set_active_tab(&self, tab_id: Option<&str>) {
        let mut registry = self.registry.lock().await;
        registry.set_active_tab(tab_id, now_millis());
        self.persist(&registry).await;
    }

    pub async fn mark_tab_loaded(&self, tab_id: &str) -> bool {
        let mut registry = self.registry.lock().await;
        let changed = registry.mark_tab_loaded(tab_id);
        if changed {
            self.persist(&registry).await;
        }
        changed
    }

    pub async fn reorder_tabs(&self, moved_id: &str, target_id: &str) -> bool {
        let mut registry = self.registry.lock().await;
        let changed = registry.reorder_tabs(moved_id, target_id);
        if changed {
            self.persist(&registry).await;
        }
        changed
    }

    /// Applies a fresh catalog snapshot: prunes tabs of removed workspaces and
    /// refreshes titles. Returns true when the tab bar changed.
    pub async fn reconcile(&self, catalog: WorkspaceCatalog) -> bool {
        let mut registry = self.registry.lock().await;
        let changed = registry.reconcile(&catalog);
        *self.catalog.write().await = catalog;
        if changed {
            tracing::info!(
                "[SessionController] Reconciled tab bar ({} tabs remain)",
                registry.len()
            );
            self.persist(&registry).await;
        }
        changed
    }

    async fn persist(&self, registry: &TabRegistry) {
        let state = PersistedTabs {
            tabs: registry.tabs().to_vec(),
            active_tab_id: registry.active_tab_id().map(str::to_string),
        };
        if let Err(e) = self.repository.save(&state).await {
            tracing::warn!("[SessionController] Failed to persist tabs: {}", e);
        }
    }
}

#[async_trait]
impl TabContext for SessionController {
    async fn active_workspace_id(&self) -> Option<String> {
        let registry = self.registry.lock().await;
        registry
            .active_tab()
            .filter(|tab| !tab.is_home())
            .map(|tab| tab.workspace_id.clone())
    }

    async fn relay_candidates(&self) -> Vec<RelayCandidate> {
        let registry = self.registry.lock().await;
        let catalog = self.catalog.read().await;
        registry
            .thread_tabs()
            .filter_map(|tab| {
                let thread_id = tab.thread_id()?;
                let workspace_name = catalog
                    .workspace_name(&tab.workspace_id)
                    .unwrap_or(tab.workspace_id.as_str());
                Some(RelayCandidate {
                    workspace_id: tab.workspace_id.clone(),
                    thread_id: thread_id.to_string(),
                    title: format!("{} / {}", workspace_name, tab.title),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openvibe_core::catalog::{ThreadSummary, WorkspaceInfo};
    use openvibe_core::error::{OpenVibeError, Result};
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    // Mock repository recording every save
    struct MockTabRepository {
        initial: PersistedTabs,
        saves: StdMutex<Vec<PersistedTabs>>,
        fail_saves: bool,
    }

    impl MockTabRepository {
        fn new(initial: PersistedTabs) -> Self {
            Self {
                initial,
                saves: StdMutex::new(Vec::new()),
                fail_saves: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail_saves: true,
                ..Self::new(PersistedTabs::default())
            }
        }

        fn last_save(&self) -> Option<PersistedTabs> {
            self.saves.lock().unwrap().last().cloned()
        }

        fn save_count(&self) -> usize {
            self.saves.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TabStateRepository for MockTabRepository {
        async fn load(&self) -> PersistedTabs {
            self.initial.clone()
        }

        async fn save(&self, state: &PersistedTabs) -> Result<()> {
            if self.fail_saves {
                return Err(OpenVibeError::storage("disk full"));
            }
            self.saves.lock().unwrap().push(state.clone());
            Ok(())
        }

        async fn clear(&self) -> Result<()> {
            Ok(())
        }
    }

    fn workspace(id: &str, name: &str) -> WorkspaceInfo {
        WorkspaceInfo {
            id: id.into(),
            name: name.into(),
            path: format!("/tmp/{}", id),
            connected: true,
        }
    }

    #[tokio::test]
    async fn test_open_and_close_persist_each_change() {
        let repo = Arc::new(MockTabRepository::new(PersistedTabs::default()));
        let controller = SessionController::new(repo.clone());

        controller.open_thread_tab("w1", "t1", "A").await;
        controller.open_thread_tab("w1", "t2", "B").await;
        assert_eq!(repo.save_count(), 2);

        assert!(controller.close_tab("w1:t2").await);
        let saved = repo.last_save().unwrap();
        assert_eq!(saved.tabs.len(), 1);
        assert_eq!(saved.active_tab_id.as_deref(), Some("w1:t1"));

        assert!(!controller.close_tab("missing").await);
        assert_eq!(repo.save_count(), 3);
    }

    #[tokio::test]
    async fn test_restore_normalizes_dangling_active_id() {
        let repo = Arc::new(MockTabRepository::new(PersistedTabs {
            tabs: vec![Tab::thread("w1", "t1", "A", 1), Tab::thread("w1", "t2", "B", 2)],
            active_tab_id: Some("w1:gone".into()),
        }));
        let controller = SessionController::restore(repo).await;
        assert_eq!(
            controller.snapshot().await.active_tab_id(),
            Some("w1:t1")
        );
    }

    #[tokio::test]
    async fn test_save_failures_do_not_block_mutations() {
        let controller = SessionController::new(Arc::new(MockTabRepository::failing()));
        controller.open_home_tab("Home").await;
        assert_eq!(controller.active_tab().await.unwrap().id, "home");
    }

    #[tokio::test]
    async fn test_reconcile_prunes_and_retitles() {
        let repo = Arc::new(MockTabRepository::new(PersistedTabs::default()));
        let controller = SessionController::new(repo.clone());
        controller.open_home_tab("Home").await;
        controller.open_thread_tab("w1", "t1", "old").await;
        controller.open_thread_tab("w2", "t9", "gone").await;

        let mut threads = HashMap::new();
        threads.insert(
            "w1".to_string(),
            vec![ThreadSummary {
                id: "t1".into(),
                name: "new".into(),
            }],
        );
        let catalog = WorkspaceCatalog::new(vec![workspace("w1", "Repo")], threads);

        assert!(controller.reconcile(catalog.clone()).await);
        let ids: Vec<String> = controller
            .snapshot()
            .await
            .tabs()
            .iter()
            .map(|tab| tab.id.clone())
            .collect();
        assert_eq!(ids, vec!["home", "w1:t1"]);
        assert_eq!(repo.last_save().unwrap().tabs[1].title, "new");

        let saves = repo.save_count();
        assert!(!controller.reconcile(catalog).await);
        assert_eq!(repo.save_count(), saves);
    }

    #[tokio::test]
    async fn test_tab_context_views() {
        let controller =
            SessionController::new(Arc::new(MockTabRepository::new(PersistedTabs::default())));
        controller
            .reconcile(WorkspaceCatalog::new(
                vec![workspace("w1", "Repo")],
                HashMap::new(),
            ))
            .await;

        controller.open_thread_tab("w1", "t1", "Fix login").await;
        controller.open_workspace_tab("w1", "Repo").await;
        controller.open_thread_tab("w2", "t2", "Docs").await;
        assert_eq!(controller.active_workspace_id().await.as_deref(), Some("w2"));

        let candidates = controller.relay_candidates().await;
        let titles: Vec<&str> = candidates.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Repo / Fix login", "w2 / Docs"]);

        controller.open_home_tab("Home").await;
        assert_eq!(controller.active_workspace_id().await, None);
    }

    #[tokio::test]
    async fn test_mark_loaded_and_reorder() {
        let repo = Arc::new(MockTabRepository::new(PersistedTabs::default()));
        let controller = SessionController::new(repo.clone());
        controller.open_thread_tab("w1", "a", "A").await;
        controller.open_thread_tab("w1", "b", "B").await;

        assert!(controller.mark_tab_loaded("w1:a").await);
        assert!(!controller.mark_tab_loaded("w1:a").await);

        assert!(controller.reorder_tabs("w1:b", "w1:a").await);
        let saved = repo.last_save().unwrap();
        assert_eq!(saved.tabs[0].id, "w1:b");
        assert!(saved.tabs[1].loaded);
    }
}
