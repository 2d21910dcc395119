//! The tab registry: ordered open tabs plus the active selection.
//!
//! All operations are synchronous state transitions. Timestamps are passed
//! in by the caller so the registry stays deterministic under test.

use std::collections::HashSet;

use crate::catalog::WorkspaceCatalog;

use super::model::{HOME_WORKSPACE_ID, Tab, TabKind};

/// In-memory tab list and active tab id.
///
/// After every mutation the active id is re-derived: an id that no longer
/// points at a tab falls back to the first tab, and an empty registry has no
/// active tab. Callers never observe a dangling active id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabRegistry {
    tabs: Vec<Tab>,
    active_tab_id: Option<String>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a registry from restored parts.
    ///
    /// Later duplicates of an id are dropped so the uniqueness invariant holds
    /// even for hand-edited storage.
    pub fn from_parts(tabs: Vec<Tab>, active_tab_id: Option<String>) -> Self {
        let mut seen = HashSet::new();
        let tabs = tabs
            .into_iter()
            .filter(|tab| seen.insert(tab.id.clone()))
            .collect();
        let mut registry = Self {
            tabs,
            active_tab_id,
        };
        registry.normalize_active();
        registry
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_tab_id(&self) -> Option<&str> {
        self.active_tab_id.as_deref()
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        let id = self.active_tab_id.as_deref()?;
        self.get(id)
    }

    pub fn get(&self, tab_id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == tab_id)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn thread_tabs(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter().filter(|tab| tab.is_thread())
    }

    fn position(&self, tab_id: &str) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id == tab_id)
    }

    // ============================================================================
    // Open
    // ============================================================================

    /// Opens (or re-focuses) the tab for a workspace thread. Returns its id.
    pub fn open_thread_tab(
        &mut self,
        workspace_id: &str,
        thread_id: &str,
        title: &str,
        now: i64,
    ) -> String {
        self.upsert(Tab::thread(workspace_id, thread_id, title, now), now)
    }

    /// Opens (or re-focuses) the overview tab of a workspace. Returns its id.
    pub fn open_workspace_tab(&mut self, workspace_id: &str, title: &str, now: i64) -> String {
        self.upsert(Tab::workspace(workspace_id, title, now), now)
    }

    /// Opens (or re-focuses) the home tab. Returns its id.
    pub fn open_home_tab(&mut self, title: &str, now: i64) -> String {
        self.upsert(Tab::home(title, now), now)
    }

    fn upsert(&mut self, candidate: Tab, now: i64) -> String {
        let id = candidate.id.clone();
        match self.tabs.iter_mut().find(|tab| tab.id == id) {
            Some(existing) => {
                existing.title = candidate.title;
                existing.last_active_at = now;
            }
            None => self.tabs.push(candidate),
        }
        self.active_tab_id = Some(id.clone());
        id
    }

    // ============================================================================
    // Close / activate / load
    // ============================================================================

    /// Removes a tab. Returns false when the id is unknown.
    ///
    /// Closing the active tab focuses its left neighbour, then the tab that
    /// slid into its slot, then nothing.
    pub fn close_tab(&mut self, tab_id: &str) -> bool {
        let Some(index) = self.position(tab_id) else {
            return false;
        };
        self.tabs.remove(index);
        if self.active_tab_id.as_deref() == Some(tab_id) {
            let next = index
                .checked_sub(1)
                .and_then(|left| self.tabs.get(left))
                .or_else(|| self.tabs.get(index));
            self.active_tab_id = next.map(|tab| tab.id.clone());
        }
        self.normalize_active();
        true
    }

    /// Activates a tab, stamping its last-active time.
    ///
    /// `None` clears the selection, which normalization immediately re-points
    /// at the first tab unless the registry is empty.
    pub fn set_active_tab(&mut self, tab_id: Option<&str>, now: i64) {
        if let Some(id) = tab_id {
            if let Some(tab) = self.tabs.iter_mut().find(|tab| tab.id == id) {
                tab.last_active_at = now;
            }
        }
        self.active_tab_id = tab_id.map(str::to_string);
        self.normalize_active();
    }

    /// One-way `loaded` transition. Returns true when the flag changed.
    pub fn mark_tab_loaded(&mut self, tab_id: &str) -> bool {
        match self.tabs.iter_mut().find(|tab| tab.id == tab_id) {
            Some(tab) if !tab.loaded => {
                tab.loaded = true;
                true
            }
            _ => false,
        }
    }

    /// Moves `moved_id` into the slot `target_id` occupied before the move.
    ///
    /// No-op when the ids are equal or either is unknown.
    pub fn reorder_tabs(&mut self, moved_id: &str, target_id: &str) -> bool {
        if moved_id == target_id {
            return false;
        }
        let (Some(from), Some(to)) = (self.position(moved_id), self.position(target_id)) else {
            return false;
        };
        let moved = self.tabs.remove(from);
        self.tabs.insert(to, moved);
        true
    }

    // ============================================================================
    // Derived state
    // ============================================================================

    /// Prunes tabs of vanished workspaces and refreshes titles from the catalog.
    ///
    /// The home tab is exempt from pruning. Running this twice with the same
    /// catalog is the same as running it once. Returns true when anything
    /// changed.
    pub fn reconcile(&mut self, catalog: &WorkspaceCatalog) -> bool {
        let before = self.tabs.len();
        self.tabs.retain(|tab| {
            tab.workspace_id == HOME_WORKSPACE_ID || catalog.contains_workspace(&tab.workspace_id)
        });
        let mut changed = self.tabs.len() != before;

        for tab in &mut self.tabs {
            let fresh = match &tab.kind {
                TabKind::Thread { thread_id } => catalog.thread_name(&tab.workspace_id, thread_id),
                TabKind::Workspace => catalog.workspace_name(&tab.workspace_id),
                TabKind::Home => None,
            };
            if let Some(name) = fresh.filter(|name| !name.is_empty() && *name != tab.title) {
                tab.title = name.to_string();
                changed = true;
            }
        }

        let active_before = self.active_tab_id.clone();
        self.normalize_active();
        changed || active_before != self.active_tab_id
    }

    /// The most recently activated tab, optionally skipping one id.
    pub fn most_recent_tab(&self, excluding: Option<&str>) -> Option<&Tab> {
        self.tabs
            .iter()
            .filter(|tab| Some(tab.id.as_str()) != excluding)
            .max_by_key(|tab| tab.last_active_at)
    }

    fn normalize_active(&mut self) {
        let valid = self
            .active_tab_id
            .as_deref()
            .is_some_and(|id| self.tabs.iter().any(|tab| tab.id == id));
        if !valid {
            self.active_tab_id = self.tabs.first().map(|tab| tab.id.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ThreadSummary, WorkspaceInfo};
    use crate::tab::model::HOME_TAB_ID;
    use std::collections::HashMap;

    fn ids(registry: &TabRegistry) -> Vec<&str> {
        registry.tabs().iter().map(|tab| tab.id.as_str()).collect()
    }

    fn workspace(id: &str, name: &str) -> WorkspaceInfo {
        WorkspaceInfo {
            id: id.to_string(),
            name: name.to_string(),
            path: format!("/src/{}", id),
            connected: true,
        }
    }

    fn catalog() -> WorkspaceCatalog {
        let mut threads = HashMap::new();
        threads.insert(
            "w1".to_string(),
            vec![
                ThreadSummary {
                    id: "t1".to_string(),
                    name: "Renamed thread".to_string(),
                },
                ThreadSummary {
                    id: "t2".to_string(),
                    name: "Second".to_string(),
                },
            ],
        );
        WorkspaceCatalog::new(vec![workspace("w1", "Repo One")], threads)
    }

    #[test]
    fn test_repeated_open_does_not_duplicate() {
        let mut registry = TabRegistry::new();
        registry.open_thread_tab("w1", "t1", "First", 1);
        registry.open_thread_tab("w1", "t2", "Other", 2);
        registry.open_thread_tab("w1", "t1", "First (renamed)", 3);

        assert_eq!(ids(&registry), vec!["w1:t1", "w1:t2"]);
        let tab = registry.get("w1:t1").unwrap();
        assert_eq!(tab.title, "First (renamed)");
        assert_eq!(tab.last_active_at, 3);
        assert_eq!(registry.active_tab_id(), Some("w1:t1"));
    }

    #[test]
    fn test_open_variants_upsert_by_derived_id() {
        let mut registry = TabRegistry::new();
        registry.open_workspace_tab("w1", "Repo", 1);
        registry.open_home_tab("Home", 2);
        registry.open_workspace_tab("w1", "Repo renamed", 3);
        registry.open_home_tab("Start", 4);

        assert_eq!(ids(&registry), vec!["w1:workspace-home", HOME_TAB_ID]);
        assert_eq!(registry.get(HOME_TAB_ID).unwrap().title, "Start");
        assert!(registry.get(HOME_TAB_ID).unwrap().loaded);
        assert!(!registry.get("w1:workspace-home").unwrap().loaded);
    }

    #[test]
    fn test_close_active_prefers_left_neighbour() {
        let mut registry = TabRegistry::new();
        registry.open_thread_tab("w1", "t1", "A", 1);
        registry.open_thread_tab("w1", "t2", "B", 2);
        registry.open_home_tab("C", 3);
        registry.set_active_tab(Some("w1:t2"), 4);

        assert!(registry.close_tab("w1:t2"));
        assert_eq!(ids(&registry), vec!["w1:t1", HOME_TAB_ID]);
        assert_eq!(registry.active_tab_id(), Some("w1:t1"));
    }

    #[test]
    fn test_close_first_active_falls_back_to_new_first() {
        let mut registry = TabRegistry::new();
        registry.open_thread_tab("w1", "t1", "A", 1);
        registry.open_thread_tab("w1", "t2", "B", 2);
        registry.set_active_tab(Some("w1:t1"), 3);

        registry.close_tab("w1:t1");
        assert_eq!(registry.active_tab_id(), Some("w1:t2"));

        registry.close_tab("w1:t2");
        assert!(registry.is_empty());
        assert_eq!(registry.active_tab_id(), None);
    }

    #[test]
    fn test_close_inactive_keeps_selection() {
        let mut registry = TabRegistry::new();
        registry.open_thread_tab("w1", "t1", "A", 1);
        registry.open_thread_tab("w1", "t2", "B", 2);

        assert!(registry.close_tab("w1:t1"));
        assert_eq!(registry.active_tab_id(), Some("w1:t2"));
        assert!(!registry.close_tab("missing"));
    }

    #[test]
    fn test_close_neighbor_rule_holds_for_every_index() {
        for n in 2..6usize {
            for i in 0..n {
                let mut registry = TabRegistry::new();
                for k in 0..n {
                    registry.open_thread_tab("w1", &format!("t{}", k), "x", k as i64);
                }
                let target = format!("w1:t{}", i);
                registry.set_active_tab(Some(&target), 100);
                registry.close_tab(&target);
                let expected = registry.tabs()[i.saturating_sub(1)].id.clone();
                assert_eq!(registry.active_tab_id(), Some(expected.as_str()));
            }
        }
    }

    #[test]
    fn test_set_active_stamps_and_clears() {
        let mut registry = TabRegistry::new();
        registry.open_thread_tab("w1", "t1", "A", 1);
        registry.open_thread_tab("w1", "t2", "B", 2);

        registry.set_active_tab(Some("w1:t1"), 50);
        assert_eq!(registry.get("w1:t1").unwrap().last_active_at, 50);
        assert_eq!(registry.active_tab_id(), Some("w1:t1"));

        // Unknown ids fall back to the first tab
        registry.set_active_tab(Some("nope"), 60);
        assert_eq!(registry.active_tab_id(), Some("w1:t1"));
    }

    #[test]
    fn test_clearing_selection_on_empty_registry() {
        let mut registry = TabRegistry::new();
        registry.set_active_tab(None, 1);
        assert_eq!(registry.active_tab_id(), None);
    }

    #[test]
    fn test_mark_loaded_is_one_way() {
        let mut registry = TabRegistry::new();
        registry.open_thread_tab("w1", "t1", "A", 1);
        assert!(registry.mark_tab_loaded("w1:t1"));
        assert!(!registry.mark_tab_loaded("w1:t1"));
        assert!(registry.get("w1:t1").unwrap().loaded);

        // Re-opening does not reset the flag
        registry.open_thread_tab("w1", "t1", "A", 2);
        assert!(registry.get("w1:t1").unwrap().loaded);
    }

    #[test]
    fn test_reorder_moves_into_target_slot() {
        let mut registry = TabRegistry::new();
        registry.open_thread_tab("w1", "a", "A", 1);
        registry.open_thread_tab("w1", "b", "B", 2);
        registry.open_thread_tab("w1", "c", "C", 3);

        assert!(registry.reorder_tabs("w1:c", "w1:a"));
        assert_eq!(ids(&registry), vec!["w1:c", "w1:a", "w1:b"]);

        assert!(registry.reorder_tabs("w1:c", "w1:b"));
        assert_eq!(ids(&registry), vec!["w1:a", "w1:b", "w1:c"]);

        assert!(!registry.reorder_tabs("w1:a", "w1:a"));
        assert!(!registry.reorder_tabs("w1:a", "missing"));
        assert_eq!(ids(&registry), vec!["w1:a", "w1:b", "w1:c"]);
    }

    #[test]
    fn test_reconcile_prunes_and_retitles() {
        let mut registry = TabRegistry::new();
        registry.open_thread_tab("w1", "t1", "Old title", 1);
        registry.open_thread_tab("gone", "t9", "Orphan", 2);
        registry.open_workspace_tab("w1", "repo", 3);
        registry.open_home_tab("Home", 4);
        registry.set_active_tab(Some("gone:t9"), 5);

        assert!(registry.reconcile(&catalog()));
        assert_eq!(
            ids(&registry),
            vec!["w1:t1", "w1:workspace-home", HOME_TAB_ID]
        );
        assert_eq!(registry.get("w1:t1").unwrap().title, "Renamed thread");
        assert_eq!(registry.get("w1:workspace-home").unwrap().title, "Repo One");
        assert_eq!(registry.active_tab_id(), Some("w1:t1"));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut registry = TabRegistry::new();
        registry.open_thread_tab("w1", "t1", "Old", 1);
        registry.open_thread_tab("w2", "t1", "Other", 2);
        registry.open_thread_tab("w1", "t3", "Unknown thread keeps title", 3);

        registry.reconcile(&catalog());
        let once = registry.clone();
        assert!(!registry.reconcile(&catalog()));
        assert_eq!(registry, once);
    }

    #[test]
    fn test_from_parts_dedupes_and_normalizes() {
        let tabs = vec![
            Tab::thread("w1", "t1", "A", 1),
            Tab::thread("w1", "t1", "A again", 2),
            Tab::home("Home", 3),
        ];
        let registry = TabRegistry::from_parts(tabs, Some("stale".to_string()));
        assert_eq!(ids(&registry), vec!["w1:t1", HOME_TAB_ID]);
        assert_eq!(registry.get("w1:t1").unwrap().title, "A");
        assert_eq!(registry.active_tab_id(), Some("w1:t1"));
    }

    #[test]
    fn test_most_recent_tab_excluding() {
        let mut registry = TabRegistry::new();
        registry.open_thread_tab("w1", "t1", "A", 10);
        registry.open_thread_tab("w1", "t2", "B", 20);
        registry.open_thread_tab("w1", "t3", "C", 5);

        assert_eq!(registry.most_recent_tab(None).unwrap().id, "w1:t2");
        assert_eq!(
            registry.most_recent_tab(Some("w1:t2")).unwrap().id,
            "w1:t1"
        );
    }
}
