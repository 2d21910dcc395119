//! Persisted tab records.
//!
//! Stored tab lists come from an older process, possibly an older version of
//! the app, so they are validated one entry at a time. A corrupt entry is
//! dropped without taking the rest of the tab bar down with it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model::{HOME_TAB_ID, HOME_WORKSPACE_ID, Tab, TabKind, TabKindTag};

/// Flattened, camelCase shape of a tab in local storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    pub id: String,
    pub kind: TabKindTag,
    pub workspace_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded: Option<bool>,
}

impl From<&Tab> for TabRecord {
    fn from(tab: &Tab) -> Self {
        Self {
            id: tab.id.clone(),
            kind: tab.kind.tag(),
            workspace_id: tab.workspace_id.clone(),
            thread_id: tab.thread_id().map(str::to_string),
            title: tab.title.clone(),
            last_active_at: Some(tab.last_active_at),
            loaded: Some(tab.loaded),
        }
    }
}

impl TabRecord {
    /// Validates the record and converts it into a domain tab.
    ///
    /// `now` fills in a missing `lastActiveAt`.
    pub fn into_tab(self, now: i64) -> Option<Tab> {
        let id = non_empty(self.id)?;
        let workspace_id = non_empty(self.workspace_id)?;
        let title = non_empty(self.title)?;
        let kind = match self.kind {
            TabKindTag::Thread => TabKind::Thread {
                thread_id: non_empty(self.thread_id?)?,
            },
            TabKindTag::Workspace => TabKind::Workspace,
            TabKindTag::Home => {
                if id != HOME_TAB_ID || workspace_id != HOME_WORKSPACE_ID {
                    return None;
                }
                TabKind::Home
            }
        };
        let loaded = self
            .loaded
            .unwrap_or(matches!(kind, TabKind::Home));
        Some(Tab {
            id,
            kind,
            workspace_id,
            title,
            last_active_at: self.last_active_at.unwrap_or(now),
            loaded,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Decodes a stored tab list.
///
/// Missing input, invalid JSON, or a non-array root all yield an empty list.
/// Array entries that fail validation are skipped individually.
pub fn decode_stored_tabs(raw: Option<&str>, now: i64) -> Vec<Tab> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("[TabRecord] Discarding unparsable tab list: {}", e);
            return Vec::new();
        }
    };
    let Value::Array(entries) = parsed else {
        tracing::warn!("[TabRecord] Discarding tab list with non-array root");
        return Vec::new();
    };

    let total = entries.len();
    let tabs: Vec<Tab> = entries
        .into_iter()
        .filter_map(|entry| {
            serde_json::from_value::<TabRecord>(entry)
                .ok()
                .and_then(|record| record.into_tab(now))
        })
        .collect();

    if tabs.len() < total {
        tracing::debug!(
            "[TabRecord] Dropped {} malformed tab entries",
            total - tabs.len()
        );
    }
    tabs
}

/// Encodes a tab list for storage.
pub fn encode_tabs(tabs: &[Tab]) -> serde_json::Result<String> {
    let records: Vec<TabRecord> = tabs.iter().map(TabRecord::from).collect();
    serde_json::to_string(&records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_entry_is_dropped_individually() {
        let raw = r#"[{"id":"w1:t1","kind":"thread","workspaceId":"w1","threadId":"t1","title":"Foo"}, {"id":"bad"}]"#;
        let tabs = decode_stored_tabs(Some(raw), 42);
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0].id, "w1:t1");
        assert_eq!(tabs[0].thread_id(), Some("t1"));
        assert_eq!(tabs[0].last_active_at, 42);
        assert!(!tabs[0].loaded);
    }

    #[test]
    fn test_garbage_yields_empty() {
        assert!(decode_stored_tabs(None, 0).is_empty());
        assert!(decode_stored_tabs(Some("not json"), 0).is_empty());
        assert!(decode_stored_tabs(Some(r#"{"id":"x"}"#), 0).is_empty());
    }

    #[test]
    fn test_thread_record_without_thread_id_is_rejected() {
        let raw = r#"[{"id":"w1:t1","kind":"thread","workspaceId":"w1","title":"Foo"}]"#;
        assert!(decode_stored_tabs(Some(raw), 0).is_empty());
    }

    #[test]
    fn test_unknown_kind_and_wrong_types_are_rejected() {
        let raw = r#"[
            {"id":"a","kind":"debug-log","workspaceId":"w1","title":"Log"},
            {"id":7,"kind":"workspace","workspaceId":"w1","title":"Repo"},
            {"id":"w1:workspace-home","kind":"workspace","workspaceId":"w1","title":"Repo","loaded":true}
        ]"#;
        let tabs = decode_stored_tabs(Some(raw), 0);
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0].kind, TabKind::Workspace);
        assert!(tabs[0].loaded);
    }

    #[test]
    fn test_home_record_defaults_to_loaded() {
        let raw = r#"[{"id":"home","kind":"home","workspaceId":"__home__","title":"Home"}]"#;
        let tabs = decode_stored_tabs(Some(raw), 0);
        assert_eq!(tabs.len(), 1);
        assert!(tabs[0].loaded);
    }

    #[test]
    fn test_encoded_tabs_restore() {
        let tabs = vec![
            Tab::thread("w1", "t1", "Foo", 5),
            Tab::workspace("w1", "Repo", 6),
            Tab::home("Home", 7),
        ];
        let raw = encode_tabs(&tabs).unwrap();
        assert!(raw.contains(r#""workspaceId":"w1""#));
        assert_eq!(decode_stored_tabs(Some(&raw), 0), tabs);
    }
}
