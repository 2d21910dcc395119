//! Detached tab payload codec.
//!
//! A tab can be reopened in its own window. The window URL carries a compact
//! JSON description of the tab in the [`DETACHED_TAB_QUERY_KEY`] query
//! parameter; the detached window decodes it on startup.
//!
//! Decoding is total: anything malformed yields `None` so the window falls
//! back to the normal layout.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::tab::{Tab, TabKindTag};

/// Query parameter holding the JSON payload.
pub const DETACHED_TAB_QUERY_KEY: &str = "detachedTab";

/// Tab descriptor carried in a detached window URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetachedTabPayload {
    pub id: String,
    pub kind: TabKindTag,
    pub workspace_id: String,
    pub title: String,
    /// Present only for thread tabs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl DetachedTabPayload {
    pub fn from_tab(tab: &Tab) -> Self {
        Self {
            id: tab.id.clone(),
            kind: tab.kind.tag(),
            workspace_id: tab.workspace_id.clone(),
            title: tab.title.clone(),
            thread_id: tab.thread_id().map(str::to_string),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Returns `current_url` with the payload set as the query parameter,
    /// replacing any previous value. Other parameters are preserved.
    pub fn to_url(&self, current_url: &Url) -> serde_json::Result<Url> {
        let encoded = self.to_json()?;
        let retained: Vec<(String, String)> = current_url
            .query_pairs()
            .filter(|(key, _)| key != DETACHED_TAB_QUERY_KEY)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let mut url = current_url.clone();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(retained)
            .append_pair(DETACHED_TAB_QUERY_KEY, &encoded);
        Ok(url)
    }

    pub fn from_url(url: &Url) -> Option<Self> {
        let raw = url
            .query_pairs()
            .find(|(key, _)| key == DETACHED_TAB_QUERY_KEY)
            .map(|(_, value)| value.into_owned())?;
        Self::from_json(&raw)
    }

    /// Decodes a raw query string, with or without the leading `?`.
    pub fn from_search(search: &str) -> Option<Self> {
        let search = search.strip_prefix('?').unwrap_or(search);
        let raw = url::form_urlencoded::parse(search.as_bytes())
            .find(|(key, _)| key == DETACHED_TAB_QUERY_KEY)
            .map(|(_, value)| value.into_owned())?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw).ok()?;
        let object = value.as_object()?;

        let field = |name: &str| -> Option<String> {
            object
                .get(name)
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let id = field("id")?;
        let kind = field("kind")?.parse::<TabKindTag>().ok()?;
        let workspace_id = field("workspaceId")?;
        let title = field("title")?;
        let thread_id = match kind {
            TabKindTag::Thread => Some(field("threadId")?),
            TabKindTag::Workspace | TabKindTag::Home => None,
        };

        Some(Self {
            id,
            kind,
            workspace_id,
            title,
            thread_id,
        })
    }

    /// Window label for a detached window opened at `now_ms`.
    pub fn window_label(&self, now_ms: i64) -> String {
        sanitize_window_label(&format!("detached-tab-{}-{}", self.id, now_ms))
    }
}

/// Replaces every character outside `[A-Za-z0-9_:/-]` with `_`.
pub fn sanitize_window_label(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '/' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
