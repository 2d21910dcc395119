//! Tab domain models.

use serde::{Deserialize, Serialize};

/// Fixed id of the home tab.
pub const HOME_TAB_ID: &str = "home";

/// Sentinel workspace id carried by the home tab.
///
/// Reconciliation never prunes tabs owned by this id.
pub const HOME_WORKSPACE_ID: &str = "__home__";

/// Suffix used to derive a workspace tab id from its workspace id.
pub const WORKSPACE_HOME_SUFFIX: &str = "workspace-home";

/// Builds the composite id of a thread tab.
pub fn thread_tab_id(workspace_id: &str, thread_id: &str) -> String {
    format!("{}:{}", workspace_id, thread_id)
}

/// Builds the derived id of a workspace tab.
pub fn workspace_tab_id(workspace_id: &str) -> String {
    format!("{}:{}", workspace_id, WORKSPACE_HOME_SUFFIX)
}

/// Wire tag for a tab kind.
///
/// Used wherever a tab is flattened into JSON (local storage, detached
/// window payloads). Unknown tags fail to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TabKindTag {
    Thread,
    Workspace,
    Home,
}

impl TabKindTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TabKindTag::Thread => "thread",
            TabKindTag::Workspace => "workspace",
            TabKindTag::Home => "home",
        }
    }
}

impl std::str::FromStr for TabKindTag {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "thread" => Ok(TabKindTag::Thread),
            "workspace" => Ok(TabKindTag::Workspace),
            "home" => Ok(TabKindTag::Home),
            other => Err(format!("unknown tab kind: {}", other)),
        }
    }
}

/// What a tab shows.
///
/// Only thread tabs carry a thread id; the kind is never inferred from
/// which fields happen to be present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TabKind {
    Thread { thread_id: String },
    Workspace,
    Home,
}

impl TabKind {
    pub fn tag(&self) -> TabKindTag {
        match self {
            TabKind::Thread { .. } => TabKindTag::Thread,
            TabKind::Workspace => TabKindTag::Workspace,
            TabKind::Home => TabKindTag::Home,
        }
    }

    pub fn thread_id(&self) -> Option<&str> {
        match self {
            TabKind::Thread { thread_id } => Some(thread_id.as_str()),
            _ => None,
        }
    }
}

/// One open pane in the session UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    /// Composite key, see [`thread_tab_id`] and [`workspace_tab_id`].
    pub id: String,
    pub kind: TabKind,
    /// Owning workspace, or [`HOME_WORKSPACE_ID`] for the home tab.
    pub workspace_id: String,
    pub title: String,
    /// Epoch milliseconds of the last activation.
    pub last_active_at: i64,
    /// True once first-load side effects have run for this tab.
    pub loaded: bool,
}

impl Tab {
    pub fn thread(
        workspace_id: impl Into<String>,
        thread_id: impl Into<String>,
        title: impl Into<String>,
        now: i64,
    ) -> Self {
        let workspace_id = workspace_id.into();
        let thread_id = thread_id.into();
        Self {
            id: thread_tab_id(&workspace_id, &thread_id),
            kind: TabKind::Thread { thread_id },
            workspace_id,
            title: title.into(),
            last_active_at: now,
            loaded: false,
        }
    }

    pub fn workspace(workspace_id: impl Into<String>, title: impl Into<String>, now: i64) -> Self {
        let workspace_id = workspace_id.into();
        Self {
            id: workspace_tab_id(&workspace_id),
            kind: TabKind::Workspace,
            workspace_id,
            title: title.into(),
            last_active_at: now,
            loaded: false,
        }
    }

    /// Home has no async warm-up, so it starts loaded.
    pub fn home(title: impl Into<String>, now: i64) -> Self {
        Self {
            id: HOME_TAB_ID.to_string(),
            kind: TabKind::Home,
            workspace_id: HOME_WORKSPACE_ID.to_string(),
            title: title.into(),
            last_active_at: now,
            loaded: true,
        }
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.kind.thread_id()
    }

    pub fn is_home(&self) -> bool {
        matches!(self.kind, TabKind::Home)
    }

    pub fn is_thread(&self) -> bool {
        matches!(self.kind, TabKind::Thread { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_tab_id_is_composite() {
        let tab = Tab::thread("ws-1", "th-1", "Fix build", 10);
        assert_eq!(tab.id, "ws-1:th-1");
        assert_eq!(tab.thread_id(), Some("th-1"));
        assert!(!tab.loaded);
    }

    #[test]
    fn test_workspace_and_home_ids() {
        assert_eq!(Tab::workspace("ws-1", "Repo", 0).id, "ws-1:workspace-home");
        let home = Tab::home("Home", 0);
        assert_eq!(home.id, HOME_TAB_ID);
        assert_eq!(home.workspace_id, HOME_WORKSPACE_ID);
        assert!(home.loaded);
    }

    #[test]
    fn test_kind_tag_parsing() {
        assert_eq!("thread".parse::<TabKindTag>(), Ok(TabKindTag::Thread));
        assert!("debug-log".parse::<TabKindTag>().is_err());
        assert_eq!(TabKind::Workspace.tag().as_str(), "workspace");
    }
}
