//! Workspace/thread catalog snapshot.
//!
//! The catalog is owned by the backend; the session core only sees snapshots
//! of it, which feed tab titles and reconciliation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A project workspace known to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub path: String,
    /// Whether the backend session for this workspace is running.
    #[serde(default)]
    pub connected: bool,
}

/// A thread inside a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSummary {
    pub id: String,
    pub name: String,
}

/// Point-in-time view of all workspaces and their threads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceCatalog {
    pub workspaces: Vec<WorkspaceInfo>,
    #[serde(default)]
    pub threads_by_workspace: HashMap<String, Vec<ThreadSummary>>,
}

impl WorkspaceCatalog {
    pub fn new(
        workspaces: Vec<WorkspaceInfo>,
        threads_by_workspace: HashMap<String, Vec<ThreadSummary>>,
    ) -> Self {
        Self {
            workspaces,
            threads_by_workspace,
        }
    }

    pub fn workspace(&self, workspace_id: &str) -> Option<&WorkspaceInfo> {
        self.workspaces
            .iter()
            .find(|workspace| workspace.id == workspace_id)
    }

    pub fn contains_workspace(&self, workspace_id: &str) -> bool {
        self.workspace(workspace_id).is_some()
    }

    pub fn workspace_name(&self, workspace_id: &str) -> Option<&str> {
        self.workspace(workspace_id)
            .map(|workspace| workspace.name.as_str())
    }

    pub fn thread_name(&self, workspace_id: &str, thread_id: &str) -> Option<&str> {
        self.threads_by_workspace
            .get(workspace_id)?
            .iter()
            .find(|thread| thread.id == thread_id)
            .map(|thread| thread.name.as_str())
    }
}
