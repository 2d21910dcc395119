//! Collaborator interfaces consumed by the bridge router.
//!
//! The backend that runs agents is opaque; these traits are the whole of
//! what the session core knows about it.

use async_trait::async_trait;

use crate::catalog::WorkspaceInfo;
use crate::error::Result;

use super::model::{BridgeCommand, MessageOptions, RelayCandidate};

/// Workspace/thread catalog operations.
#[async_trait]
pub trait WorkspaceService: Send + Sync {
    async fn list_workspaces(&self) -> Result<Vec<WorkspaceInfo>>;

    /// Starts the backend session for a workspace.
    async fn connect_workspace(&self, workspace_id: &str) -> Result<()>;

    /// Starts a new thread and returns its id.
    async fn start_thread(&self, workspace_id: &str) -> Result<String>;
}

/// Injects user messages into threads.
#[async_trait]
pub trait ThreadMessenger: Send + Sync {
    async fn send_user_message_to_thread(
        &self,
        workspace: &WorkspaceInfo,
        thread_id: &str,
        text: &str,
        images: &[String],
        options: MessageOptions,
    ) -> Result<()>;
}

/// Outbound side of the relay bridge.
#[async_trait]
pub trait BridgeTransport: Send + Sync {
    async fn send_bridge_command(&self, command: BridgeCommand) -> Result<()>;
}

/// Read-only view of the tab bar used for routing decisions.
#[async_trait]
pub trait TabContext: Send + Sync {
    /// Workspace of the active tab, ignoring the home tab.
    async fn active_workspace_id(&self) -> Option<String>;

    /// Open thread tabs in tab-bar order.
    async fn relay_candidates(&self) -> Vec<RelayCandidate>;
}
