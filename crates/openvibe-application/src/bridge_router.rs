//! Bridge event router.
//!
//! Turns relay bridge events into thread messages. Each external chat
//! session (`sessionKey`) is routed to one workspace thread; the first
//! message of an unknown session provisions a fresh thread for it.
//!
//! # Routing order
//!
//! 1. Control commands (`/menu`, `/mode`, `/relay`) are answered in-channel.
//! 2. Sessions in agent mode get a fixed notice.
//! 3. The route comes from the event itself, then the cache, then
//!    auto-provisioning. A cached route whose workspace is gone is dropped
//!    and provisioned again.
//! 4. The text is delivered to the thread verbatim.
//!
//! Messages of one session are handled one at a time, in arrival order.
//! Different sessions interleave freely.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use openvibe_core::bridge::{
    BridgeCommand, BridgeEvent, BridgeTransport, ControlCommand, MessageOptions, RelayCandidate,
    RemoteMessage, SessionMode, SessionRoute, TabContext, ThreadMessenger, WorkspaceService,
    reply,
};
use openvibe_core::catalog::WorkspaceInfo;
use openvibe_core::config::BridgeConfig;
use openvibe_core::error::{OpenVibeError, Result};
use tokio::sync::Mutex;

/// What the router did with one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Not a routable event, empty content, or routing disabled.
    Ignored,
    /// Answered through the relay without touching a thread.
    Replied,
    /// Delivered to a thread.
    Delivered {
        workspace_id: String,
        thread_id: String,
    },
    /// Routing or delivery failed; the message was dropped.
    Dropped,
}

#[derive(Default)]
struct RouterState {
    routes: HashMap<String, SessionRoute>,
    modes: HashMap<String, SessionMode>,
    /// Sessions whose route the bridge process currently knows about.
    bound: HashSet<String>,
    relay_snapshots: HashMap<String, Vec<RelayCandidate>>,
    /// Per-session turn locks. tokio's mutex is FIFO, so waiters run in the
    /// order their messages arrived.
    turns: HashMap<String, Arc<Mutex<()>>>,
}

pub struct BridgeEventRouter {
    enabled: bool,
    default_mode: SessionMode,
    workspaces: Arc<dyn WorkspaceService>,
    messenger: Arc<dyn ThreadMessenger>,
    transport: Arc<dyn BridgeTransport>,
    tabs: Arc<dyn TabContext>,
    state: Mutex<RouterState>,
}

impl BridgeEventRouter {
    pub fn new(
        config: &BridgeConfig,
        workspaces: Arc<dyn WorkspaceService>,
        messenger: Arc<dyn ThreadMessenger>,
        transport: Arc<dyn BridgeTransport>,
        tabs: Arc<dyn TabContext>,
    ) -> Self {
        Self {
            enabled: config.enabled,
            default_mode: config.default_mode,
            workspaces,
            messenger,
            transport,
            tabs,
            state: Mutex::new(RouterState::default()),
        }
    }

    pub async fn session_mode(&self, session_key: &str) -> SessionMode {
        let state = self.state.lock().await;
        state
            .modes
            .get(session_key)
            .copied()
            .unwrap_or(self.default_mode)
    }

    pub async fn route_for(&self, session_key: &str) -> Option<SessionRoute> {
        self.state.lock().await.routes.get(session_key).cloned()
    }

    pub async fn handle_event(&self, event: BridgeEvent) -> RouteOutcome {
        if !self.enabled {
            return RouteOutcome::Ignored;
        }
        match event {
            BridgeEvent::RemoteMessage(message) => self.handle_remote_message(message).await,
            BridgeEvent::Status { running, error } => {
                if running {
                    tracing::debug!("[BridgeRouter] Bridge running");
                } else {
                    self.mark_all_unbound(error.as_deref()).await;
                }
                RouteOutcome::Ignored
            }
            BridgeEvent::MessageSync { .. }
            | BridgeEvent::AgentTrace { .. }
            | BridgeEvent::Stderr { .. } => RouteOutcome::Ignored,
        }
    }

    /// The bridge process restarted: it has forgotten every binding.
    async fn mark_all_unbound(&self, error: Option<&str>) {
        let mut state = self.state.lock().await;
        tracing::info!(
            "[BridgeRouter] Bridge stopped ({}); {} sessions will re-bind",
            error.unwrap_or("no error"),
            state.bound.len()
        );
        state.bound.clear();
        state.relay_snapshots.clear();
    }

    async fn session_turn(&self, session_key: &str) -> Arc<Mutex<()>> {
        self.state
            .lock()
            .await
            .turns
            .entry(session_key.to_string())
            .or_default()
            .clone()
    }

    async fn handle_remote_message(&self, mut message: RemoteMessage) -> RouteOutcome {
        let content = message.content.trim().to_string();
        if content.is_empty() {
            return RouteOutcome::Ignored;
        }
        message.content = content;

        let turn = self.session_turn(&message.session_key).await;
        let _turn = turn.lock().await;

        if let Some(command) = ControlCommand::parse(&message.content) {
            return match self.handle_control(&message, command).await {
                Ok(()) => RouteOutcome::Replied,
                Err(e) => {
                    tracing::warn!(
                        "[BridgeRouter] Control command failed for {}: {}",
                        message.session_key,
                        e
                    );
                    RouteOutcome::Dropped
                }
            };
        }

        if self.session_mode(&message.session_key).await == SessionMode::Agent {
            return match self.reply(&message, reply::AGENT_MODE_PENDING).await {
                Ok(()) => RouteOutcome::Replied,
                Err(e) => {
                    tracing::warn!("[BridgeRouter] Agent notice failed: {}", e);
                    RouteOutcome::Dropped
                }
            };
        }

        match self.route_and_deliver(&message).await {
            Ok(route) => RouteOutcome::Delivered {
                workspace_id: route.workspace_id,
                thread_id: route.thread_id,
            },
            Err(e) => {
                tracing::warn!(
                    "[BridgeRouter] Dropping message from {}: {}",
                    message.session_key,
                    e
                );
                RouteOutcome::Dropped
            }
        }
    }

    async fn route_and_deliver(&self, message: &RemoteMessage) -> Result<SessionRoute> {
        let (route, workspace) = self.ensure_route(message).await?;
        self.messenger
            .send_user_message_to_thread(
                &workspace,
                &route.thread_id,
                &message.content,
                &[],
                MessageOptions::relayed(),
            )
            .await?;
        tracing::debug!(
            "[BridgeRouter] Delivered {} -> {}:{}",
            message.session_key,
            route.workspace_id,
            route.thread_id
        );
        Ok(route)
    }

    // ============================================================================
    // Control commands
    // ============================================================================

    async fn handle_control(&self, message: &RemoteMessage, command: ControlCommand) -> Result<()> {
        match command {
            ControlCommand::Menu => {
                let mode = self.session_mode(&message.session_key).await;
                self.reply(message, reply::menu(mode)).await
            }
            ControlCommand::SetMode(mode) => {
                self.state
                    .lock()
                    .await
                    .modes
                    .insert(message.session_key.clone(), mode);
                self.sync_mode(&message.session_key, mode).await?;
                self.reply(message, reply::mode_switched(mode)).await
            }
            ControlCommand::RelayList => {
                let candidates = self.tabs.relay_candidates().await;
                if candidates.is_empty() {
                    return self.reply(message, reply::NO_RELAY_SESSIONS).await;
                }
                let text = reply::relay_list(&candidates);
                self.state
                    .lock()
                    .await
                    .relay_snapshots
                    .insert(message.session_key.clone(), candidates);
                self.reply(message, text).await
            }
            ControlCommand::RelayPick(index) => self.pick_relay(message, index).await,
        }
    }

    async fn pick_relay(&self, message: &RemoteMessage, index: usize) -> Result<()> {
        let live = self.tabs.relay_candidates().await;
        if live.is_empty() {
            return self.reply(message, reply::NO_RELAY_SESSIONS).await;
        }

        let selected = {
            let state = self.state.lock().await;
            let available = state
                .relay_snapshots
                .get(&message.session_key)
                .unwrap_or(&live);
            index
                .checked_sub(1)
                .and_then(|slot| available.get(slot))
                .cloned()
        };
        let Some(selected) = selected else {
            return self.reply(message, reply::invalid_relay_index(index)).await;
        };

        let route = message.route_to(&selected.workspace_id, &selected.thread_id);
        self.transport
            .send_bridge_command(route.bind_command())
            .await?;
        {
            let mut state = self.state.lock().await;
            state
                .modes
                .insert(route.session_key.clone(), SessionMode::Bridge);
            state.remember(&route);
        }
        tracing::info!(
            "[BridgeRouter] {} bound to {}:{}",
            route.session_key,
            route.workspace_id,
            route.thread_id
        );
        self.sync_mode(&route.session_key, SessionMode::Bridge).await?;
        self.reply(message, reply::relay_bound(&selected.title)).await
    }

    async fn sync_mode(&self, session_key: &str, mode: SessionMode) -> Result<()> {
        self.transport
            .send_bridge_command(BridgeCommand::SetSessionMode {
                session_key: session_key.to_string(),
                mode,
            })
            .await
    }

    async fn reply(&self, message: &RemoteMessage, content: impl Into<String>) -> Result<()> {
        self.transport
            .send_bridge_command(message.reply(content))
            .await
    }

    // ============================================================================
    // Route resolution
    // ============================================================================

    async fn ensure_route(&self, message: &RemoteMessage) -> Result<(SessionRoute, WorkspaceInfo)> {
        let workspaces = self.workspaces.list_workspaces().await?;
        let session_key = &message.session_key;

        if let Some((workspace_id, thread_id)) = message.explicit_target() {
            let workspace = workspaces
                .into_iter()
                .find(|ws| ws.id == workspace_id)
                .ok_or_else(|| OpenVibeError::not_found("workspace", workspace_id))?;
            let route = message.route_to(workspace_id, thread_id);
            self.state.lock().await.remember(&route);
            return Ok((route, workspace));
        }

        let cached = {
            let state = self.state.lock().await;
            state
                .routes
                .get(session_key)
                .cloned()
                .map(|route| (route, state.bound.contains(session_key)))
        };
        if let Some((existing, bound)) = cached {
            if let Some(workspace) = workspaces.iter().find(|ws| ws.id == existing.workspace_id) {
                if !bound {
                    self.rebind(&existing).await?;
                }
                return Ok((existing, workspace.clone()));
            }
            tracing::warn!(
                "[BridgeRouter] Workspace {} of {} is gone; provisioning a new route",
                existing.workspace_id,
                session_key
            );
            let mut state = self.state.lock().await;
            state.routes.remove(session_key);
            state.bound.remove(session_key);
        }

        let (route, workspace) = self.create_route(message, workspaces).await?;
        self.state.lock().await.remember(&route);
        Ok((route, workspace))
    }

    /// Starts a thread for an unrouted session in the active workspace (or
    /// the first one) and binds it.
    async fn create_route(
        &self,
        message: &RemoteMessage,
        workspaces: Vec<WorkspaceInfo>,
    ) -> Result<(SessionRoute, WorkspaceInfo)> {
        let active = self.tabs.active_workspace_id().await;
        let mut workspace = active
            .and_then(|id| workspaces.iter().find(|ws| ws.id == id))
            .or_else(|| workspaces.first())
            .cloned()
            .ok_or_else(|| OpenVibeError::bridge("no workspace available for routing"))?;

        if !workspace.connected {
            tracing::info!("[BridgeRouter] Connecting workspace {}", workspace.id);
            self.workspaces.connect_workspace(&workspace.id).await?;
            workspace.connected = true;
        }

        let thread_id = self.workspaces.start_thread(&workspace.id).await?;
        let route = message.route_to(&workspace.id, &thread_id);
        self.transport
            .send_bridge_command(route.bind_command())
            .await?;

        tracing::info!(
            "[BridgeRouter] Provisioned {}:{} for {}",
            route.workspace_id,
            route.thread_id,
            route.session_key
        );
        Ok((route, workspace))
    }

    async fn rebind(&self, route: &SessionRoute) -> Result<()> {
        tracing::debug!("[BridgeRouter] Re-binding {}", route.session_key);
        self.transport
            .send_bridge_command(route.bind_command())
            .await?;
        self.state
            .lock()
            .await
            .bound
            .insert(route.session_key.clone());
        Ok(())
    }
}

impl RouterState {
    fn remember(&mut self, route: &SessionRoute) {
        self.bound.insert(route.session_key.clone());
        self.routes.insert(route.session_key.clone(), route.clone());
    }
}
