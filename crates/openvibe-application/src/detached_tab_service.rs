//! Detached tab windows.
//!
//! A tab can be popped out into its own native window. The window URL carries
//! the tab descriptor; when the detached window closes it notifies the main
//! window, which re-focuses the tab if it is still open there.

use std::sync::Arc;

use openvibe_core::config::DetachedWindowConfig;
use openvibe_core::detached::DetachedTabPayload;
use openvibe_core::error::{OpenVibeError, Result};
use openvibe_core::tab::Tab;
use openvibe_core::window::{
    DETACHED_TAB_CLOSED_EVENT, DetachedTabClosed, WindowBus, WindowEvent, WindowHost,
    WindowRequest,
};
use tokio::sync::broadcast;
use url::Url;

use crate::session_controller::SessionController;

pub struct DetachedTabService {
    host: Arc<dyn WindowHost>,
    bus: Arc<dyn WindowBus>,
    config: DetachedWindowConfig,
}

impl DetachedTabService {
    pub fn new(
        host: Arc<dyn WindowHost>,
        bus: Arc<dyn WindowBus>,
        config: DetachedWindowConfig,
    ) -> Self {
        Self { host, bus, config }
    }

    /// Builds the window request for `tab`, opened at `now_ms`.
    pub fn window_request(&self, tab: &Tab, current_url: &Url, now_ms: i64) -> Result<WindowRequest> {
        let payload = DetachedTabPayload::from_tab(tab);
        let url = payload.to_url(current_url)?;
        Ok(WindowRequest {
            label: payload.window_label(now_ms),
            title: payload.title,
            url: url.to_string(),
            width: self.config.width,
            height: self.config.height,
            min_width: self.config.min_width,
            min_height: self.config.min_height,
            center: true,
        })
    }

    /// Opens `tab` in a new window and returns the window label once the host
    /// reports it created.
    pub async fn open_detached_window(&self, tab: &Tab, current_url: &Url) -> Result<String> {
        let request = self.window_request(tab, current_url, chrono::Utc::now().timestamp_millis())?;
        let label = request.label.clone();
        tracing::info!("[DetachedTabs] Opening {} as {}", tab.id, label);

        self.host.create_window(request).await.map_err(|e| {
            tracing::warn!("[DetachedTabs] Failed to open {}: {}", label, e);
            e
        })?;
        Ok(label)
    }

    /// Detached window side: tells the main window this tab's window closed.
    pub fn notify_main_closed(&self, tab_id: &str) -> Result<()> {
        let payload = serde_json::to_value(DetachedTabClosed {
            tab_id: tab_id.to_string(),
        })?;
        self.bus.emit_to(
            &self.config.main_window_label,
            WindowEvent::new(DETACHED_TAB_CLOSED_EVENT, payload),
        )
    }

    /// Main window side: events addressed to the main window.
    pub fn subscribe_main(&self) -> broadcast::Receiver<WindowEvent> {
        self.bus.subscribe(&self.config.main_window_label)
    }

    /// Main window side: re-focuses the tab named by a closed notification.
    ///
    /// Returns true when a tab was activated. Other events and tabs that are
    /// no longer open are ignored.
    pub async fn handle_detached_closed(
        &self,
        controller: &SessionController,
        event: &WindowEvent,
    ) -> bool {
        if event.name != DETACHED_TAB_CLOSED_EVENT {
            return false;
        }
        let closed: DetachedTabClosed = match serde_json::from_value(event.payload.clone()) {
            Ok(closed) => closed,
            Err(e) => {
                tracing::warn!("[DetachedTabs] Malformed closed event: {}", e);
                return false;
            }
        };
        if !controller.contains_tab(&closed.tab_id).await {
            tracing::debug!("[DetachedTabs] {} is no longer open", closed.tab_id);
            return false;
        }
        controller.set_active_tab(Some(&closed.tab_id)).await;
        true
    }

    /// Pumps closed notifications into `controller` until the bus closes.
    pub async fn run_main_listener(&self, controller: Arc<SessionController>) -> Result<()> {
        let mut receiver = self.subscribe_main();
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.handle_detached_closed(&controller, &event).await;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("[DetachedTabs] Listener lagged by {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(OpenVibeError::window("main window bus closed"));
                }
            }
        }
    }
}
