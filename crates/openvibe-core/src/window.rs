//! Native window seams.
//!
//! The session core never talks to a windowing toolkit directly. Window
//! creation goes through [`WindowHost`] and cross-window notifications go
//! through [`WindowBus`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::Result;

/// Label of the primary application window.
pub const MAIN_WINDOW_LABEL: &str = "main";

/// Event emitted to the main window when a detached tab window closes.
pub const DETACHED_TAB_CLOSED_EVENT: &str = "openvibe/detached-tab-closed";

/// A named event delivered to one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowEvent {
    pub name: String,
    pub payload: Value,
}

impl WindowEvent {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// Request to open a new top-level window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRequest {
    pub label: String,
    pub title: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub min_width: u32,
    pub min_height: u32,
    pub center: bool,
}

/// Payload of [`DETACHED_TAB_CLOSED_EVENT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetachedTabClosed {
    pub tab_id: String,
}

/// Creates native windows.
#[async_trait]
pub trait WindowHost: Send + Sync {
    /// Resolves once the host reports the window as created, or fails with
    /// the host's error signal, whichever comes first.
    async fn create_window(&self, request: WindowRequest) -> Result<()>;
}

/// Point-to-point event delivery between windows.
pub trait WindowBus: Send + Sync {
    fn emit_to(&self, window_label: &str, event: WindowEvent) -> Result<()>;

    fn subscribe(&self, window_label: &str) -> broadcast::Receiver<WindowEvent>;
}
