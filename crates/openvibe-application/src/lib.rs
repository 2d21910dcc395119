//! Application layer: per-window services built on the core domain.
//!
//! - [`SessionController`] owns the tab bar and keeps it persisted.
//! - [`BridgeEventRouter`] routes relay chat sessions into threads.
//! - [`DetachedTabService`] pops tabs out into their own windows.
//!
//! Each service is constructed per window and shared by `Arc`; nothing here
//! is global.

pub mod bridge_router;
pub mod detached_tab_service;
pub mod session_controller;

pub use bridge_router::{BridgeEventRouter, RouteOutcome};
pub use detached_tab_service::DetachedTabService;
pub use session_controller::SessionController;
