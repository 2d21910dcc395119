//! Relay bridge domain module.
//!
//! # Module Structure
//!
//! - `model`: wire events/commands, `SessionRoute`, `SessionMode`
//! - `command`: control command parser (`ControlCommand`)
//! - `reply`: reply texts sent back through the relay
//! - `service`: collaborator traits consumed by the router

mod command;
mod model;
pub mod reply;
mod service;

pub use command::ControlCommand;
pub use model::{
    BridgeCommand, BridgeEvent, MessageOptions, RelayCandidate, RemoteMessage, SessionMode,
    SessionRoute,
};
pub use service::{BridgeTransport, TabContext, ThreadMessenger, WorkspaceService};
