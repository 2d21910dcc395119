//! Domain layer for the OpenVibe session core.
//!
//! Pure models and traits: the tab registry, relay bridge routing models,
//! the detached tab codec, and the seams to storage, windows and the agent
//! backend. No I/O lives here.

pub mod bridge;
pub mod catalog;
pub mod config;
pub mod detached;
pub mod error;
pub mod storage;
pub mod tab;
pub mod window;

pub use error::{OpenVibeError, Result};
