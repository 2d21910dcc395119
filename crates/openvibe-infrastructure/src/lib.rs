//! Infrastructure layer: filesystem paths, local storage backends, the tab
//! state repository, configuration loading and the in-process window bus.

pub mod config_service;
pub mod paths;
pub mod storage;
pub mod tab_state_repository;
pub mod window_bus;

pub use crate::config_service::ConfigService;
pub use crate::paths::OpenVibePaths;
pub use crate::storage::{FileLocalStorage, MemoryLocalStorage};
pub use crate::tab_state_repository::LocalStorageTabRepository;
pub use crate::window_bus::MemoryWindowBus;
