//! Tab domain module.
//!
//! # Module Structure
//!
//! - `model`: `Tab`, `TabKind` and id helpers
//! - `record`: persisted JSON shape with per-entry validation
//! - `registry`: ordered tab list with active selection (`TabRegistry`)
//! - `repository`: persistence trait (`TabStateRepository`)

mod model;
mod record;
mod registry;
mod repository;

pub use model::{
    HOME_TAB_ID, HOME_WORKSPACE_ID, Tab, TabKind, TabKindTag, WORKSPACE_HOME_SUFFIX,
    thread_tab_id, workspace_tab_id,
};
pub use record::{TabRecord, decode_stored_tabs, encode_tabs};
pub use registry::TabRegistry;
pub use repository::{PersistedTabs, TabStateRepository};
