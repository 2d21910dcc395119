use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result};
use openvibe_core::tab::{TabKind, TabStateRepository};
use openvibe_infrastructure::{
    ConfigService, FileLocalStorage, LocalStorageTabRepository, OpenVibePaths,
};

fn repository(paths: &OpenVibePaths) -> Result<LocalStorageTabRepository> {
    let config = ConfigService::new(paths)
        .context("Failed to resolve config path")?
        .get_config();
    let storage_path = paths
        .local_storage_file()
        .context("Failed to resolve local storage path")?;
    Ok(LocalStorageTabRepository::new(
        Arc::new(FileLocalStorage::new(storage_path)),
        &config.storage,
    ))
}

pub async fn list(paths: &OpenVibePaths) -> Result<String> {
    let state = repository(paths)?.load().await;
    if state.tabs.is_empty() {
        return Ok("No persisted tabs.".to_string());
    }

    let mut out = String::new();
    for tab in &state.tabs {
        let marker = if state.active_tab_id.as_deref() == Some(tab.id.as_str()) {
            "*"
        } else {
            " "
        };
        let detail = match &tab.kind {
            TabKind::Thread { thread_id } => format!("thread {}", thread_id),
            TabKind::Workspace => "workspace".to_string(),
            TabKind::Home => "home".to_string(),
        };
        writeln!(out, "{} {}  [{}]  {}", marker, tab.id, detail, tab.title)?;
    }
    write!(
        out,
        "Active: {}",
        state.active_tab_id.as_deref().unwrap_or("(none)")
    )?;
    Ok(out)
}

pub async fn clear(paths: &OpenVibePaths) -> Result<String> {
    repository(paths)?
        .clear()
        .await
        .context("Failed to clear persisted tabs")?;
    tracing::info!("[Tabs] Cleared persisted tab state");
    Ok("Cleared persisted tabs.".to_string())
}
