//! Reply texts sent back through the relay.

use super::model::{RelayCandidate, SessionMode};

pub const AGENT_MODE_PENDING: &str =
    "Agent mode is not wired up yet. Send /mode bridge to relay messages to a thread.";
pub const NO_RELAY_SESSIONS: &str = "No open thread tabs to relay to.";

fn mode_label(mode: SessionMode) -> &'static str {
    match mode {
        SessionMode::Bridge => "bridge (relay to thread)",
        SessionMode::Agent => "agent",
    }
}

pub fn menu(mode: SessionMode) -> String {
    [
        "OpenVibe bridge menu".to_string(),
        format!("Current mode: {}", mode_label(mode)),
        String::new(),
        "- Relay mode: /mode bridge".to_string(),
        "- Agent mode: /mode agent".to_string(),
        "- List relay targets: /relay".to_string(),
        "- Pick relay target: /relay 1".to_string(),
    ]
    .join("\n")
}

pub fn mode_switched(mode: SessionMode) -> String {
    format!("Switched to {} mode.", mode_label(mode))
}

pub fn relay_list(candidates: &[RelayCandidate]) -> String {
    let list = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| format!("{}. {}", index + 1, candidate.title))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Open threads:\n{}\n\nReply /relay <number> to bind this chat.",
        list
    )
}

pub fn invalid_relay_index(index: usize) -> String {
    format!("Invalid relay index: {}. Send /relay to list targets.", index)
}

pub fn relay_bound(title: &str) -> String {
    format!("Bound to {}.", title)
}
