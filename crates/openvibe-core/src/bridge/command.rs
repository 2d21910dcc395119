//! Control commands typed into a relayed chat.
//!
//! Control commands are consumed by the router and never reach a thread.

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::SessionMode;

static RELAY_PICK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/relay\s+(\d+)$").expect("valid regex"));
static RELAY_PICK_ZH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^接力\s*(\d+)$").expect("valid regex"));

/// A recognized control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// `/menu`, `/help`
    Menu,
    /// `/mode bridge`, `/mode agent`
    SetMode(SessionMode),
    /// `/relay`
    RelayList,
    /// `/relay N` (1-based)
    RelayPick(usize),
}

impl ControlCommand {
    /// Parses trimmed chat text. Checks menu, then mode, then relay.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let lower = raw.to_lowercase();

        if lower == "/menu" || lower == "/help" || raw == "菜单" || raw == "帮助" {
            return Some(ControlCommand::Menu);
        }

        if lower == "/mode bridge" || raw == "桥接模式" {
            return Some(ControlCommand::SetMode(SessionMode::Bridge));
        }
        if lower == "/mode agent" || raw == "agent模式" {
            return Some(ControlCommand::SetMode(SessionMode::Agent));
        }

        if lower == "/relay" || raw == "接力" {
            return Some(ControlCommand::RelayList);
        }
        let digits = RELAY_PICK
            .captures(&lower)
            .or_else(|| RELAY_PICK_ZH.captures(raw))
            .and_then(|captures| captures.get(1))?;
        // Absurdly long indices are still a pick, just an invalid one.
        let index = digits.as_str().parse::<usize>().unwrap_or(usize::MAX);
        Some(ControlCommand::RelayPick(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_aliases() {
        assert_eq!(ControlCommand::parse("/menu"), Some(ControlCommand::Menu));
        assert_eq!(ControlCommand::parse(" /HELP "), Some(ControlCommand::Menu));
        assert_eq!(ControlCommand::parse("帮助"), Some(ControlCommand::Menu));
    }

    #[test]
    fn test_mode_switch() {
        assert_eq!(
            ControlCommand::parse("/mode agent"),
            Some(ControlCommand::SetMode(SessionMode::Agent))
        );
        assert_eq!(
            ControlCommand::parse("/Mode Bridge"),
            Some(ControlCommand::SetMode(SessionMode::Bridge))
        );
        assert_eq!(ControlCommand::parse("/mode turbo"), None);
    }

    #[test]
    fn test_relay_list_and_pick() {
        assert_eq!(ControlCommand::parse("/relay"), Some(ControlCommand::RelayList));
        assert_eq!(
            ControlCommand::parse("/relay   2"),
            Some(ControlCommand::RelayPick(2))
        );
        assert_eq!(ControlCommand::parse("接力3"), Some(ControlCommand::RelayPick(3)));
        assert_eq!(
            ControlCommand::parse("/relay 99999999999999999999999"),
            Some(ControlCommand::RelayPick(usize::MAX))
        );
        assert_eq!(ControlCommand::parse("/relay two"), None);
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(ControlCommand::parse("please relay this"), None);
        assert_eq!(ControlCommand::parse("/menus"), None);
    }
}
