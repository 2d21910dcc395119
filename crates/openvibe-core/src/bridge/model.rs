//! Relay bridge wire and routing models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How inbound chat text is handled for one external session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Relay text verbatim into the bound thread.
    #[default]
    Bridge,
    /// Reserved for an in-process agent; currently answered with a notice.
    Agent,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Bridge => "bridge",
            SessionMode::Agent => "agent",
        }
    }
}

impl std::str::FromStr for SessionMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bridge" => Ok(SessionMode::Bridge),
            "agent" => Ok(SessionMode::Agent),
            other => Err(format!("unknown session mode: {}", other)),
        }
    }
}

/// Binding of an external chat session to an in-app thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRoute {
    pub session_key: String,
    pub channel: String,
    pub chat_id: String,
    pub workspace_id: String,
    pub thread_id: String,
}

impl SessionRoute {
    pub fn bind_command(&self) -> BridgeCommand {
        BridgeCommand::BindSession {
            session_key: self.session_key.clone(),
            channel: self.channel.clone(),
            chat_id: self.chat_id.clone(),
            workspace_id: self.workspace_id.clone(),
            thread_id: self.thread_id.clone(),
        }
    }
}

/// A chat message received by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMessage {
    pub channel: String,
    pub chat_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    pub session_key: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Mapping the relay already knows about, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl RemoteMessage {
    /// Explicit `(workspace_id, thread_id)` carried by the event, when both
    /// are present and non-blank.
    pub fn explicit_target(&self) -> Option<(&str, &str)> {
        let workspace_id = self.workspace_id.as_deref().map(str::trim)?;
        let thread_id = self.thread_id.as_deref().map(str::trim)?;
        if workspace_id.is_empty() || thread_id.is_empty() {
            return None;
        }
        Some((workspace_id, thread_id))
    }

    pub fn reply(&self, content: impl Into<String>) -> BridgeCommand {
        BridgeCommand::DirectMessage {
            channel: self.channel.clone(),
            chat_id: self.chat_id.clone(),
            content: content.into(),
        }
    }

    pub fn route_to(&self, workspace_id: &str, thread_id: &str) -> SessionRoute {
        SessionRoute {
            session_key: self.session_key.clone(),
            channel: self.channel.clone(),
            chat_id: self.chat_id.clone(),
            workspace_id: workspace_id.to_string(),
            thread_id: thread_id.to_string(),
        }
    }
}

/// Events emitted by the relay bridge process.
///
/// Only `remote-message` and `status` affect routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BridgeEvent {
    RemoteMessage(RemoteMessage),
    Status {
        running: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    MessageSync {
        #[serde(flatten)]
        data: Map<String, Value>,
    },
    AgentTrace {
        #[serde(flatten)]
        data: Map<String, Value>,
    },
    Stderr {
        #[serde(default)]
        message: String,
    },
}

/// Commands sent to the relay bridge process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BridgeCommand {
    DirectMessage {
        channel: String,
        #[serde(rename = "chatId")]
        chat_id: String,
        content: String,
    },
    BindSession {
        #[serde(rename = "sessionKey")]
        session_key: String,
        channel: String,
        #[serde(rename = "chatId")]
        chat_id: String,
        #[serde(rename = "workspaceId")]
        workspace_id: String,
        #[serde(rename = "threadId")]
        thread_id: String,
    },
    SetSessionMode {
        #[serde(rename = "sessionKey")]
        session_key: String,
        mode: SessionMode,
    },
}

/// An open thread tab offered by `/relay`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayCandidate {
    pub workspace_id: String,
    pub thread_id: String,
    /// `<workspace name> / <tab title>`
    pub title: String,
}

/// Delivery flags for messages injected into a thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageOptions {
    /// Deliver the text as-is, without slash-prompt expansion.
    pub skip_prompt_expansion: bool,
    /// Do not mirror the message back through chat-mirroring integrations.
    pub skip_bridge_echo: bool,
}

impl MessageOptions {
    /// Options used for relayed chat text.
    pub fn relayed() -> Self {
        Self {
            skip_prompt_expansion: true,
            skip_bridge_echo: true,
        }
    }
}
