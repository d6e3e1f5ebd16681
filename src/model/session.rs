use super::OrderDraft;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "es" => Ok(Language::Es),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Trace of one tool call made while producing an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    pub args: Value,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolInvocation>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), Vec::new())
    }

    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolInvocation>) -> Self {
        Self::new(Role::Assistant, content.into(), tool_calls)
    }

    fn new(role: Role, content: String, tool_calls: Vec<ToolInvocation>) -> Self {
        let timestamp = Utc::now();
        let prefix = match role {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        };
        Self {
            id: format!("{prefix}-{}", timestamp.timestamp_millis()),
            role,
            content,
            timestamp,
            tool_calls,
        }
    }
}

/// One conversation: a chat tab or a voice call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub restaurant_id: String,
    pub table_id: String,
    pub language: Language,
    pub customer_id: Option<String>,
    /// `None` whenever the cart holds no lines.
    pub current_order: Option<OrderDraft>,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where a session gets created on first contact.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCreate {
    pub restaurant_id: String,
    pub table_id: String,
    pub language: Language,
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// Replace the draft wholesale. Empty drafts are stored as `None`.
    ReplaceOrder(Option<OrderDraft>),
    /// Append transcript entries in order.
    AppendMessages(Vec<ChatMessage>),
}
