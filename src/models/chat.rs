use chrono::{ DateTime, Local, NaiveDateTime };
use serde::{ Serialize, Deserialize };
use std::fmt;

const DISPLAY_TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Label used in exports and the terminal transcript.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One transcript entry. `timestamp` is the display time, not a sortable instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: timestamp.into(),
        }
    }

    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self::new(role, content, Local::now().format(DISPLAY_TIME_FORMAT).to_string())
    }
}

/// Role/content pair sent to the backend as context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl From<&ChatMessage> for HistoryEntry {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(alias = "conversation_id")]
    pub id: String,
    #[serde(default, alias = "first_message")]
    pub first_message_preview: Option<String>,
    #[serde(default)]
    pub message_count: u64,
    #[serde(default, alias = "updated_at")]
    pub last_updated: Option<String>,
}

impl ConversationSummary {
    pub fn preview(&self, max_chars: usize) -> String {
        let text = self.first_message_preview.as_deref().unwrap_or("New conversation");
        if text.chars().count() <= max_chars {
            return text.to_string();
        }
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated.trim_end())
    }
}

/// Converts a backend timestamp into display time, falling back to the current local time.
pub fn display_time(raw: Option<&str>) -> String {
    let parsed = raw.and_then(|value| {
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
            return Some(with_offset.with_timezone(&Local).format(DISPLAY_TIME_FORMAT).to_string());
        }
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.format(DISPLAY_TIME_FORMAT).to_string())
    });
    parsed.unwrap_or_else(|| Local::now().format(DISPLAY_TIME_FORMAT).to_string())
}
