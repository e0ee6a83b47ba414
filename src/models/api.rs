use serde::{ Serialize, Deserialize };
use serde_json::Value as JsonValue;
use super::chat::HistoryEntry;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: Option<String>,
    pub chat_history: Vec<HistoryEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    pub conversation_id: Option<String>,
}

impl ChatReply {
    /// Reads the reply from either the top level or a nested `data` object;
    /// the backend has shipped both shapes.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        let nested = value.get("data");
        let response = value
            .get("response")
            .and_then(|r| r.as_str())
            .or_else(|| nested.and_then(|d| d.get("response")).and_then(|r| r.as_str()))?;
        let conversation_id = value
            .get("conversation_id")
            .and_then(|c| c.as_str())
            .or_else(|| nested.and_then(|d| d.get("conversation_id")).and_then(|c| c.as_str()))
            .map(str::to_string);

        Some(Self {
            response: response.to_string(),
            conversation_id,
        })
    }
}

/// Standard `{success, message, data}` wrapper used by most routes.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Error body of a non-2xx response. FastAPI puts validation failures in
/// `detail` as a list, so it stays untyped.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<JsonValue>,
}

impl ErrorBody {
    pub fn text(&self) -> Option<String> {
        if let Some(message) = self.message.as_ref().filter(|m| !m.is_empty()) {
            return Some(message.clone());
        }
        match &self.detail {
            Some(JsonValue::String(detail)) if !detail.is_empty() => Some(detail.clone()),
            Some(JsonValue::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct StoredMessage {
    pub role: crate::models::chat::Role,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryData {
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
}
