use log::{ error, info, warn };
use std::sync::Arc;
use crate::backend::ChatBackend;
use crate::error::ClientError;
use crate::models::chat::{ display_time, ChatMessage, ConversationSummary };
use crate::session::{ Effect, Session, View };

pub const DEFAULT_LIST_LIMIT: usize = 10;
const PREVIEW_CHARS: usize = 50;
const MAX_CONVERSATION_ID_LEN: usize = 100;

/// Result of listing conversations. Never an error value: failures render as a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationList {
    Items(Vec<ConversationSummary>),
    Empty,
    Error(String),
}

impl ConversationList {
    pub fn render(&self, active: Option<&str>) -> String {
        match self {
            ConversationList::Empty => "No conversations yet\n".to_string(),
            ConversationList::Error(e) => format!("Could not load conversations: {}\n", e),
            ConversationList::Items(items) => {
                let mut out = String::new();
                for item in items {
                    let marker = if Some(item.id.as_str()) == active { "*" } else { " " };
                    out.push_str(
                        &format!(
                            "{} {}  {} ({} messages{})\n",
                            marker,
                            item.id,
                            item.preview(PREVIEW_CHARS),
                            item.message_count,
                            item.last_updated
                                .as_deref()
                                .map(|t| format!(", updated {}", t))
                                .unwrap_or_default()
                        )
                    );
                }
                out
            }
        }
    }
}

/// Same rule the backend applies: ASCII alphanumerics, `-` and `_`, at most 100 chars.
pub fn validate_conversation_id(conversation_id: &str) -> Result<(), ClientError> {
    if conversation_id.is_empty() {
        return Err(ClientError::Validation("Conversation ID cannot be empty".to_string()));
    }
    if conversation_id.len() > MAX_CONVERSATION_ID_LEN {
        return Err(ClientError::Validation("Conversation ID is too long".to_string()));
    }
    if !conversation_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ClientError::Validation("Conversation ID contains invalid characters".to_string()));
    }
    Ok(())
}

pub struct ConversationClient {
    backend: Arc<dyn ChatBackend>,
}

impl ConversationClient {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    pub async fn list_recent(&self, limit: usize) -> ConversationList {
        match self.backend.list_conversations(limit).await {
            Ok(items) if items.is_empty() => ConversationList::Empty,
            Ok(items) => ConversationList::Items(items),
            Err(e) => {
                warn!("Failed to load conversations: {}", e);
                ConversationList::Error(e.to_string())
            }
        }
    }

    /// Replaces the transcript with the stored conversation. On failure the session is untouched.
    pub async fn open_conversation(
        &self,
        session: &mut Session,
        conversation_id: &str,
        max_history_length: usize
    ) -> Vec<Effect> {
        if let Err(e) = validate_conversation_id(conversation_id) {
            return vec![Effect::warning(e.to_string())];
        }

        match self.backend.conversation_history(conversation_id, max_history_length).await {
            Ok(stored) => {
                let messages: Vec<ChatMessage> = stored
                    .into_iter()
                    .map(|m| ChatMessage::new(m.role, m.content, display_time(m.timestamp.as_deref())))
                    .collect();
                info!("Loaded {} messages for conversation {}", messages.len(), conversation_id);
                let count = messages.len();
                session.replace_transcript(conversation_id, messages);
                vec![
                    Effect::Navigate(View::Conversation(conversation_id.to_string())),
                    Effect::success(format!("Loaded conversation ({} messages)", count))
                ]
            }
            Err(e) => {
                error!("Failed to load conversation {}: {}", conversation_id, e);
                vec![Effect::error(format!("Failed to load conversation: {}", ClientError::from(e)))]
            }
        }
    }

    /// Best-effort delete. The session always moves to a new chat.
    pub async fn delete_conversation(&self, session: &mut Session, conversation_id: &str) -> Vec<Effect> {
        match validate_conversation_id(conversation_id) {
            Ok(()) =>
                match self.backend.delete_conversation(conversation_id).await {
                    Ok(()) => info!("Deleted conversation {}", conversation_id),
                    Err(e) => error!("Failed to delete conversation {}: {}", conversation_id, e),
                }
            Err(e) => warn!("Skipping delete of '{}': {}", conversation_id, e),
        }
        let mut effects = new_chat(session);
        effects.push(Effect::RefreshConversations);
        effects
    }

    pub async fn probe(&self) -> bool {
        match self.backend.ai_info().await {
            Ok(alive) => alive,
            Err(e) => {
                warn!("Backend probe failed: {}", e);
                false
            }
        }
    }
}

pub fn new_chat(session: &mut Session) -> Vec<Effect> {
    session.reset();
    vec![Effect::Navigate(View::NewChat)]
}
