use log::{ debug, error, info, warn };
use std::sync::Arc;
use std::time::Duration;
use crate::backend::ChatBackend;
use crate::config::settings::Settings;
use crate::error::ClientError;
use crate::fallback;
use crate::history::assemble_context;
use crate::models::api::{ ChatReply, ChatRequest };
use crate::models::chat::{ ChatMessage, Role };
use crate::session::{ Effect, Session };

/// The backend rejects longer messages with a 400.
pub const MAX_MESSAGE_LENGTH: usize = 5000;
pub const DEFAULT_FALLBACK_DELAY: Duration = Duration::from_millis(500);

pub struct ExchangeClient {
    backend: Arc<dyn ChatBackend>,
    fallback_delay: Duration,
}

impl ExchangeClient {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            fallback_delay: DEFAULT_FALLBACK_DELAY,
        }
    }

    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = delay;
        self
    }

    /// Sends one user message. Every attempt that gets past validation
    /// appends exactly one assistant message, and the sending flag is
    /// always cleared afterwards.
    pub async fn send(&self, input: &str, session: &mut Session, settings: &Settings) -> Vec<Effect> {
        let message = input.trim();
        if message.is_empty() {
            return Vec::new();
        }
        if session.is_sending() {
            debug!("Ignoring send while another one is in flight");
            return Vec::new();
        }
        if message.chars().count() > MAX_MESSAGE_LENGTH {
            let error = ClientError::Validation(
                format!("Message must not exceed {} characters", MAX_MESSAGE_LENGTH)
            );
            return vec![Effect::warning(error.to_string())];
        }

        session.set_sending(true);
        let effects = self.exchange(message, session, settings).await;
        session.set_sending(false);
        effects
    }

    async fn exchange(&self, message: &str, session: &mut Session, settings: &Settings) -> Vec<Effect> {
        let chat_history = assemble_context(session.transcript(), settings.max_history_length);
        session.push(ChatMessage::now(Role::User, message));

        if settings.test_mode_enabled {
            debug!("Test mode enabled, answering locally");
            tokio::time::sleep(self.fallback_delay).await;
            session.push(ChatMessage::now(Role::Assistant, fallback::reply(message)));
            return Vec::new();
        }

        let request = ChatRequest {
            message: message.to_string(),
            conversation_id: session.active_conversation_id().map(str::to_string),
            chat_history,
        };

        match self.backend.send_message(&request).await {
            Ok(reply) => apply_reply(reply, session),
            Err(e) => apply_failure(ClientError::from(e), message, session),
        }
    }
}

fn apply_reply(reply: ChatReply, session: &mut Session) -> Vec<Effect> {
    let mut effects = Vec::new();
    session.set_quota_exceeded(false);
    session.push(ChatMessage::now(Role::Assistant, reply.response));

    if let Some(conversation_id) = reply.conversation_id.as_deref() {
        if session.adopt_conversation(conversation_id) {
            info!("Started conversation {}", conversation_id);
            effects.push(Effect::RefreshConversations);
        }
    }
    effects
}

fn apply_failure(error: ClientError, message: &str, session: &mut Session) -> Vec<Effect> {
    match error {
        ClientError::Quota(text) => {
            warn!("AI quota exceeded: {}", text);
            session.set_quota_exceeded(true);
            if session.test_mode_active() {
                session.push(ChatMessage::now(Role::Assistant, fallback::reply(message)));
                return Vec::new();
            }
            session.push(
                ChatMessage::now(
                    Role::Assistant,
                    format!(
                        "The AI service has reached its usage limit: {}\n\nWait a moment and try again, or switch to fallback mode to keep chatting with simulated responses.",
                        text
                    )
                )
            );
            vec![Effect::warning("AI quota exceeded"), Effect::SuggestTestMode]
        }
        ClientError::Network(text) => {
            error!("Network error while sending message: {}", text);
            session.push(
                ChatMessage::now(
                    Role::Assistant,
                    format!(
                        "Could not reach the chat server. Check that the backend is running and the endpoint in settings is correct.\n\nDetails: {}",
                        text
                    )
                )
            );
            vec![Effect::error(format!("Network error: {}", text))]
        }
        ClientError::Backend(text) | ClientError::Validation(text) => {
            error!("Chat request failed: {}", text);
            session.push(ChatMessage::now(Role::Assistant, format!("Error: {}", text)));
            vec![Effect::error(text)]
        }
    }
}
