use crate::models::chat::ChatMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient, auto-dismissing message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    NewChat,
    Conversation(String),
}

/// Side effects requested by an operation. The adapter decides how to show them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Notify(Notification),
    Navigate(View),
    Download {
        file_name: String,
        contents: String,
    },
    RefreshConversations,
    /// A quota failure happened outside fallback mode.
    SuggestTestMode,
}

impl Effect {
    fn notify(level: NotificationLevel, text: impl Into<String>) -> Self {
        Effect::Notify(Notification { level, text: text.into() })
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::notify(NotificationLevel::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::notify(NotificationLevel::Success, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::notify(NotificationLevel::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::notify(NotificationLevel::Error, text)
    }
}

/// Client-side state of one chat interaction.
#[derive(Debug, Clone, Default)]
pub struct Session {
    active_conversation_id: Option<String>,
    transcript: Vec<ChatMessage>,
    test_mode_active: bool,
    quota_exceeded: bool,
    sending: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_conversation_id(&self) -> Option<&str> {
        self.active_conversation_id.as_deref()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn test_mode_active(&self) -> bool {
        self.test_mode_active
    }

    /// Session fallback mode: quota failures are answered locally.
    pub fn set_test_mode_active(&mut self, active: bool) {
        self.test_mode_active = active;
    }

    pub fn quota_exceeded(&self) -> bool {
        self.quota_exceeded
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// New chat. Fallback mode is the user's choice and survives.
    pub fn reset(&mut self) {
        *self = Session {
            test_mode_active: self.test_mode_active,
            ..Session::default()
        };
    }

    pub(crate) fn push(&mut self, message: ChatMessage) {
        self.transcript.push(message);
    }

    pub(crate) fn replace_transcript(&mut self, conversation_id: &str, messages: Vec<ChatMessage>) {
        self.transcript = messages;
        self.active_conversation_id = Some(conversation_id.to_string());
    }

    /// Returns true when the id was adopted.
    pub(crate) fn adopt_conversation(&mut self, conversation_id: &str) -> bool {
        if self.active_conversation_id.is_some() {
            return false;
        }
        self.active_conversation_id = Some(conversation_id.to_string());
        true
    }

    pub(crate) fn set_quota_exceeded(&mut self, exceeded: bool) {
        self.quota_exceeded = exceeded;
    }

    pub(crate) fn set_sending(&mut self, sending: bool) {
        self.sending = sending;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;

    #[test]
    fn reset_clears_conversation_but_keeps_fallback_mode() {
        let mut session = Session::new();
        session.push(ChatMessage::new(Role::User, "hi", "10:00:00"));
        session.adopt_conversation("conv_1");
        session.set_quota_exceeded(true);
        session.set_test_mode_active(true);

        session.reset();

        assert!(session.transcript().is_empty());
        assert_eq!(session.active_conversation_id(), None);
        assert!(!session.quota_exceeded());
        assert!(session.test_mode_active());
    }

    #[test]
    fn conversation_id_is_adopted_once() {
        let mut session = Session::new();
        assert!(session.adopt_conversation("first"));
        assert!(!session.adopt_conversation("second"));
        assert_eq!(session.active_conversation_id(), Some("first"));
    }
}
