pub mod http;
#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use crate::config::settings::Settings;
use crate::models::api::{ ChatReply, ChatRequest, StoredMessage };
use crate::models::chat::ConversationSummary;
use crate::models::gap::{ GapAnalysisReport, OverallGapAnalysis };
use self::http::HttpBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Network error: failed to fetch ({0})")]
    Request(#[from] reqwest::Error),
    #[error("{message}")]
    Status { status: u16, message: String },
    /// 2xx envelope carrying `success: false`.
    #[error("{0}")]
    Unsuccessful(String),
    #[error("Unexpected response from server: {0}")]
    Decode(String),
    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),
}

/// The chatbot API as consumed by the client.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply, BackendError>;

    async fn list_conversations(
        &self,
        limit: usize
    ) -> Result<Vec<ConversationSummary>, BackendError>;

    async fn conversation_history(
        &self,
        conversation_id: &str,
        limit: usize
    ) -> Result<Vec<StoredMessage>, BackendError>;

    async fn delete_conversation(&self, conversation_id: &str) -> Result<(), BackendError>;

    /// Liveness probe against the AI info route.
    async fn ai_info(&self) -> Result<bool, BackendError>;

    async fn gap_analysis(&self, conversation_id: &str) -> Result<GapAnalysisReport, BackendError>;

    async fn gap_analysis_all(&self) -> Result<OverallGapAnalysis, BackendError>;
}

pub fn new_backend(settings: &Settings) -> Arc<dyn ChatBackend> {
    Arc::new(HttpBackend::new(settings.endpoint_base_url.clone()))
}
