use async_trait::async_trait;
use std::collections::{ HashMap, VecDeque };
use std::sync::Mutex;
use super::{ BackendError, ChatBackend };
use crate::models::api::{ ChatReply, ChatRequest, StoredMessage };
use crate::models::chat::ConversationSummary;
use crate::models::gap::{ GapAnalysisReport, OverallGapAnalysis };

#[derive(Default)]
struct FakeState {
    chat_results: VecDeque<Result<ChatReply, BackendError>>,
    chat_requests: Vec<ChatRequest>,
    conversations: Option<Vec<ConversationSummary>>,
    histories: HashMap<String, Vec<StoredMessage>>,
    history_limits: Vec<usize>,
    deleted: Vec<String>,
    fail_deletes: bool,
    gap_report: Option<GapAnalysisReport>,
    overview: Option<OverallGapAnalysis>,
    calls: usize,
}

/// Scripted in-memory backend for unit tests.
#[derive(Default)]
pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_reply(self, response: &str, conversation_id: Option<&str>) -> Self {
        self.state.lock().unwrap().chat_results.push_back(
            Ok(ChatReply {
                response: response.to_string(),
                conversation_id: conversation_id.map(str::to_string),
            })
        );
        self
    }

    pub(crate) fn with_chat_error(self, error: BackendError) -> Self {
        self.state.lock().unwrap().chat_results.push_back(Err(error));
        self
    }

    pub(crate) fn with_conversations(self, conversations: Vec<ConversationSummary>) -> Self {
        self.state.lock().unwrap().conversations = Some(conversations);
        self
    }

    pub(crate) fn with_history(self, conversation_id: &str, messages: Vec<StoredMessage>) -> Self {
        self.state.lock().unwrap().histories.insert(conversation_id.to_string(), messages);
        self
    }

    pub(crate) fn failing_deletes(self) -> Self {
        self.state.lock().unwrap().fail_deletes = true;
        self
    }

    pub(crate) fn with_gap_report(self, report: GapAnalysisReport) -> Self {
        self.state.lock().unwrap().gap_report = Some(report);
        self
    }

    pub(crate) fn with_overview(self, overview: OverallGapAnalysis) -> Self {
        self.state.lock().unwrap().overview = Some(overview);
        self
    }

    pub(crate) fn chat_requests(&self) -> Vec<ChatRequest> {
        self.state.lock().unwrap().chat_requests.clone()
    }

    pub(crate) fn history_limits(&self) -> Vec<usize> {
        self.state.lock().unwrap().history_limits.clone()
    }

    pub(crate) fn deleted(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }
}

fn unavailable() -> BackendError {
    BackendError::Status { status: 500, message: "Internal Server Error".to_string() }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.chat_requests.push(request.clone());
        state.chat_results.pop_front().unwrap_or_else(|| Err(unavailable()))
    }

    async fn list_conversations(
        &self,
        limit: usize
    ) -> Result<Vec<ConversationSummary>, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.conversations
            .clone()
            .map(|items| items.into_iter().take(limit).collect())
            .ok_or_else(unavailable)
    }

    async fn conversation_history(
        &self,
        conversation_id: &str,
        limit: usize
    ) -> Result<Vec<StoredMessage>, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.history_limits.push(limit);
        state.histories
            .get(conversation_id)
            .cloned()
            .ok_or_else(|| BackendError::Status {
                status: 500,
                message: format!("Error retrieving history: {} not found", conversation_id),
            })
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if state.fail_deletes {
            return Err(BackendError::Status { status: 404, message: "Conversation not found".to_string() });
        }
        state.deleted.push(conversation_id.to_string());
        Ok(())
    }

    async fn ai_info(&self) -> Result<bool, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        Ok(true)
    }

    async fn gap_analysis(&self, _conversation_id: &str) -> Result<GapAnalysisReport, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.gap_report.clone().ok_or_else(unavailable)
    }

    async fn gap_analysis_all(&self) -> Result<OverallGapAnalysis, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.overview.clone().ok_or_else(unavailable)
    }
}
