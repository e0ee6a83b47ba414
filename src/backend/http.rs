use async_trait::async_trait;
use log::{ debug, warn };
use reqwest::{ Client as HttpClient, Response, StatusCode };
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use url::Url;
use super::{ BackendError, ChatBackend };
use crate::models::api::{ ChatReply, ChatRequest, Envelope, ErrorBody, HistoryData, StoredMessage };
use crate::models::chat::ConversationSummary;
use crate::models::gap::{ GapAnalysisReport, OverallGapAnalysis };

#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: HttpClient,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Appends encoded path segments to the base URL, keeping any base path such as `/api`.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| BackendError::InvalidEndpoint(format!("{} ({})", self.base_url, e)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| BackendError::InvalidEndpoint(self.base_url.clone()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn endpoint_with_limit(&self, segments: &[&str], limit: usize) -> Result<Url, BackendError> {
        let mut url = self.endpoint(segments)?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        Ok(url)
    }

    async fn check_status(&self, resp: Response) -> Result<Response, BackendError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        warn!("Backend returned {}: {}", status, message);
        Err(BackendError::Status { status: status.as_u16(), message })
    }

    async fn read_json(&self, resp: Response) -> Result<JsonValue, BackendError> {
        let resp = self.check_status(resp).await?;
        resp.json::<JsonValue>().await.map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn get_json(&self, url: Url) -> Result<JsonValue, BackendError> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.map_err(|e| BackendError::Request(e.without_url()))?;
        self.read_json(resp).await
    }
}

/// Message of a non-2xx response: `message` or `detail` from the body, else code and reason.
pub fn error_message(status: StatusCode, body: &str) -> String {
    serde_json
        ::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.text())
        .unwrap_or_else(|| {
            format!("HTTP {}: {}", status.as_u16(), status.canonical_reason().unwrap_or("Unknown Status"))
        })
}

fn unwrap_data<T: DeserializeOwned>(value: JsonValue) -> Result<T, BackendError> {
    let envelope: Envelope<T> = serde_json
        ::from_value(value)
        .map_err(|e| BackendError::Decode(e.to_string()))?;
    if envelope.success == Some(false) {
        return Err(
            BackendError::Unsuccessful(
                envelope.message.unwrap_or_else(|| "Request was not successful".to_string())
            )
        );
    }
    envelope.data.ok_or_else(|| BackendError::Decode("missing data field".to_string()))
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        let url = self.endpoint(&["chat"])?;
        debug!("POST {} ({} history entries)", url, request.chat_history.len());
        let resp = self.http
            .post(url)
            .json(request)
            .send().await
            .map_err(|e| BackendError::Request(e.without_url()))?;
        let value = self.read_json(resp).await?;

        if value.get("success").and_then(|s| s.as_bool()) == Some(false) {
            let message = value
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("The server could not process the message");
            return Err(BackendError::Unsuccessful(message.to_string()));
        }

        ChatReply::from_json(&value).ok_or_else(|| {
            BackendError::Decode("reply text missing from chat response".to_string())
        })
    }

    async fn list_conversations(
        &self,
        limit: usize
    ) -> Result<Vec<ConversationSummary>, BackendError> {
        let url = self.endpoint_with_limit(&["chat", "conversations"], limit)?;
        let value = self.get_json(url).await?;
        unwrap_data(value)
    }

    async fn conversation_history(
        &self,
        conversation_id: &str,
        limit: usize
    ) -> Result<Vec<StoredMessage>, BackendError> {
        let url = self.endpoint_with_limit(&["chat", "history", conversation_id], limit)?;
        let value = self.get_json(url).await?;
        let data: HistoryData = unwrap_data(value)?;
        Ok(data.messages)
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<(), BackendError> {
        let url = self.endpoint(&["chat", "conversations", conversation_id])?;
        debug!("DELETE {}", url);
        let resp = self.http.delete(url).send().await.map_err(|e| BackendError::Request(e.without_url()))?;
        self.check_status(resp).await?;
        Ok(())
    }

    async fn ai_info(&self) -> Result<bool, BackendError> {
        let url = self.endpoint(&["ai", "info"])?;
        let value = self.get_json(url).await?;
        Ok(value.get("success").and_then(|s| s.as_bool()).unwrap_or(false))
    }

    async fn gap_analysis(&self, conversation_id: &str) -> Result<GapAnalysisReport, BackendError> {
        let url = self.endpoint(&["gap-analysis", "conversation", conversation_id])?;
        let value = self.get_json(url).await?;
        unwrap_data(value)
    }

    async fn gap_analysis_all(&self) -> Result<OverallGapAnalysis, BackendError> {
        let url = self.endpoint(&["gap-analysis", "all"])?;
        let value = self.get_json(url).await?;
        unwrap_data(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path() {
        let backend = HttpBackend::new("http://localhost:8000/api");
        assert_eq!(
            backend.endpoint(&["chat", "history", "conv_1"]).unwrap().as_str(),
            "http://localhost:8000/api/chat/history/conv_1"
        );

        let trailing = HttpBackend::new("http://localhost:8000/api/");
        assert_eq!(trailing.endpoint(&["chat"]).unwrap().as_str(), "http://localhost:8000/api/chat");
    }

    #[test]
    fn endpoint_encodes_segments_and_limit() {
        let backend = HttpBackend::new("http://localhost:8000/api");
        let url = backend.endpoint_with_limit(&["chat", "history", "a b"], 25).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/chat/history/a%20b?limit=25");
    }

    #[test]
    fn malformed_base_url_fails_at_request_time() {
        let backend = HttpBackend::new("not a url");
        assert!(matches!(backend.endpoint(&["chat"]), Err(BackendError::InvalidEndpoint(_))));
    }

    #[test]
    fn error_message_falls_back_to_status_line() {
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "<html>oops</html>"), "HTTP 502: Bad Gateway");
        assert_eq!(
            error_message(StatusCode::TOO_MANY_REQUESTS, r#"{"detail":"Quota exceeded"}"#),
            "Quota exceeded"
        );
    }
}
