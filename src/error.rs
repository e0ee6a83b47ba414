use thiserror::Error;
use crate::backend::BackendError;

const QUOTA_MARKERS: [&str; 5] = ["quota", "429", "limit", "exceeded", "too many requests"];
const NETWORK_MARKERS: [&str; 3] = ["network", "fetch", "failed to fetch"];

/// Failures as seen at an operation boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Provider usage or rate limit reached.
    #[error("{0}")]
    Quota(String),
    #[error("{0}")]
    Network(String),
    /// Structured non-2xx reply, shown verbatim.
    #[error("{0}")]
    Backend(String),
    /// Rejected locally before any request.
    #[error("{0}")]
    Validation(String),
}

impl ClientError {
    /// Classifies by message text rather than status code: the backend may
    /// report quota exhaustion inside a 500 body.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();
        if QUOTA_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            ClientError::Quota(message)
        } else if NETWORK_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            ClientError::Network(message)
        } else {
            ClientError::Backend(message)
        }
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, ClientError::Quota(_))
    }
}

impl From<BackendError> for ClientError {
    fn from(err: BackendError) -> Self {
        ClientError::classify(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_markers_win_over_network_markers() {
        assert!(ClientError::classify("Failed to fetch: 429 Too Many Requests").is_quota());
        assert!(ClientError::classify("You exceeded your current QUOTA").is_quota());
        assert!(ClientError::classify("Rate limit reached").is_quota());
    }

    #[test]
    fn network_and_generic_messages() {
        assert_eq!(
            ClientError::classify("Failed to fetch"),
            ClientError::Network("Failed to fetch".into())
        );
        assert_eq!(
            ClientError::classify("Error processing chat: boom"),
            ClientError::Backend("Error processing chat: boom".into())
        );
    }

    #[test]
    fn status_errors_classify_by_their_body() {
        let err = BackendError::Status { status: 500, message: "Gemini quota exceeded".into() };
        assert!(ClientError::from(err).is_quota());

        let err = BackendError::Status { status: 404, message: "Conversation not found".into() };
        assert_eq!(ClientError::from(err), ClientError::Backend("Conversation not found".into()));
    }
}
