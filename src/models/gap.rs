use serde::{ Serialize, Deserialize };
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub description: String,
    pub suggestion: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapMetrics {
    pub total_messages: u64,
    pub user_messages: u64,
    pub ai_messages: u64,
    pub questions_asked: u64,
    pub average_message_length: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityBreakdown {
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

/// Completeness report for one conversation. The backend omits `metrics` and
/// `severity_breakdown` for empty conversations, so every section defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapAnalysisReport {
    pub conversation_id: Option<String>,
    pub status: Option<String>,
    pub completeness_score: f64,
    pub metrics: GapMetrics,
    pub severity_breakdown: SeverityBreakdown,
    pub gaps: Vec<Gap>,
    pub suggestions: Vec<String>,
    pub error: Option<String>,
}

impl GapAnalysisReport {
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapFrequency {
    #[serde(rename = "type")]
    pub kind: String,
    pub frequency: u64,
}

/// Aggregate over every stored conversation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverallGapAnalysis {
    pub status: String,
    pub total_conversations: u64,
    pub analyzed_conversations: u64,
    pub total_gaps_found: u64,
    pub average_completeness_score: f64,
    pub common_gaps: Vec<GapFrequency>,
    pub error: Option<String>,
}
