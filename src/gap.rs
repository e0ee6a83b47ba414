use log::{ error, info };
use std::sync::Arc;
use crate::backend::ChatBackend;
use crate::conversations::validate_conversation_id;
use crate::error::ClientError;
use crate::models::gap::{ GapAnalysisReport, OverallGapAnalysis };
use crate::session::Effect;

/// What the gap analysis view currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GapPanel {
    #[default]
    Idle,
    Loading,
    Report(GapAnalysisReport),
    Error(String),
}

impl GapPanel {
    pub fn render(&self) -> String {
        match self {
            GapPanel::Idle => String::new(),
            GapPanel::Loading => "Analyzing conversation...\n".to_string(),
            GapPanel::Report(report) => render_report(report),
            GapPanel::Error(e) => format!("Gap analysis failed: {}\n", e),
        }
    }
}

pub struct GapAnalysisClient {
    backend: Arc<dyn ChatBackend>,
}

impl GapAnalysisClient {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Loads the report into `panel`. The panel never stays `Loading`.
    pub async fn fetch(&self, conversation_id: Option<&str>, panel: &mut GapPanel) -> Vec<Effect> {
        let conversation_id = match conversation_id {
            Some(id) => id,
            None => {
                let e = ClientError::Validation(
                    "Start or open a conversation before running gap analysis".to_string()
                );
                return vec![Effect::warning(e.to_string())];
            }
        };
        if let Err(e) = validate_conversation_id(conversation_id) {
            return vec![Effect::warning(e.to_string())];
        }

        *panel = GapPanel::Loading;
        match self.backend.gap_analysis(conversation_id).await {
            Ok(report) if report.is_error() => {
                let message = report.error.unwrap_or_else(|| "analysis failed".to_string());
                error!("Gap analysis for {} reported an error: {}", conversation_id, message);
                *panel = GapPanel::Error(message);
                Vec::new()
            }
            Ok(report) => {
                info!(
                    "Gap analysis for {}: score {}, {} gaps",
                    conversation_id,
                    report.completeness_score,
                    report.gaps.len()
                );
                *panel = GapPanel::Report(report);
                Vec::new()
            }
            Err(e) => {
                error!("Gap analysis for {} failed: {}", conversation_id, e);
                *panel = GapPanel::Error(e.to_string());
                vec![Effect::error("Gap analysis failed")]
            }
        }
    }

    pub async fn fetch_overview(&self) -> Result<OverallGapAnalysis, ClientError> {
        let overview = self.backend.gap_analysis_all().await?;
        if overview.status == "error" {
            return Err(
                ClientError::Backend(overview.error.unwrap_or_else(|| "analysis failed".to_string()))
            );
        }
        Ok(overview)
    }
}

fn score_bar(score: f64) -> String {
    let filled = ((score.clamp(0.0, 100.0) / 10.0).round()) as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(10 - filled))
}

pub fn render_report(report: &GapAnalysisReport) -> String {
    let mut out = String::new();
    out.push_str(
        &format!(
            "Completeness: {:.0}/100 {}\n",
            report.completeness_score,
            score_bar(report.completeness_score)
        )
    );
    let m = &report.metrics;
    out.push_str(
        &format!(
            "Messages: {} total, {} user, {} AI, {} questions asked\n",
            m.total_messages,
            m.user_messages,
            m.ai_messages,
            m.questions_asked
        )
    );
    let s = &report.severity_breakdown;
    out.push_str(&format!("Severity: {} high, {} medium, {} low\n", s.high, s.medium, s.low));

    if report.gaps.is_empty() {
        out.push_str("\nNo gaps found.\n");
    } else {
        out.push_str("\nGaps:\n");
        for gap in &report.gaps {
            out.push_str(&format!("  [{}] {}: {}\n", gap.severity, gap.kind, gap.description));
            out.push_str(&format!("      -> {}\n", gap.suggestion));
        }
    }

    if !report.suggestions.is_empty() {
        out.push_str("\nSuggestions:\n");
        for suggestion in &report.suggestions {
            out.push_str(&format!("  - {}\n", suggestion));
        }
    }
    out
}

pub fn render_overview(overview: &OverallGapAnalysis) -> String {
    if overview.total_conversations == 0 {
        return "No conversations to analyze\n".to_string();
    }
    let mut out = String::new();
    out.push_str(
        &format!(
            "Analyzed {} of {} conversations\n",
            overview.analyzed_conversations,
            overview.total_conversations
        )
    );
    out.push_str(&format!("Gaps found: {}\n", overview.total_gaps_found));
    out.push_str(
        &format!(
            "Average completeness: {:.2}/100 {}\n",
            overview.average_completeness_score,
            score_bar(overview.average_completeness_score)
        )
    );
    if !overview.common_gaps.is_empty() {
        out.push_str("\nMost common gaps:\n");
        for gap in &overview.common_gaps {
            out.push_str(&format!("  {} ({})\n", gap.kind, gap.frequency));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use crate::models::gap::{ Gap, GapFrequency, GapMetrics, Severity, SeverityBreakdown };

    fn client(backend: &Arc<FakeBackend>) -> GapAnalysisClient {
        let backend: Arc<dyn ChatBackend> = backend.clone();
        GapAnalysisClient::new(backend)
    }

    fn report() -> GapAnalysisReport {
        GapAnalysisReport {
            conversation_id: Some("conv_1".into()),
            status: Some("analyzed".into()),
            completeness_score: 55.0,
            metrics: GapMetrics {
                total_messages: 2,
                user_messages: 1,
                ai_messages: 1,
                questions_asked: 2,
                average_message_length: 30.0,
            },
            severity_breakdown: SeverityBreakdown { high: 1, medium: 1, low: 0 },
            gaps: vec![
                Gap {
                    kind: "missing_context".into(),
                    severity: Severity::Medium,
                    description: "Conversation lacks sufficient context".into(),
                    suggestion: "Provide more background information".into(),
                },
                Gap {
                    kind: "unanswered_questions".into(),
                    severity: Severity::High,
                    description: "More questions asked than answered".into(),
                    suggestion: "Review responses".into(),
                }
            ],
            suggestions: vec!["Provide more background information".into(), "Review responses".into()],
            error: None,
        }
    }

    #[tokio::test]
    async fn missing_conversation_sends_nothing() {
        let backend = Arc::new(FakeBackend::new().with_gap_report(report()));
        let mut panel = GapPanel::Idle;

        let effects = client(&backend).fetch(None, &mut panel).await;

        assert_eq!(effects.len(), 1);
        assert_eq!(panel, GapPanel::Idle);
        assert_eq!(backend.calls(), 0);

        let effects = client(&backend).fetch(Some("../etc passwd"), &mut panel).await;

        assert_eq!(effects, vec![Effect::warning("Conversation ID contains invalid characters")]);
        assert_eq!(panel, GapPanel::Idle);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn report_replaces_loading_panel() {
        let backend = Arc::new(FakeBackend::new().with_gap_report(report()));
        let mut panel = GapPanel::Idle;

        let effects = client(&backend).fetch(Some("conv_1"), &mut panel).await;

        assert!(effects.is_empty());
        assert_eq!(panel, GapPanel::Report(report()));
    }

    #[tokio::test]
    async fn failure_never_leaves_the_panel_loading() {
        let backend = Arc::new(FakeBackend::new());
        let mut panel = GapPanel::Idle;

        let effects = client(&backend).fetch(Some("conv_1"), &mut panel).await;

        assert_eq!(effects, vec![Effect::error("Gap analysis failed")]);
        assert!(matches!(panel, GapPanel::Error(_)));

        let errored = GapAnalysisReport {
            status: Some("error".into()),
            error: Some("database offline".into()),
            ..GapAnalysisReport::default()
        };
        let backend = Arc::new(FakeBackend::new().with_gap_report(errored));
        client(&backend).fetch(Some("conv_1"), &mut panel).await;
        assert_eq!(panel, GapPanel::Error("database offline".into()));
    }

    #[test]
    fn report_rendering_keeps_gap_and_suggestion_order() {
        let text = render_report(&report());
        assert!(text.starts_with("Completeness: 55/100 [######----]\n"));
        assert!(text.contains("Severity: 1 high, 1 medium, 0 low"));
        let context = text.find("[MEDIUM] missing_context").unwrap();
        let unanswered = text.find("[HIGH] unanswered_questions").unwrap();
        assert!(context < unanswered);
        assert!(text.contains("\nSuggestions:\n  - Provide more background information\n  - Review responses\n"));
    }

    #[tokio::test]
    async fn overview_is_fetched_and_rendered() {
        let overview = OverallGapAnalysis {
            status: "analyzed".into(),
            total_conversations: 3,
            analyzed_conversations: 3,
            total_gaps_found: 4,
            average_completeness_score: 71.67,
            common_gaps: vec![GapFrequency { kind: "no_followup".into(), frequency: 2 }],
            error: None,
        };
        let backend = Arc::new(FakeBackend::new().with_overview(overview.clone()));

        let fetched = client(&backend).fetch_overview().await.unwrap();

        assert_eq!(fetched, overview);
        let text = render_overview(&fetched);
        assert!(text.contains("Analyzed 3 of 3 conversations"));
        assert!(text.contains("  no_followup (2)"));
    }
}
