//! Interaction controller: validates the user's inputs, runs the pipeline and
//! folds the result into one of three outcomes the front ends can show.

use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::{Analysis, AnalysisReport, Analyzer, ThesisSource};
use crate::report::{
    CITATIONS_HEADING, LOW_SCORE_WARNING, REVIEW_HEADING, SUMMARY_HEADING, numbered_list,
};

/// Prefix of the single user-facing failure message.
pub const FAILURE_PREFIX: &str = "Something went wrong";
/// Shown in place of the citation list when none survived filtering.
pub const NO_CITATIONS_NOTICE: &str = "No clear citations found.";

/// Raw inputs as collected from a form or the command line.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub paper: Option<Vec<u8>>,
    pub thesis_topic: Option<String>,
    pub thesis_file: Option<Vec<u8>>,
}

impl AnalysisRequest {
    /// The paper and thesis to analyze, or `None` when a required input is
    /// missing. Empty uploads and blank topics count as missing; a topic wins
    /// over a thesis file and is embedded exactly as typed.
    pub fn validated(self) -> Option<(Vec<u8>, ThesisSource)> {
        let paper = self.paper.filter(|p| !p.is_empty())?;
        let topic = self.thesis_topic.filter(|t| !t.trim().is_empty());
        let thesis = match (topic, self.thesis_file.filter(|f| !f.is_empty())) {
            (Some(topic), _) => ThesisSource::Topic(topic),
            (None, Some(file)) => ThesisSource::Document(file),
            (None, None) => return None,
        };
        Some((paper, thesis))
    }
}

/// What the user sees after pressing "analyze".
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Required inputs were missing; nothing ran.
    Idle,
    /// The pipeline finished.
    Completed(AnalysisReport),
    /// The pipeline aborted; the message is ready to display.
    Failed(String),
}

impl Outcome {
    pub fn is_idle(&self) -> bool {
        matches!(self, Outcome::Idle)
    }
}

/// Validate `request` and run the pipeline once.
pub async fn handle(analyzer: &Analyzer, request: AnalysisRequest) -> Outcome {
    let Some((paper, thesis)) = request.validated() else {
        return Outcome::Idle;
    };
    info!(paper_bytes = paper.len(), "Starting analysis");
    match analyzer.run(paper, thesis).await {
        Ok(report) => Outcome::Completed(report),
        Err(e) => {
            warn!(error = %e, "Analysis failed");
            Outcome::Failed(format!("{}: {}", FAILURE_PREFIX, e))
        }
    }
}

/// The live view, flattened into display-ready pieces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveView {
    pub score: String,
    pub warning: Option<&'static str>,
    pub summary: String,
    pub citations: Vec<String>,
    pub review: String,
}

impl LiveView {
    pub fn from_analysis(analysis: &Analysis) -> Self {
        Self {
            score: format!("{:.2}", analysis.score),
            warning: analysis.low_score.then_some(LOW_SCORE_WARNING),
            summary: analysis.summary.clone(),
            citations: analysis.citations.clone(),
            review: analysis.review.clone(),
        }
    }

    /// Plain-text rendering for terminals.
    pub fn to_text(&self) -> String {
        let mut out = format!("Relevance Score: {}\n", self.score);
        if let Some(warning) = self.warning {
            out.push_str(warning);
            out.push('\n');
        }
        out.push_str(&format!("\n{}\n{}\n", SUMMARY_HEADING, self.summary.trim_end()));
        out.push_str(&format!("\n{}\n", CITATIONS_HEADING));
        if self.citations.is_empty() {
            out.push_str(NO_CITATIONS_NOTICE);
        } else {
            out.push_str(&numbered_list(&self.citations));
        }
        out.push_str(&format!("\n\nSample {}\n{}\n", REVIEW_HEADING, self.review));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::is_low_score;
    use crate::config::AnalysisConfig;
    use crate::extract::PlainTextExtractor;
    use crate::providers::MockModelProvider;
    use crate::report::PlainTextRenderer;
    use std::sync::Arc;

    fn analysis(score: f64, low: bool, citations: Vec<String>) -> Analysis {
        Analysis {
            score,
            low_score: low,
            summary: "- one".into(),
            citations,
            review: "Paragraph.".into(),
        }
    }

    #[test]
    fn test_validated_requires_paper() {
        let req = AnalysisRequest {
            paper: None,
            thesis_topic: Some("topic".into()),
            thesis_file: None,
        };
        assert!(req.validated().is_none());
    }

    #[test]
    fn test_validated_requires_thesis() {
        let req = AnalysisRequest {
            paper: Some(b"pdf".to_vec()),
            thesis_topic: Some("   ".into()),
            thesis_file: Some(Vec::new()),
        };
        assert!(req.validated().is_none());
    }

    #[test]
    fn test_validated_topic_wins() {
        let req = AnalysisRequest {
            paper: Some(b"pdf".to_vec()),
            thesis_topic: Some(" climate ".into()),
            thesis_file: Some(b"thesis".to_vec()),
        };
        match req.validated() {
            Some((_, ThesisSource::Topic(t))) => assert_eq!(t, " climate "),
            other => panic!("Expected topic, got {:?}", other),
        }
    }

    #[test]
    fn test_validated_thesis_file() {
        let req = AnalysisRequest {
            paper: Some(b"pdf".to_vec()),
            thesis_topic: None,
            thesis_file: Some(b"thesis".to_vec()),
        };
        assert!(matches!(
            req.validated(),
            Some((_, ThesisSource::Document(_)))
        ));
    }

    #[tokio::test]
    async fn test_handle_idle_makes_no_calls() {
        let mock = Arc::new(MockModelProvider::new());
        let analyzer = Analyzer::new(
            mock.clone(),
            Arc::new(PlainTextExtractor),
            Arc::new(PlainTextRenderer),
            AnalysisConfig::default(),
        );
        let outcome = handle(
            &analyzer,
            AnalysisRequest {
                paper: Some(b"paper".to_vec()),
                ..Default::default()
            },
        )
        .await;
        assert!(outcome.is_idle());
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_handle_failure_message() {
        let mock = Arc::new(MockModelProvider::new());
        mock.fail_with("boom");
        let analyzer = Analyzer::new(
            mock,
            Arc::new(PlainTextExtractor),
            Arc::new(PlainTextRenderer),
            AnalysisConfig::default(),
        );
        let outcome = handle(
            &analyzer,
            AnalysisRequest {
                paper: Some(b"paper".to_vec()),
                thesis_topic: Some("t".into()),
                thesis_file: None,
            },
        )
        .await;
        match outcome {
            Outcome::Failed(msg) => {
                assert!(msg.starts_with("Something went wrong: "));
                assert!(msg.contains("boom"));
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_live_view_warning_threshold() {
        let view = |score: f64| {
            let low = is_low_score(score, AnalysisConfig::default().low_score_threshold);
            LiveView::from_analysis(&analysis(score, low, vec![]))
        };
        assert!(view(0.29).warning.is_some());
        assert!(view(0.30).warning.is_some());
        assert!(view(0.31).warning.is_none());
    }

    #[test]
    fn test_live_view_text_no_citations() {
        let text = LiveView::from_analysis(&analysis(0.5, false, vec![])).to_text();
        assert!(text.starts_with("Relevance Score: 0.50\n"));
        assert!(text.contains(NO_CITATIONS_NOTICE));
        assert!(text.contains("Sample Literature Review Paragraph"));
    }

    #[test]
    fn test_live_view_text_numbered_citations() {
        let view = LiveView::from_analysis(&analysis(
            0.2,
            true,
            vec!["[1]".into(), "(Jones, 2019)".into()],
        ));
        let text = view.to_text();
        assert!(text.contains("1. [1]\n2. (Jones, 2019)"));
        assert!(text.contains(LOW_SCORE_WARNING));
    }
}
