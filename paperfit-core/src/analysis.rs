//! The analysis pipeline: extract, embed, score, summarize, mine citations,
//! generate a literature-review paragraph, and render the report.
//!
//! Every step runs in sequence and the first failure aborts the run. The
//! `Analyzer` holds only immutable collaborators built at startup, so one
//! instance can be shared behind an `Arc`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use crate::citations::extract_citations;
use crate::config::AnalysisConfig;
use crate::error::{ExtractError, Result};
use crate::extract::{TextExtractor, truncate_chars};
use crate::providers::{InputType, ModelProvider};
use crate::report::{ReportRenderer, layout_report};
use crate::review::generate_lit_review;
use crate::similarity::cosine_similarity;

/// Where the thesis text comes from.
#[derive(Debug, Clone)]
pub enum ThesisSource {
    /// A topic typed by the user.
    Topic(String),
    /// An uploaded thesis document.
    Document(Vec<u8>),
}

/// Everything shown to the user for one paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Cosine similarity between the thesis and the paper.
    pub score: f64,
    /// Whether the score is at or below the low-relevance threshold.
    pub low_score: bool,
    /// Bullet-point summary of the paper.
    pub summary: String,
    /// Up to `max_citations` citation tokens in document order.
    pub citations: Vec<String>,
    /// Generated literature-review paragraph.
    pub review: String,
}

/// An analysis together with its rendered report.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub analysis: Analysis,
    pub pdf: Vec<u8>,
    /// MIME type of `pdf`, as reported by the renderer.
    pub content_type: &'static str,
}

/// Whether `score` should carry the low-relevance warning.
pub fn is_low_score(score: f64, threshold: f64) -> bool {
    score <= threshold
}

/// Runs the analysis pipeline.
pub struct Analyzer {
    provider: Arc<dyn ModelProvider>,
    extractor: Arc<dyn TextExtractor>,
    renderer: Arc<dyn ReportRenderer>,
    analysis: AnalysisConfig,
}

impl Analyzer {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        extractor: Arc<dyn TextExtractor>,
        renderer: Arc<dyn ReportRenderer>,
        analysis: AnalysisConfig,
    ) -> Self {
        Self {
            provider,
            extractor,
            renderer,
            analysis,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Run the whole pipeline, including PDF rendering.
    pub async fn run(&self, paper: Vec<u8>, thesis: ThesisSource) -> Result<AnalysisReport> {
        let request_id = Uuid::new_v4();
        async {
            let analysis = self.analyze(paper, thesis).await?;
            let layout = layout_report(&analysis);
            let pdf = self.renderer.render(&layout)?;
            info!(
                score = analysis.score,
                low_score = analysis.low_score,
                citations = analysis.citations.len(),
                pages = layout.page_count(),
                "Analysis complete"
            );
            Ok(AnalysisReport {
                analysis,
                pdf,
                content_type: self.renderer.content_type(),
            })
        }
        .instrument(info_span!("analysis", request_id = %request_id))
        .await
    }

    /// Run every step except rendering.
    pub async fn analyze(&self, paper: Vec<u8>, thesis: ThesisSource) -> Result<Analysis> {
        let paper_text = self.extract("paper", paper).await?;
        debug!(chars = paper_text.chars().count(), "Extracted paper text");

        let thesis_text = match thesis {
            ThesisSource::Topic(topic) => topic,
            ThesisSource::Document(bytes) => self.extract("thesis", bytes).await?,
        };
        debug!(chars = thesis_text.chars().count(), "Resolved thesis text");

        let thesis_vec = self
            .provider
            .embed(&thesis_text, InputType::SearchQuery)
            .await?;
        let paper_vec = self
            .provider
            .embed(
                truncate_chars(&paper_text, self.analysis.paper_embed_chars),
                InputType::SearchDocument,
            )
            .await?;

        let score = cosine_similarity(&thesis_vec, &paper_vec);
        let low_score = is_low_score(score, self.analysis.low_score_threshold);
        debug!(score, low_score, "Scored paper against thesis");

        let summary = self
            .provider
            .summarize(truncate_chars(&paper_text, self.analysis.summary_chars))
            .await?;
        debug!(chars = summary.len(), "Received summary");

        let citations = extract_citations(&paper_text, self.analysis.max_citations);
        debug!(count = citations.len(), "Extracted citations");

        let review = generate_lit_review(self.provider.as_ref(), &summary).await?;
        debug!(chars = review.len(), "Generated literature review");

        Ok(Analysis {
            score,
            low_score,
            summary,
            citations,
            review,
        })
    }

    /// Extract text on the blocking pool; PDF parsing is CPU-bound and may panic
    /// on hostile input.
    async fn extract(&self, name: &'static str, bytes: Vec<u8>) -> Result<String> {
        let extractor = Arc::clone(&self.extractor);
        let text = tokio::task::spawn_blocking(move || extractor.extract(name, &bytes))
            .await
            .map_err(|e| ExtractError::Malformed {
                name: name.to_string(),
                message: e.to_string(),
            })??;
        Ok(text)
    }
}
