//! # Paperfit Core
//!
//! Core library for paperfit, a research-paper relevance checker.
//! Scores an uploaded paper against a thesis topic with hosted embeddings,
//! summarizes it, mines citation tokens, drafts a literature-review paragraph
//! and renders everything into a downloadable report.

pub mod analysis;
pub mod citations;
pub mod config;
pub mod controller;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod providers;
pub mod report;
pub mod review;
pub mod similarity;

// Re-export commonly used types at the crate root.
pub use analysis::{Analysis, AnalysisReport, Analyzer, ThesisSource};
pub use config::{AppConfig, load_config};
pub use controller::{AnalysisRequest, LiveView, Outcome};
pub use error::{PaperfitError, Result};
pub use extract::{PdfTextExtractor, PlainTextExtractor, TextExtractor};
pub use gateway::{GatewayState, SharedGateway};
pub use providers::{InputType, MockModelProvider, ModelProvider, create_provider};
pub use report::{GenPdfRenderer, PlainTextRenderer, ReportRenderer};

/// Crate version, reported by `/health` and `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
