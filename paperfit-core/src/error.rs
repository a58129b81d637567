//! Error types for the paperfit core library.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering text extraction, the hosted model API, report rendering, and
//! configuration.

use std::path::PathBuf;

/// Top-level error type for the paperfit core library.
#[derive(Debug, thiserror::Error)]
pub enum PaperfitError {
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from reading text out of an uploaded document.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Document is empty: {name}")]
    Empty { name: String },

    #[error("Could not extract text from {name}: {message}")]
    Malformed { name: String, message: String },
}

/// Errors from hosted model interactions.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {message}")]
    ApiRequest { message: String },

    #[error("API response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Provider connection failed: {message}")]
    Connection { message: String },
}

/// Errors from laying out or painting the PDF report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("No usable font family '{family}' found in {searched:?}")]
    FontNotFound {
        family: String,
        searched: Vec<PathBuf>,
    },

    #[error("Failed to render PDF: {message}")]
    Render { message: String },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Environment variable not set: {var}")]
    EnvVarMissing { var: String },
}

/// A type alias for results using the top-level `PaperfitError`.
pub type Result<T> = std::result::Result<T, PaperfitError>;
