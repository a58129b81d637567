//! Hosted model provider implementations.
//!
//! Defines the `ModelProvider` trait covering the three hosted calls the
//! pipeline makes (embed, summarize, generate) and provides:
//! - `CohereProvider` for the Cohere v1 REST API
//! - `MockModelProvider` for tests and offline demos
//!
//! Use `create_provider()` to build the provider from configuration once at
//! startup and pass it to whichever component needs it.

pub mod cohere;

use crate::config::ProviderConfig;
use crate::error::{ConfigError, LlmError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

pub use cohere::CohereProvider;

/// Role tag sent with an embedding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// The short text being searched for (the thesis).
    SearchQuery,
    /// The text being searched over (the paper).
    SearchDocument,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::SearchQuery => "search_query",
            InputType::SearchDocument => "search_document",
        }
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for hosted embedding and generation providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Embed a single text and return its vector.
    async fn embed(&self, text: &str, input_type: InputType) -> Result<Vec<f32>, LlmError>;

    /// Summarize `text` as bullet points.
    async fn summarize(&self, text: &str) -> Result<String, LlmError>;

    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Return the provider name for logging.
    fn provider_name(&self) -> &str;
}

/// Resolve the API key for the provider.
///
/// An inline `api_key` wins; otherwise the environment variable named by
/// `api_key_env` is read. Empty values count as missing.
pub fn resolve_api_key(config: &ProviderConfig) -> Result<String, ConfigError> {
    if let Some(key) = config.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
        return Ok(key.clone());
    }
    std::env::var(&config.api_key_env)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ConfigError::EnvVarMissing {
            var: config.api_key_env.clone(),
        })
}

/// Create the hosted model provider from configuration.
///
/// Fails when no credential can be resolved; callers treat that as fatal.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn ModelProvider>, ConfigError> {
    let api_key = resolve_api_key(config)?;
    let provider = CohereProvider::new(config, api_key).map_err(|e| ConfigError::Invalid {
        message: e.to_string(),
    })?;
    Ok(Arc::new(provider))
}

/// A provider that returns canned values, for tests and offline runs.
///
/// Embeddings are looked up by exact text; unknown texts get the default
/// vector. Every call is recorded so tests can assert on what was sent.
pub struct MockModelProvider {
    default_embedding: Vec<f32>,
    embeddings: Mutex<Vec<(String, Vec<f32>)>>,
    summary: String,
    generation: String,
    fail_with: Mutex<Option<String>>,
    calls: Mutex<Vec<MockCall>>,
}

/// One call received by `MockModelProvider`.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Embed { text: String, input_type: InputType },
    Summarize { text: String },
    Generate { prompt: String },
}

impl MockModelProvider {
    pub fn new() -> Self {
        Self {
            default_embedding: vec![0.6, 0.8, 0.0],
            embeddings: Mutex::new(Vec::new()),
            summary: "- The paper studies the topic.\n- It reports results.".to_string(),
            generation: "Prior work has examined this topic in depth.".to_string(),
            fail_with: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Set the summary returned by `summarize`.
    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = summary.to_string();
        self
    }

    /// Set the text returned by `generate`.
    pub fn with_generation(mut self, text: &str) -> Self {
        self.generation = text.to_string();
        self
    }

    /// Return `embedding` whenever `text` is embedded.
    pub fn with_embedding(self, text: &str, embedding: Vec<f32>) -> Self {
        self.embeddings
            .lock()
            .unwrap()
            .push((text.to_string(), embedding));
        self
    }

    /// Make every subsequent call fail with an `ApiRequest` error.
    pub fn fail_with(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: MockCall) -> Result<(), LlmError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_with.lock().unwrap().as_ref() {
            Some(message) => Err(LlmError::ApiRequest {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for MockModelProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelProvider for MockModelProvider {
    async fn embed(&self, text: &str, input_type: InputType) -> Result<Vec<f32>, LlmError> {
        self.record(MockCall::Embed {
            text: text.to_string(),
            input_type,
        })?;
        let embeddings = self.embeddings.lock().unwrap();
        Ok(embeddings
            .iter()
            .find(|(t, _)| t == text)
            .map(|(_, e)| e.clone())
            .unwrap_or_else(|| self.default_embedding.clone()))
    }

    async fn summarize(&self, text: &str) -> Result<String, LlmError> {
        self.record(MockCall::Summarize {
            text: text.to_string(),
        })?;
        Ok(self.summary.clone())
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.record(MockCall::Generate {
            prompt: prompt.to_string(),
        })?;
        Ok(self.generation.clone())
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
