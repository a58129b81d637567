//! Cohere v1 REST provider.
//!
//! Talks to three endpoints: `/embed`, `/summarize` and `/generate`. Requests
//! are issued one at a time and never retried; any non-2xx status or missing
//! response field becomes an `LlmError`.

use super::{InputType, ModelProvider};
use crate::config::ProviderConfig;
use crate::error::LlmError;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

/// Cohere provider for embeddings, summaries and generation.
pub struct CohereProvider {
    client: Client,
    base_url: String,
    api_key: String,
    embed_model: String,
    generate_model: String,
    generate_max_tokens: u32,
    summary_length: String,
    summary_format: String,
    timeout_secs: Option<u64>,
}

impl std::fmt::Debug for CohereProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CohereProvider")
            .field("base_url", &self.base_url)
            .field("embed_model", &self.embed_model)
            .field("generate_model", &self.generate_model)
            .finish_non_exhaustive()
    }
}

impl CohereProvider {
    /// Create a new provider with an already resolved API key.
    pub fn new(config: &ProviderConfig, api_key: String) -> Result<Self, LlmError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| LlmError::Connection {
            message: format!("Failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            embed_model: config.embed_model.clone(),
            generate_model: config.generate_model.clone(),
            generate_max_tokens: config.generate_max_tokens,
            summary_length: config.summary_length.clone(),
            summary_format: config.summary_format.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn embed_body(&self, text: &str, input_type: InputType) -> Value {
        json!({
            "texts": [text],
            "model": self.embed_model,
            "input_type": input_type.as_str(),
        })
    }

    fn summarize_body(&self, text: &str) -> Value {
        json!({
            "text": text,
            "length": self.summary_length,
            "format": self.summary_format,
        })
    }

    fn generate_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.generate_model,
            "prompt": prompt,
            "max_tokens": self.generate_max_tokens,
        })
    }

    /// POST `body` to `{base_url}/{endpoint}` and return the parsed JSON reply.
    async fn post(&self, endpoint: &str, body: &Value) -> Result<Value, LlmError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(url = %url, "Sending Cohere request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let response_body = response.text().await.map_err(|e| LlmError::ApiRequest {
            message: format!("Failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            return Err(Self::map_http_error(status, &headers, &response_body));
        }

        serde_json::from_str(&response_body).map_err(|e| LlmError::ResponseParse {
            message: format!("Invalid JSON: {}", e),
        })
    }

    fn map_transport_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout {
                timeout_secs: self.timeout_secs.unwrap_or(0),
            }
        } else if err.is_connect() {
            LlmError::Connection {
                message: err.to_string(),
            }
        } else {
            LlmError::ApiRequest {
                message: format!("Request failed: {}", err),
            }
        }
    }

    /// Map an HTTP status code to the appropriate LlmError.
    fn map_http_error(status: reqwest::StatusCode, headers: &HeaderMap, body: &str) -> LlmError {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("message")?.as_str().map(str::to_string))
            .unwrap_or_else(|| body.to_string());

        match status.as_u16() {
            401 | 403 => {
                debug!(body = %body, "Authentication failed ({})", status);
                LlmError::AuthFailed {
                    provider: "cohere".to_string(),
                }
            }
            429 => {
                let retry_after_secs = headers
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.trim().parse::<u64>().ok())
                    .unwrap_or(5);
                LlmError::RateLimited { retry_after_secs }
            }
            s if s >= 500 => LlmError::ApiRequest {
                message: format!("Server error ({}): {}", status, detail),
            },
            _ => LlmError::ApiRequest {
                message: format!("HTTP {}: {}", status, detail),
            },
        }
    }

    fn parse_embedding(body: &Value) -> Result<Vec<f32>, LlmError> {
        // v1 returns a bare list of lists unless `embedding_types` was requested,
        // in which case the vectors sit under `embeddings.float`.
        let embeddings = body
            .get("embeddings")
            .map(|e| e.get("float").unwrap_or(e))
            .and_then(Value::as_array)
            .ok_or_else(|| LlmError::ResponseParse {
                message: "response has no 'embeddings' array".into(),
            })?;
        let first = embeddings
            .first()
            .and_then(Value::as_array)
            .ok_or_else(|| LlmError::ResponseParse {
                message: "response 'embeddings' is empty".into(),
            })?;
        first
            .iter()
            .map(|x| {
                x.as_f64().map(|f| f as f32).ok_or_else(|| LlmError::ResponseParse {
                    message: format!("non-numeric embedding component: {}", x),
                })
            })
            .collect()
    }

    fn parse_summary(body: &Value) -> Result<String, LlmError> {
        body.get("summary")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| LlmError::ResponseParse {
                message: "response has no 'summary' field".into(),
            })
    }

    fn parse_generation(body: &Value) -> Result<String, LlmError> {
        body.get("generations")
            .and_then(Value::as_array)
            .and_then(|g| g.first())
            .and_then(|g| g.get("text"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| LlmError::ResponseParse {
                message: "response has no 'generations[0].text'".into(),
            })
    }
}

#[async_trait]
impl ModelProvider for CohereProvider {
    async fn embed(&self, text: &str, input_type: InputType) -> Result<Vec<f32>, LlmError> {
        let body = self.post("embed", &self.embed_body(text, input_type)).await?;
        let embedding = Self::parse_embedding(&body)?;
        debug!(
            input_type = %input_type,
            dimensions = embedding.len(),
            "Received embedding"
        );
        Ok(embedding)
    }

    async fn summarize(&self, text: &str) -> Result<String, LlmError> {
        let body = self.post("summarize", &self.summarize_body(text)).await?;
        Self::parse_summary(&body)
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let body = self.post("generate", &self.generate_body(prompt)).await?;
        Self::parse_generation(&body)
    }

    fn provider_name(&self) -> &str {
        "cohere"
    }
}
