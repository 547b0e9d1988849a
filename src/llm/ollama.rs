//! Ollama HTTP Client
//!
//! Thin client over the Ollama REST API. Two endpoints are used:
//!
//! - `POST /api/generate` with `{model, prompt, stream: false}`, returning
//!   `{response: "..."}` — non-streaming completion.
//! - `POST /api/embed` with `{model, input}`, returning
//!   `{embeddings: [[f32, ...], ...]}` — text embeddings.
//!
//! Every call carries an explicit timeout so a stalled model can never
//! wedge the request pipeline. Transport failures are mapped to the
//! [`LlmError`] taxonomy (timeout, connect, other network, parse).

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::{LlmError, Result};

/// Default timeout for completion and embedding calls
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for an Ollama-shaped model service
#[derive(Debug, Clone)]
pub struct OllamaClient {
    /// Base URL for the Ollama API (typically http://localhost:11434)
    base_url: String,

    /// Completion model name (e.g. "llama3.1")
    model: String,

    /// Embedding model name (e.g. "nomic-embed-text")
    embedding_model: String,

    /// HTTP client for API requests
    client: Client,
}

impl OllamaClient {
    /// Create a new client with the default 60s per-call timeout.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self::with_timeout(base_url, model, embedding_model, DEFAULT_TIMEOUT)
    }

    /// Create a new client with an explicit per-call timeout.
    ///
    /// Mainly useful in tests, where waiting out the full default timeout
    /// against a stalled mock server is not an option.
    pub fn with_timeout(
        base_url: impl Into<String>,
        model: impl Into<String>,
        embedding_model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            embedding_model: embedding_model.into(),
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Generate a completion for `prompt`.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            "ollama generate request"
        );

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let url = format!("{}/api/generate", self.base_url);
        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        tracing::info!(
            elapsed_s = format!("{:.1}", start.elapsed().as_secs_f64()),
            "ollama response received"
        );

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::ProviderUnavailable(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(format!("Failed to parse Ollama response: {}", e)))?;

        Ok(body.response)
    }

    /// Compute an embedding vector for `input`.
    ///
    /// A response body without an `embeddings` list, with an empty list, or
    /// carrying an `error` field all count as failures.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: self.embedding_model.clone(),
            input: input.to_string(),
        };

        let url = format!("{}/api/embed", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::ProviderUnavailable(format!(
                "Ollama embed API error ({}): {}",
                status, error_text
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(format!("Failed to parse embed response: {}", e)))?;

        if let Some(err) = body.get("error") {
            return Err(LlmError::ProviderUnavailable(format!(
                "Ollama embed error: {}",
                err
            )));
        }

        let embedding = body
            .get("embeddings")
            .and_then(Value::as_array)
            .and_then(|vectors| vectors.first())
            .and_then(Value::as_array)
            .map(|v| {
                v.iter()
                    .filter_map(Value::as_f64)
                    .map(|f| f as f32)
                    .collect::<Vec<f32>>()
            })
            .ok_or_else(|| {
                LlmError::ParseError("embed response missing embeddings".to_string())
            })?;

        if embedding.is_empty() {
            return Err(LlmError::ParseError("embed response was empty".to_string()));
        }

        Ok(embedding)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout
        } else if e.is_connect() {
            LlmError::ProviderUnavailable(format!(
                "Cannot connect to Ollama at {}. Is Ollama running?",
                self.base_url
            ))
        } else {
            LlmError::NetworkError(e.to_string())
        }
    }
}

/// Ollama completion request format
#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// Ollama completion response format
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama embedding request format
#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    input: String,
}
