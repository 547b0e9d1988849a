//! LLM Provider Client
//!
//! Steward talks to an Ollama-shaped HTTP API for two things: free-text
//! completion (the conversational brain of the pipeline) and text
//! embeddings (used by the long-term memory tier). Both live behind
//! [`ollama::OllamaClient`].
//!
//! The completion call is mandatory for a request — its failures are fatal
//! and bubble up as typed [`LlmError`] values. The embedding call is not:
//! callers in the memory tier absorb embedding failures and degrade.

use thiserror::Error;

pub mod ollama;

pub use ollama::OllamaClient;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur while talking to the model service
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LlmError::ProviderUnavailable("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));

        let err = LlmError::Timeout;
        assert_eq!(err.to_string(), "Timeout");
    }
}
