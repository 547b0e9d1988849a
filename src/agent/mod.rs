//! Agent Orchestration Pipeline
//!
//! The [`Agent`] composes both memory tiers into a prompt, invokes the
//! model, recovers and validates a structured response, updates memory,
//! and dispatches the validated actions to the remote executor.
//!
//! Per-request flow:
//!
//! 1. append the user turn to short-term memory
//! 2. recall up to [`RECALL_TOP_K`] long-term records for the message
//! 3. assemble the prompt and invoke the model (fatal on failure — the
//!    model is mandatory, unlike long-term memory)
//! 4. extract a JSON payload from the raw output (fatal on failure)
//! 5. default-fill devices, then validate the schema (fatal on failure)
//! 6. append the assistant turn; best-effort remember both messages
//! 7. dispatch actions (degrades to synthetic failure results)
//!
//! Fatal errors surface as [`AgentError`] with the raw model output
//! attached where it exists. A failed request never mutates memory beyond
//! the initial user-turn append.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::executor::{ExecutionResult, ExecutorClient};
use crate::llm::OllamaClient;
use crate::memory::{LongTermMemory, Role, ShortTermMemory};

pub mod extract;
pub mod prompt;
pub mod schema;

use schema::AgentResponse;

/// How many long-term records are recalled per request
const RECALL_TOP_K: usize = 3;

/// How many short-term turns go into the prompt
const CONTEXT_WINDOW_TURNS: usize = 10;

/// Request-fatal pipeline errors. Everything else degrades in place.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model service could not be reached or answered unusably
    #[error("LLM unavailable: {0}")]
    Connectivity(String),

    /// No JSON object could be recovered from the model output
    #[error("Could not parse JSON from LLM output")]
    MalformedOutput {
        /// Raw model text, for caller-side debugging
        raw: String,
    },

    /// The recovered payload does not match the response contract
    #[error("Invalid LLM output: {details}")]
    SchemaViolation {
        /// Raw model text, for caller-side debugging
        raw: String,
        /// What was missing or mistyped
        details: String,
    },
}

impl AgentError {
    /// The raw model output, when the pipeline got far enough to have one.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            AgentError::Connectivity(_) => None,
            AgentError::MalformedOutput { raw } => Some(raw),
            AgentError::SchemaViolation { raw, .. } => Some(raw),
        }
    }
}

/// Successful pipeline outcome
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// The validated model response
    pub response: AgentResponse,

    /// One result per dispatched action, in submission order
    pub execution_results: Vec<ExecutionResult>,
}

/// The request orchestrator. One instance is shared across requests;
/// every collaborator is injected.
pub struct Agent {
    llm: Arc<OllamaClient>,
    short_term: ShortTermMemory,
    long_term: LongTermMemory,
    executor: ExecutorClient,
    default_device: String,
}

impl Agent {
    pub fn new(
        llm: Arc<OllamaClient>,
        short_term: ShortTermMemory,
        long_term: LongTermMemory,
        executor: ExecutorClient,
        default_device: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            short_term,
            long_term,
            executor,
            default_device: default_device.into(),
        }
    }

    /// Run the full pipeline for one user message.
    pub async fn handle_message(&self, message: &str) -> Result<ChatOutcome, AgentError> {
        self.short_term.append(Role::User, message);

        let recalled = self.long_term.recall(message, RECALL_TOP_K).await;
        let context = self.short_term.recent_context(CONTEXT_WINDOW_TURNS);
        let prompt = prompt::build_prompt(&context, &recalled, message);

        let raw_output = self
            .llm
            .generate(&prompt)
            .await
            .map_err(|e| AgentError::Connectivity(e.to_string()))?;

        let payload = extract::extract_json(&raw_output).map_err(|e| {
            tracing::warn!("model output was not parseable JSON");
            AgentError::MalformedOutput { raw: e.raw }
        })?;

        let response = schema::validate(payload, &self.default_device).map_err(|e| {
            tracing::warn!("model output failed schema validation: {}", e.details);
            AgentError::SchemaViolation {
                raw: raw_output.clone(),
                details: e.details,
            }
        })?;

        self.short_term.append(Role::Assistant, &response.message);
        self.long_term
            .remember(message, turn_metadata(Role::User))
            .await;
        self.long_term
            .remember(&response.message, turn_metadata(Role::Assistant))
            .await;

        tracing::info!(
            actions = response.actions.len(),
            "dispatching validated actions"
        );
        let execution_results = self.executor.dispatch(&response.actions).await;

        Ok(ChatOutcome {
            response,
            execution_results,
        })
    }

    /// The short-term conversation log
    pub fn short_term(&self) -> &ShortTermMemory {
        &self.short_term
    }

    /// The long-term memory tier
    pub fn long_term(&self) -> &LongTermMemory {
        &self.long_term
    }
}

fn turn_metadata(role: Role) -> HashMap<String, Value> {
    // Role serializes to its lowercase wire name
    HashMap::from([("role".to_string(), json!(role))])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_raw_output_exposure() {
        let err = AgentError::Connectivity("refused".to_string());
        assert!(err.raw_output().is_none());

        let err = AgentError::MalformedOutput {
            raw: "not json".to_string(),
        };
        assert_eq!(err.raw_output(), Some("not json"));

        let err = AgentError::SchemaViolation {
            raw: "{}".to_string(),
            details: "missing field `message`".to_string(),
        };
        assert_eq!(err.raw_output(), Some("{}"));
        assert!(err.to_string().contains("missing field `message`"));
    }

    #[test]
    fn test_turn_metadata_records_role() {
        let metadata = turn_metadata(Role::Assistant);
        assert_eq!(metadata["role"], "assistant");
    }
}
