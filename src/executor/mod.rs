//! Remote Action Executor Client
//!
//! Dispatches validated actions to the device execution agent as a single
//! `POST {actions: [...]}` call and relays the per-action results.
//!
//! A down executor is a partial-failure condition, not a pipeline-fatal
//! one: on any transport failure (connect error, timeout, non-2xx status,
//! unparseable body) the client synthesizes one failure result per
//! submitted action, preserving count and order, and never raises.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::agent::schema::Action;

/// Default timeout for an executor dispatch call
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one dispatched action, in submission order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionResult {
    /// Tool that was (or should have been) executed
    pub tool: String,

    /// Device it targeted
    pub device: String,

    /// "success" or a descriptive failure message
    pub status: String,

    /// Tool output; empty on failure
    pub output: String,
}

/// Client for the remote device execution agent
#[derive(Debug, Clone)]
pub struct ExecutorClient {
    /// Full endpoint URL, e.g. http://localhost:8081/execute
    endpoint: String,

    client: Client,
}

impl ExecutorClient {
    /// Create a client with the default 10s dispatch timeout.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit dispatch timeout.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Submit `actions` for execution.
    ///
    /// Empty input short-circuits to empty output without a network call.
    /// Always returns exactly one result per submitted action.
    pub async fn dispatch(&self, actions: &[Action]) -> Vec<ExecutionResult> {
        if actions.is_empty() {
            return Vec::new();
        }

        let request = ExecuteRequest {
            actions: actions.to_vec(),
        };

        match self.submit(&request).await {
            Ok(results) => results,
            Err(reason) => {
                tracing::warn!(
                    endpoint = %self.endpoint,
                    action_count = actions.len(),
                    "executor dispatch failed, synthesizing failure results: {}",
                    reason
                );
                actions
                    .iter()
                    .map(|a| ExecutionResult {
                        tool: a.tool.clone(),
                        device: a.device.clone(),
                        status: reason.clone(),
                        output: String::new(),
                    })
                    .collect()
            }
        }
    }

    async fn submit(&self, request: &ExecuteRequest) -> Result<Vec<ExecutionResult>, String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    format!("executor timed out at {}", self.endpoint)
                } else if e.is_connect() {
                    format!("cannot connect to executor at {}", self.endpoint)
                } else {
                    format!("executor request failed: {}", e)
                }
            })?;

        if !response.status().is_success() {
            return Err(format!("executor returned HTTP {}", response.status()));
        }

        let body: ExecuteResponse = response
            .json()
            .await
            .map_err(|e| format!("invalid executor response: {}", e))?;

        Ok(body.results)
    }
}

/// Wire format submitted to the executor
#[derive(Debug, Serialize)]
struct ExecuteRequest {
    actions: Vec<Action>,
}

/// Wire format returned by the executor
#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    results: Vec<ExecutionResult>,
}
