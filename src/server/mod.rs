//! HTTP API Surface
//!
//! Thin axum layer over the agent pipeline:
//!
//! - `GET /health` — liveness probe
//! - `POST /chat` — run one message through the pipeline
//!
//! Only the three request-fatal pipeline errors cross this boundary, as an
//! `{error, raw_output?, details}` body: 502 when the model service is
//! unreachable, 422 when its output is malformed or non-conformant.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::agent::schema::Action;
use crate::agent::{Agent, AgentError};
use crate::executor::ExecutionResult;

/// Inbound chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message
    pub message: String,
}

/// Successful chat reply body
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: ResponseBody,
}

/// Validated response plus the per-action execution outcomes
#[derive(Debug, Serialize)]
pub struct ResponseBody {
    pub message: String,
    pub actions: Vec<Action>,
    pub execution_results: Vec<ExecutionResult>,
}

/// Error reply body for request-fatal pipeline failures
#[derive(Debug, Serialize)]
pub struct ErrorReply {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
    pub details: String,
}

/// Build the application router around a shared agent.
pub fn router(agent: Arc<Agent>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(agent)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, agent: Arc<Agent>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("steward listening on http://{}", addr);
    axum::serve(listener, router(agent)).await?;
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn chat_handler(
    State(agent): State<Arc<Agent>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    match agent.handle_message(&request.message).await {
        Ok(outcome) => Json(ChatReply {
            response: ResponseBody {
                message: outcome.response.message,
                actions: outcome.response.actions,
                execution_results: outcome.execution_results,
            },
        })
        .into_response(),
        Err(err) => {
            let (status, kind) = match err {
                AgentError::Connectivity(_) => (StatusCode::BAD_GATEWAY, "LLM unavailable"),
                AgentError::MalformedOutput { .. } | AgentError::SchemaViolation { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "Invalid LLM output")
                }
            };
            let body = ErrorReply {
                error: kind.to_string(),
                raw_output: err.raw_output().map(str::to_string),
                details: err.to_string(),
            };
            (status, Json(body)).into_response()
        }
    }
}
