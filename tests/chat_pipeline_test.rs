//! Integration tests for the chat orchestration pipeline
//!
//! Runs the full pipeline against wiremock stand-ins for the Ollama model
//! service and the device execution agent:
//! - happy path with device default-fill
//! - brace-span recovery of JSON embedded in prose
//! - malformed output and schema violations
//! - model timeout enforcement
//! - executor-down degradation

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use steward::agent::{Agent, AgentError};
use steward::executor::ExecutorClient;
use steward::llm::OllamaClient;
use steward::memory::{InMemoryVectorStore, LongTermMemory, ShortTermMemory};

const DEFAULT_DEVICE: &str = "MacBook Pro";

fn build_agent(ollama_uri: &str, executor_endpoint: &str) -> Agent {
    // Short timeouts keep failure-path tests fast
    let llm = Arc::new(OllamaClient::with_timeout(
        ollama_uri,
        "llama3.1",
        "nomic-embed-text",
        Duration::from_millis(500),
    ));
    let store = Arc::new(InMemoryVectorStore::new());
    let long_term = LongTermMemory::new(Arc::clone(&llm), store);

    Agent::new(
        llm,
        ShortTermMemory::new(),
        long_term,
        ExecutorClient::with_timeout(executor_endpoint, Duration::from_millis(500)),
        DEFAULT_DEVICE,
    )
}

async fn mount_generate(server: &MockServer, raw_output: &str) {
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": raw_output,
            "done": true
        })))
        .mount(server)
        .await;
}

async fn mount_embed(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[0.1, 0.2, 0.3]]
        })))
        .mount(server)
        .await;
}

// Scenario A: pure-JSON model output, one action without a device.
#[tokio::test]
async fn test_action_without_device_gets_default() {
    let ollama = MockServer::start().await;
    let executor = MockServer::start().await;

    let model_output =
        r#"{"message":"Searching for your resume.","actions":[{"tool":"filesystem.search","args":{"query":"resume"}}]}"#;
    mount_generate(&ollama, model_output).await;
    mount_embed(&ollama).await;

    Mock::given(method("POST"))
        .and(path("/execute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "tool": "filesystem.search",
                "device": DEFAULT_DEVICE,
                "status": "success",
                "output": "/Users/me/resume.pdf"
            }]
        })))
        .expect(1)
        .mount(&executor)
        .await;

    let agent = build_agent(&ollama.uri(), &format!("{}/execute", executor.uri()));
    let outcome = agent
        .handle_message("find my resume")
        .await
        .expect("pipeline should complete");

    assert_eq!(outcome.response.message, "Searching for your resume.");
    assert_eq!(outcome.response.actions.len(), 1);
    assert_eq!(outcome.response.actions[0].device, DEFAULT_DEVICE);

    // Executor results are relayed verbatim
    assert_eq!(outcome.execution_results.len(), 1);
    assert_eq!(outcome.execution_results[0].status, "success");
    assert_eq!(outcome.execution_results[0].output, "/Users/me/resume.pdf");

    // User turn + assistant turn
    assert_eq!(agent.short_term().len(), 2);
}

// Scenario B: JSON embedded in prose, empty actions, embedding service down.
#[tokio::test]
async fn test_brace_span_recovery_with_degraded_memory() {
    let ollama = MockServer::start().await;
    let executor = MockServer::start().await;

    mount_generate(
        &ollama,
        r#"Sure! Here you go: {"message":"ok","actions":[]}"#,
    )
    .await;

    // No embed mock: wiremock answers 404, long-term memory degrades
    Mock::given(method("POST"))
        .and(path("/execute"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&executor)
        .await;

    let agent = build_agent(&ollama.uri(), &format!("{}/execute", executor.uri()));
    let outcome = agent
        .handle_message("say ok")
        .await
        .expect("recovery via brace span");

    assert_eq!(outcome.response.message, "ok");
    assert!(outcome.response.actions.is_empty());
    assert!(outcome.execution_results.is_empty());
    assert!(!agent.long_term().is_available());
}

// Scenario C: no JSON recoverable at all.
#[tokio::test]
async fn test_malformed_output_is_fatal_with_raw_attached() {
    let ollama = MockServer::start().await;
    let executor = MockServer::start().await;

    mount_generate(&ollama, "not json at all").await;
    mount_embed(&ollama).await;

    Mock::given(method("POST"))
        .and(path("/execute"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&executor)
        .await;

    let agent = build_agent(&ollama.uri(), &format!("{}/execute", executor.uri()));
    let err = agent
        .handle_message("hello")
        .await
        .expect_err("malformed output must fail the request");

    match err {
        AgentError::MalformedOutput { raw } => assert_eq!(raw, "not json at all"),
        other => panic!("expected MalformedOutput, got {:?}", other),
    }

    // Only the initial user turn was recorded
    assert_eq!(agent.short_term().len(), 1);
}

// Scenario D: model call stalls past the timeout.
#[tokio::test]
async fn test_model_timeout_is_connectivity_failure() {
    let ollama = MockServer::start().await;
    let executor = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "{}"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&ollama)
        .await;

    Mock::given(method("POST"))
        .and(path("/execute"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&executor)
        .await;

    let agent = build_agent(&ollama.uri(), &format!("{}/execute", executor.uri()));
    let err = agent
        .handle_message("anything")
        .await
        .expect_err("stalled model must fail the request");

    assert!(matches!(err, AgentError::Connectivity(_)));
    assert!(err.raw_output().is_none());
    assert_eq!(agent.short_term().len(), 1);
}

// Schema violation: parseable JSON that misses the required message field.
#[tokio::test]
async fn test_schema_violation_is_fatal_with_raw_attached() {
    let ollama = MockServer::start().await;
    let executor = MockServer::start().await;

    let model_output = r#"{"actions":[{"tool":"apps.open","args":{}}]}"#;
    mount_generate(&ollama, model_output).await;
    mount_embed(&ollama).await;

    let agent = build_agent(&ollama.uri(), &format!("{}/execute", executor.uri()));
    let err = agent
        .handle_message("open something")
        .await
        .expect_err("missing message must fail validation");

    match err {
        AgentError::SchemaViolation { raw, details } => {
            assert_eq!(raw, model_output);
            assert!(details.contains("message"));
        }
        other => panic!("expected SchemaViolation, got {:?}", other),
    }
    assert_eq!(agent.short_term().len(), 1);
}

// Executor down: one synthesized failure result per action, order preserved.
#[tokio::test]
async fn test_unreachable_executor_degrades_per_action() {
    let ollama = MockServer::start().await;

    let model_output = r#"{"message":"On it.","actions":[
        {"tool":"filesystem.search","args":{"query":"notes"}},
        {"tool":"apps.open","device":"office-mac","args":{"name":"Notes"}}
    ]}"#;
    mount_generate(&ollama, model_output).await;
    mount_embed(&ollama).await;

    // Unroutable executor endpoint
    let agent = build_agent(&ollama.uri(), "http://127.0.0.1:1/execute");
    let outcome = agent
        .handle_message("open my notes")
        .await
        .expect("executor failure must not fail the pipeline");

    assert_eq!(outcome.execution_results.len(), 2);
    assert_eq!(outcome.execution_results[0].tool, "filesystem.search");
    assert_eq!(outcome.execution_results[0].device, DEFAULT_DEVICE);
    assert_eq!(outcome.execution_results[1].tool, "apps.open");
    assert_eq!(outcome.execution_results[1].device, "office-mac");
    for result in &outcome.execution_results {
        assert!(!result.status.is_empty());
        assert_ne!(result.status, "success");
        assert!(result.output.is_empty());
    }
}

// Short-term context feeds back into the next prompt.
#[tokio::test]
async fn test_conversation_context_accumulates() {
    let ollama = MockServer::start().await;
    let executor = MockServer::start().await;

    mount_generate(&ollama, r#"{"message":"Noted.","actions":[]}"#).await;
    mount_embed(&ollama).await;

    let agent = build_agent(&ollama.uri(), &format!("{}/execute", executor.uri()));
    agent.handle_message("first message").await.expect("ok");
    agent.handle_message("second message").await.expect("ok");

    assert_eq!(agent.short_term().len(), 4);
    let context = agent.short_term().recent_context(10);
    let first = context.find("USER: first message").expect("first turn kept");
    let second = context.find("USER: second message").expect("second turn kept");
    assert!(first < second);
}
