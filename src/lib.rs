//! Steward Library
//!
//! Steward is a conversational orchestration backend. It turns a free-text
//! chat message into a structured, schema-validated set of actions and
//! dispatches them to a remote device-execution agent, while keeping
//! conversational context across a short-term recency buffer and a
//! long-term semantic memory store.

/// Configuration management module
pub mod config;

/// LLM provider client module
pub mod llm;

/// Conversation memory tiers (short-term + long-term)
pub mod memory;

/// Agent orchestration pipeline
pub mod agent;

/// Remote action executor client
pub mod executor;

/// HTTP API surface
pub mod server;

/// Telemetry and Observability
pub mod telemetry;
