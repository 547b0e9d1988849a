//! Configuration management
//!
//! Steward is configured entirely through environment variables, which are
//! consumed verbatim at startup. Every variable has a working local-dev
//! default, so a bare `steward` invocation talks to an Ollama instance on
//! localhost and a device agent on port 8081.
//!
//! # Variables
//!
//! - `OLLAMA_URL`: base URL of the Ollama API (default `http://localhost:11434`)
//! - `OLLAMA_MODEL`: completion model name (default `llama3.1`)
//! - `OLLAMA_EMBEDDING_MODEL`: embedding model name (default `nomic-embed-text`)
//! - `DEFAULT_DEVICE`: fallback device identifier filled into actions that
//!   arrive without one (default `MacBook Pro`)
//! - `EXECUTOR_URL`: full endpoint URL of the device execution agent
//!   (default `http://localhost:8081/execute`)
//! - `BIND_ADDR`: socket address the HTTP server binds (default `127.0.0.1:8000`)
//! - `LOG_LEVEL`: default tracing level when `RUST_LOG` is unset (default `info`)

use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use thiserror::Error;

/// Errors raised while reading configuration from the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration for the steward backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Ollama API
    pub ollama_url: String,

    /// Completion model name (e.g. "llama3.1")
    pub model: String,

    /// Embedding model name (e.g. "nomic-embed-text")
    pub embedding_model: String,

    /// Device identifier filled into actions missing a `device` field
    pub default_device: String,

    /// Full endpoint URL of the remote device execution agent
    pub executor_url: String,

    /// Socket address for the HTTP server
    pub bind_addr: SocketAddr,

    /// Default log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Config {
    /// Load configuration from the environment, applying defaults for
    /// anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_raw = var_or("BIND_ADDR", "127.0.0.1:8000");
        let bind_addr: SocketAddr =
            bind_raw
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                    var: "BIND_ADDR",
                    value: bind_raw.clone(),
                    reason: e.to_string(),
                })?;

        Ok(Self {
            ollama_url: var_or("OLLAMA_URL", "http://localhost:11434"),
            model: var_or("OLLAMA_MODEL", "llama3.1"),
            embedding_model: var_or("OLLAMA_EMBEDDING_MODEL", "nomic-embed-text"),
            default_device: var_or("DEFAULT_DEVICE", "MacBook Pro"),
            executor_url: var_or("EXECUTOR_URL", "http://localhost:8081/execute"),
            bind_addr,
            log_level: var_or("LOG_LEVEL", "info"),
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}
