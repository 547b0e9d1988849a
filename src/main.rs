// Steward backend
// Main entry point for the steward binary

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;

use steward::agent::Agent;
use steward::config::Config;
use steward::executor::ExecutorClient;
use steward::llm::OllamaClient;
use steward::memory::{InMemoryVectorStore, LongTermMemory, ShortTermMemory};
use steward::telemetry::{init_telemetry, init_telemetry_with_level};

/// Conversational orchestration backend
#[derive(Debug, Parser)]
#[command(name = "steward", version, about)]
struct Cli {
    /// Override the bind address from the environment (BIND_ADDR)
    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Basic telemetry first, before config is loaded
    init_telemetry();

    let config = Config::from_env()?;

    // Re-initialize with the config-driven level
    // (only takes effect if RUST_LOG env var is not set)
    init_telemetry_with_level(&config.log_level);

    tracing::info!(
        "Steward v{} (model={}, executor={})",
        env!("CARGO_PKG_VERSION"),
        config.model,
        config.executor_url
    );

    let llm = Arc::new(OllamaClient::new(
        &config.ollama_url,
        &config.model,
        &config.embedding_model,
    ));
    let store = Arc::new(InMemoryVectorStore::new());
    let long_term = LongTermMemory::new(Arc::clone(&llm), store);
    let agent = Agent::new(
        llm,
        ShortTermMemory::new(),
        long_term,
        ExecutorClient::new(&config.executor_url),
        &config.default_device,
    );

    let addr = cli.bind.unwrap_or(config.bind_addr);
    steward::server::serve(addr, Arc::new(agent)).await
}
