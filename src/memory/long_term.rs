//! Long-Term Semantic Memory
//!
//! Content-addressed archive of past exchanges. Each remembered text is
//! embedded via the model service and stored in a nearest-neighbor
//! [`VectorStore`]; recall embeds the query and returns the closest
//! records by ascending distance.
//!
//! # Degradation policy
//!
//! The orchestrator must never fail a request solely because long-term
//! memory is unavailable. If the embedding service is unreachable or
//! returns an invalid payload, `remember` becomes a no-op and `recall`
//! returns nothing — logged as a warning, never raised to the caller.
//! Availability is tracked as explicit state (`is_available`) updated on
//! every embedding attempt; the next request probes again, so a recovered
//! service is picked up without a restart.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::llm::OllamaClient;

/// A persisted unit of long-term memory
#[derive(Debug, Clone)]
pub struct MemoryRecord {
    /// Unique identifier assigned at write time
    pub id: Uuid,

    /// The remembered text
    pub text: String,

    /// Caller-supplied metadata (role, timestamps, ...)
    pub metadata: HashMap<String, Value>,

    /// Embedding vector for nearest-neighbor search
    pub embedding: Vec<f32>,
}

/// One recall hit, best match first in the returned sequence
#[derive(Debug, Clone)]
pub struct RecalledMemory {
    /// The stored document text
    pub document: String,

    /// Metadata stored alongside it
    pub metadata: HashMap<String, Value>,

    /// Distance from the query embedding (lower is closer)
    pub distance: f32,
}

/// Black-box nearest-neighbor store.
///
/// Durability and concurrency guarantees are the store's concern; this
/// trait only fixes the query contract: results come back ordered by
/// ascending distance, at most `top_k` of them.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Persist one record
    async fn add(&self, record: MemoryRecord) -> anyhow::Result<()>;

    /// Nearest-neighbor search against stored embeddings
    async fn query(&self, embedding: &[f32], top_k: usize) -> anyhow::Result<Vec<RecalledMemory>>;
}

/// Brute-force in-process vector store.
///
/// Euclidean distance over a mutex-guarded record list. Stands in for an
/// external vector database behind the same trait.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    records: Mutex<Vec<MemoryRecord>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn distance(a: &[f32], b: &[f32]) -> f32 {
        // Dimension mismatch means the embedding model changed mid-run;
        // treat such records as infinitely far away.
        if a.len() != b.len() {
            return f32::INFINITY;
        }
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add(&self, record: MemoryRecord) -> anyhow::Result<()> {
        let mut records = self.records.lock().expect("vector store lock poisoned");
        records.push(record);
        Ok(())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> anyhow::Result<Vec<RecalledMemory>> {
        let records = self.records.lock().expect("vector store lock poisoned");
        let mut hits: Vec<RecalledMemory> = records
            .iter()
            .map(|r| RecalledMemory {
                document: r.text.clone(),
                metadata: r.metadata.clone(),
                distance: Self::distance(&r.embedding, embedding),
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(top_k);
        Ok(hits)
    }
}

/// Long-term memory tier: embedding service + vector store.
pub struct LongTermMemory {
    llm: Arc<OllamaClient>,
    store: Arc<dyn VectorStore>,
    available: AtomicBool,
}

impl LongTermMemory {
    pub fn new(llm: Arc<OllamaClient>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            llm,
            store,
            available: AtomicBool::new(true),
        }
    }

    /// Archive `text` with `metadata` under a fresh id.
    ///
    /// Best-effort: if the embedding service or the store fails, this logs
    /// a warning and returns normally.
    pub async fn remember(&self, text: &str, metadata: HashMap<String, Value>) {
        let embedding = match self.embed_checked(text).await {
            Some(v) => v,
            None => return,
        };

        let record = MemoryRecord {
            id: Uuid::new_v4(),
            text: text.to_string(),
            metadata,
            embedding,
        };

        if let Err(e) = self.store.add(record).await {
            tracing::warn!("Could not add memory (store error): {}", e);
        }
    }

    /// Recall up to `top_k` records semantically close to `query`,
    /// best match first. Empty on any embedding or store failure.
    pub async fn recall(&self, query: &str, top_k: usize) -> Vec<RecalledMemory> {
        let embedding = match self.embed_checked(query).await {
            Some(v) => v,
            None => return Vec::new(),
        };

        match self.store.query(&embedding, top_k).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!("Could not query memory (store error): {}", e);
                Vec::new()
            }
        }
    }

    /// Whether the last embedding attempt succeeded.
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    /// Explicit persistence hook, kept for interface symmetry.
    /// The underlying store persists on write; there is nothing to flush.
    pub fn persist(&self) {}

    async fn embed_checked(&self, text: &str) -> Option<Vec<f32>> {
        match self.llm.embed(text).await {
            Ok(v) => {
                if !self.available.swap(true, Ordering::Relaxed) {
                    tracing::info!("embedding service recovered, long-term memory active");
                }
                Some(v)
            }
            Err(e) => {
                if self.available.swap(false, Ordering::Relaxed) {
                    tracing::warn!("Could not reach embedding service, degrading: {}", e);
                } else {
                    tracing::debug!("embedding service still unavailable: {}", e);
                }
                None
            }
        }
    }
}
