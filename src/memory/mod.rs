//! Conversation Memory Tiers
//!
//! Two tiers with very different guarantees:
//!
//! - [`ShortTermMemory`]: an in-process, ordering-preserving log of
//!   conversation turns. Append never fails; reads format a bounded
//!   recency window for prompt assembly. Nothing survives a restart.
//! - [`long_term::LongTermMemory`]: a semantic archive backed by a vector
//!   store plus an embedding service. Everything about it is best-effort;
//!   see the module docs for the degradation policy.
//!
//! Both are owned by the orchestrator and injected explicitly rather than
//! living in process-global state, so concurrent requests share one log
//! under a mutex-guarded append/read discipline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

pub mod long_term;

pub use long_term::{
    InMemoryVectorStore, LongTermMemory, MemoryRecord, RecalledMemory, VectorStore,
};

/// Speaker role of a conversation turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message written by the user
    User,

    /// Message produced by the assistant
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "USER"),
            Role::Assistant => write!(f, "ASSISTANT"),
        }
    }
}

/// One message exchanged in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    /// Who spoke
    pub role: Role,

    /// What they said
    pub text: String,
}

/// Ordered, append-only log of recent conversation turns.
///
/// Process-lifetime scope: turns are never deleted, only the read window
/// is bounded. Appends and reads are safe under concurrent requests.
#[derive(Debug, Default)]
pub struct ShortTermMemory {
    turns: Mutex<Vec<Turn>>,
}

impl ShortTermMemory {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one turn. Unconditional; ordering follows call order.
    pub fn append(&self, role: Role, text: impl Into<String>) {
        let mut turns = self.turns.lock().expect("short-term memory lock poisoned");
        turns.push(Turn {
            role,
            text: text.into(),
        });
    }

    /// Format the last `limit` turns as `"<ROLE>: <text>"` lines, oldest
    /// first within the window. Fewer than `limit` turns returns all of
    /// them; an empty log returns an empty string.
    pub fn recent_context(&self, limit: usize) -> String {
        let turns = self.turns.lock().expect("short-term memory lock poisoned");
        let start = turns.len().saturating_sub(limit);
        turns[start..]
            .iter()
            .map(|t| format!("{}: {}", t.role, t.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of turns recorded so far
    pub fn len(&self) -> usize {
        self.turns.lock().expect("short-term memory lock poisoned").len()
    }

    /// True if no turn has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
