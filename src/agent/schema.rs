//! Response Schema Validation
//!
//! Second stage of the extract-then-validate contract: takes the generic
//! JSON payload recovered by [`super::extract`] and turns it into a typed
//! [`AgentResponse`].
//!
//! Device default-fill runs BEFORE structural validation, so a payload is
//! never rejected solely for a missing `device`. Tool names are accepted
//! as-is — whether a tool exists is the executor's concern, not this
//! layer's.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A single structured instruction for the remote executor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Action {
    /// Tool name, e.g. "filesystem.search"
    pub tool: String,

    /// Target device. Never empty after validation.
    pub device: String,

    /// Tool arguments
    pub args: Map<String, Value>,
}

/// Validated model response: a friendly summary plus zero or more actions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentResponse {
    /// Summary text shown to the user
    pub message: String,

    /// Actions to dispatch; may be empty
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// Raised when the payload does not match the response contract
#[derive(Debug, Error)]
#[error("LLM output failed schema validation: {details}")]
pub struct SchemaViolation {
    /// What was missing or mistyped
    pub details: String,
}

/// Validate `payload` into an [`AgentResponse`], filling `default_device`
/// into any action that arrived without one.
pub fn validate(mut payload: Value, default_device: &str) -> Result<AgentResponse, SchemaViolation> {
    fill_missing_devices(&mut payload, default_device);

    serde_json::from_value(payload).map_err(|e| SchemaViolation {
        details: e.to_string(),
    })
}

/// Set `device` on every action object that is missing one. Runs before
/// validation so a missing device is never a rejection reason.
fn fill_missing_devices(payload: &mut Value, default_device: &str) {
    let actions = payload
        .get_mut("actions")
        .and_then(Value::as_array_mut)
        .into_iter()
        .flatten();

    for action in actions {
        let Some(object) = action.as_object_mut() else {
            // Not an object at all; leave it for validation to reject
            continue;
        };

        let missing = match object.get("device") {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        };

        if missing {
            object.insert("device".to_string(), Value::String(default_device.to_string()));
        }
    }
}
