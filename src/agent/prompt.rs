//! Prompt Assembly
//!
//! Builds the full completion prompt from the system instructions, the
//! short-term conversation window, any recalled long-term memories, and
//! the current user message — in that order.

use crate::memory::RecalledMemory;

/// System instructions stating the JSON response contract
pub const SYSTEM_PROMPT: &str = r#"You are Steward, a text-based personal assistant that controls the user's devices.

You do NOT chat casually. You analyze user intent and produce structured responses.

Rules:
- Only respond in JSON matching this schema:
{
    "message": "<friendly summary>",
    "actions": [
        {
            "tool": "<tool_name>",
            "device": "<device_name>",
            "args": { ... }
        }
    ]
}
- You may return multiple actions.
- If no action is needed, return an empty "actions" array.
- Allowed tools: filesystem.search, filesystem.open, apps.open, system.info
"#;

/// Assemble the completion prompt. Empty context sections are omitted
/// rather than leaving dangling headers in the prompt.
pub fn build_prompt(
    short_term_context: &str,
    recalled: &[RecalledMemory],
    user_message: &str,
) -> String {
    let mut prompt = String::from(SYSTEM_PROMPT);

    if !short_term_context.is_empty() {
        prompt.push_str("\nRecent conversation:\n");
        prompt.push_str(short_term_context);
        prompt.push('\n');
    }

    if !recalled.is_empty() {
        prompt.push_str("\nRelevant memories:\n");
        for memory in recalled {
            prompt.push_str("- ");
            prompt.push_str(&memory.document);
            prompt.push('\n');
        }
    }

    prompt.push_str("\nUser message:\n");
    prompt.push_str(user_message);
    prompt.push('\n');

    prompt
}
