//! Shared wire format for the ChatGPT conversation endpoint.
//!
//! Both token-based connectors (session login and Google OAuth) talk to the
//! same `/backend-api/conversation` endpoint; the body builder and reply
//! extractor live here once instead of twice.

use serde_json::{json, Value};
use uuid::Uuid;

/// Browser user agent sent with conversation requests.
pub(crate) const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Build the conversation request body for a single user prompt.
pub(crate) fn conversation_body(prompt: &str) -> Value {
    json!({
        "action": "next",
        "messages": [{
            "id": Uuid::new_v4().to_string(),
            "role": "user",
            "content": {
                "content_type": "text",
                "parts": [prompt]
            }
        }],
        "model": "gpt-4",
        "parent_message_id": Uuid::new_v4().to_string(),
    })
}

/// Pull the reply text out of a conversation response.
///
/// The reply lives at `message.content.parts[]`, each part an object with a
/// `text` field; parts are concatenated. Returns `None` when the path is
/// missing or the assembled text is empty.
pub(crate) fn extract_reply(body: &Value) -> Option<String> {
    let parts = body.get("message")?.get("content")?.get("parts")?.as_array()?;

    let mut reply = String::new();
    for part in parts {
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            reply.push_str(text);
        }
    }

    let reply = reply.trim().to_string();
    if reply.is_empty() {
        None
    } else {
        Some(reply)
    }
}
