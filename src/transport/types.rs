use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a `/chat` POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            user_id: None,
        }
    }

    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }
}

/// Where a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Answered by the live backend
    #[default]
    Live,
    /// Answered from the local fallback table
    Fallback,
}

/// A chat answer, either live or from the fallback table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Answer text
    pub response: String,
    /// Origin label reported by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Set by the client, never taken from the wire
    #[serde(default, skip_deserializing)]
    pub provenance: Provenance,
    /// Any further fields the backend returned
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatReply {
    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }
}

impl fmt::Display for ChatReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.response)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatReply, ChatRequest, Provenance};

    #[test]
    fn request_omits_absent_user_id() {
        let body = serde_json::to_value(ChatRequest::new("salam")).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "salam" }));
    }

    #[test]
    fn reply_keeps_backend_fields_and_ignores_wire_provenance() {
        let reply: ChatReply = serde_json::from_value(serde_json::json!({
            "response": "Wa alaykum as-salam",
            "source": "Enhanced Islamic Knowledge Base",
            "confidence": 0.92,
            "provenance": "fallback"
        }))
        .unwrap();
        assert_eq!(reply.provenance, Provenance::Live);
        assert_eq!(reply.source.as_deref(), Some("Enhanced Islamic Knowledge Base"));
        assert_eq!(reply.extra.get("confidence"), Some(&serde_json::json!(0.92)));
        assert!(!reply.is_fallback());
    }
}
