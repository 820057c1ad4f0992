use async_trait::async_trait;
use serde_json::Value;

use crate::error::LinkError;

use super::types::{ChatReply, ChatRequest};

/// Requests the resilience client issues against the chat backend.
///
/// Every call must be bounded by a timeout; a hung request surfaces as
/// [`LinkError::Timeout`] rather than stalling the caller.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Liveness probe (`GET /health`). Returns the body for diagnostics.
    async fn health(&self) -> Result<Value, LinkError>;

    /// Lightweight monitor ping (`GET /status`).
    async fn status(&self) -> Result<(), LinkError>;

    /// Delivers one chat message (`POST /chat`).
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, LinkError>;
}
