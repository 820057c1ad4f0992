use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;

use crate::{config::LinkConfig, error::LinkError};

use super::traits::ChatTransport;
use super::types::{ChatReply, ChatRequest};

/// [`ChatTransport`] over HTTP/JSON.
///
/// The client uses `Arc` internally for configuration, making cloning cheap.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    config: Arc<LinkConfig>,
    client: Client,
}

impl HttpTransport {
    pub fn new(config: Arc<LinkConfig>) -> Result<Self, LinkError> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a transport with a custom HTTP client.
    pub fn with_client(client: Client, config: Arc<LinkConfig>) -> Self {
        Self { config, client }
    }

    async fn get(&self, path: &str, timeout_ms: u64) -> Result<Response, LinkError> {
        let resp = self
            .client
            .get(self.config.endpoint(path))
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await
            .map_err(|e| classify(e, path, timeout_ms))?;
        log::debug!("GET {path} HTTP status: {}", resp.status());
        ensure_success(resp, path)
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn health(&self) -> Result<Value, LinkError> {
        let timeout_ms = self.config.health_timeout_ms;
        let resp = self.get("/health", timeout_ms).await?;
        let body = resp
            .text()
            .await
            .map_err(|e| classify(e, "/health", timeout_ms))?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn status(&self) -> Result<(), LinkError> {
        self.get("/status", self.config.status_timeout_ms).await?;
        Ok(())
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, LinkError> {
        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(request) {
                log::trace!("DeenBot chat payload: {}", json);
            }
        }

        let timeout_ms = self.config.request_timeout_ms;
        let resp = self
            .client
            .post(self.config.endpoint("/chat"))
            .json(request)
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await
            .map_err(|e| classify(e, "/chat", timeout_ms))?;

        log::debug!("POST /chat HTTP status: {}", resp.status());

        let resp = ensure_success(resp, "/chat")?;
        let body = resp
            .text()
            .await
            .map_err(|e| classify(e, "/chat", timeout_ms))?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn ensure_success(resp: Response, path: &str) -> Result<Response, LinkError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    Err(LinkError::Status {
        endpoint: path.to_string(),
        status: status.as_u16(),
    })
}

fn classify(err: reqwest::Error, path: &str, timeout_ms: u64) -> LinkError {
    if err.is_timeout() {
        return LinkError::Timeout {
            endpoint: path.to_string(),
            timeout_ms,
        };
    }
    LinkError::from(err)
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
