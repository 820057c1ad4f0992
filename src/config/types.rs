use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LinkError;

const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
const DEFAULT_HEALTH_CHECK_INTERVAL_MS: u64 = 10_000;
const DEFAULT_MONITOR_INTERVAL_MS: u64 = 5_000;
const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
const DEFAULT_RECONNECT_DELAY_MS: u64 = 2_000;
const DEFAULT_MAX_SEND_RETRIES: u32 = 3;
const DEFAULT_SEND_RETRY_DELAY_MS: u64 = 1_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_HEALTH_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_STATUS_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Settings for the connection resilience client.
///
/// Fixed for the lifetime of a client; every interval, delay and timeout is
/// expressed in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Base URL of the chat backend, without a trailing path
    pub server_url: String,
    /// Period of the `/health` probe timer
    pub health_check_interval_ms: u64,
    /// Period of the `/status` monitor timer
    pub monitor_interval_ms: u64,
    /// Reconnection attempts allowed before falling back
    pub max_reconnect_attempts: u32,
    /// Base reconnect delay; attempt `n` waits `n` times this
    pub reconnect_delay_ms: u64,
    /// Delivery attempts per message, including the first
    pub max_send_retries: u32,
    /// Base delay between delivery attempts; attempt `n` waits `n` times this
    pub send_retry_delay_ms: u64,
    /// Bound on a `/chat` POST
    pub request_timeout_ms: u64,
    /// Bound on a `/health` probe
    pub health_timeout_ms: u64,
    /// Bound on a `/status` probe
    pub status_timeout_ms: u64,
    /// Number of diagnostic events retained
    pub history_capacity: usize,
    /// Optional user id attached to every chat request
    pub user_id: Option<String>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            health_check_interval_ms: DEFAULT_HEALTH_CHECK_INTERVAL_MS,
            monitor_interval_ms: DEFAULT_MONITOR_INTERVAL_MS,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            max_send_retries: DEFAULT_MAX_SEND_RETRIES,
            send_retry_delay_ms: DEFAULT_SEND_RETRY_DELAY_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            health_timeout_ms: DEFAULT_HEALTH_TIMEOUT_MS,
            status_timeout_ms: DEFAULT_STATUS_TIMEOUT_MS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            user_id: None,
        }
    }
}

impl LinkConfig {
    /// Creates a configuration with default timings for the given server.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Self::default()
        }
    }

    /// Sets the health check period.
    pub fn health_check_interval_ms(mut self, ms: u64) -> Self {
        self.health_check_interval_ms = ms;
        self
    }

    /// Sets the monitor period.
    pub fn monitor_interval_ms(mut self, ms: u64) -> Self {
        self.monitor_interval_ms = ms;
        self
    }

    /// Sets the reconnection attempt bound and base delay.
    pub fn reconnect(mut self, max_attempts: u32, delay_ms: u64) -> Self {
        self.max_reconnect_attempts = max_attempts;
        self.reconnect_delay_ms = delay_ms;
        self
    }

    /// Sets the delivery attempt bound and base delay.
    pub fn send_retries(mut self, max_retries: u32, delay_ms: u64) -> Self {
        self.max_send_retries = max_retries;
        self.send_retry_delay_ms = delay_ms;
        self
    }

    /// Sets the chat request timeout.
    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.request_timeout_ms = ms;
        self
    }

    /// Sets the health and status probe timeouts.
    pub fn probe_timeouts_ms(mut self, health_ms: u64, status_ms: u64) -> Self {
        self.health_timeout_ms = health_ms;
        self.status_timeout_ms = status_ms;
        self
    }

    /// Sets the diagnostic history capacity.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Sets the user id sent with chat requests.
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Checks that the configuration can drive a client.
    pub fn validate(&self) -> Result<(), LinkError> {
        let url = self.server_url.trim();
        if url.is_empty() {
            return Err(LinkError::InvalidConfig(
                "server_url must not be empty".to_string(),
            ));
        }
        reqwest::Url::parse(url)
            .map_err(|e| LinkError::InvalidConfig(format!("server_url `{url}`: {e}")))?;

        let non_zero = [
            ("health_check_interval_ms", self.health_check_interval_ms),
            ("monitor_interval_ms", self.monitor_interval_ms),
            ("request_timeout_ms", self.request_timeout_ms),
            ("health_timeout_ms", self.health_timeout_ms),
            ("status_timeout_ms", self.status_timeout_ms),
        ];
        if let Some((name, _)) = non_zero.iter().find(|(_, v)| *v == 0) {
            return Err(LinkError::InvalidConfig(format!(
                "{name} must be greater than 0"
            )));
        }
        if self.max_send_retries == 0 {
            return Err(LinkError::InvalidConfig(
                "max_send_retries must be at least 1".to_string(),
            ));
        }
        if self.history_capacity == 0 {
            return Err(LinkError::InvalidConfig(
                "history_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Full URL of an endpoint under the server base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.server_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Delay before the retry that follows failed reconnection attempt `attempt`.
    pub fn reconnect_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms.saturating_mul(u64::from(attempt)))
    }

    /// Delay after failed delivery attempt `attempt`.
    pub fn send_retry_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.send_retry_delay_ms.saturating_mul(u64::from(attempt)))
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_millis(self.health_check_interval_ms)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms)
    }
}
