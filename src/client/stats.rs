use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use super::state::ConnectionState;
use super::wrapper::ConnectionResilienceClient;

/// Read-only snapshot of the connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionStats {
    pub state: ConnectionState,
    pub is_connected: bool,
    /// Milliseconds since the last successful health check, 0 if none
    pub uptime_ms: u64,
    pub connection_attempts: u32,
    pub is_reconnecting: bool,
    pub fallback_mode: bool,
    pub last_health_check_at: Option<DateTime<Utc>>,
    pub history_len: usize,
}

impl ConnectionResilienceClient {
    pub fn connection_stats(&self) -> ConnectionStats {
        let record = self.inner.record.lock();
        let uptime_ms = record
            .last_health_instant
            .map(|at| Instant::now().saturating_duration_since(at).as_millis() as u64)
            .unwrap_or(0);
        ConnectionStats {
            state: record.state,
            is_connected: record.state.is_connected(),
            uptime_ms,
            connection_attempts: record.attempts,
            is_reconnecting: record.state.is_reconnecting(),
            fallback_mode: record.state.is_fallback(),
            last_health_check_at: record.last_health_check_at,
            history_len: record.history.len(),
        }
    }
}
