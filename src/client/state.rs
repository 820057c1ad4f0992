use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::time::Instant;

use crate::{
    error::LinkError,
    events::{ConnectionEvent, ConnectionNotice, EventKind, EventLog},
};

/// Connectivity of the client to the chat backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionState {
    /// Not connected, replies are not available
    Disconnected,
    /// A reconnection sequence is in flight. `degraded` keeps fallback
    /// replies available while it runs.
    Reconnecting { degraded: bool },
    /// The backend answered the last probe
    Connected,
    /// The backend is unreachable; replies come from the fallback table
    Fallback,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn is_reconnecting(self) -> bool {
        matches!(self, ConnectionState::Reconnecting { .. })
    }

    pub fn is_fallback(self) -> bool {
        matches!(
            self,
            ConnectionState::Fallback | ConnectionState::Reconnecting { degraded: true }
        )
    }
}

/// Result of one reconnection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectOutcome {
    /// Another sequence is running, attempts are exhausted, or the client is
    /// already connected or shut down
    Skipped,
    /// The probe succeeded and the client is connected again
    Restored,
    /// The probe failed; the next attempt fires after the given delay
    RetryIn(Duration),
    /// The last allowed attempt failed and fallback mode is on
    Exhausted,
    /// The state moved on while the probe was in flight
    Discarded,
}

/// Shared connection record. Every mutation happens under one lock and
/// queues its notices in `outbox`, so observers never see a state change
/// without its notification.
///
/// `sequence` names the reconnection sequence that owns the slot. It moves
/// on whenever a fresh sequence starts or the client connects, so a retry
/// loop of an overtaken sequence can never touch the current one.
#[derive(Debug)]
pub(super) struct LinkRecord {
    pub(super) state: ConnectionState,
    pub(super) attempts: u32,
    pub(super) sequence: u64,
    pub(super) last_health_check_at: Option<DateTime<Utc>>,
    pub(super) last_health_instant: Option<Instant>,
    pub(super) history: EventLog,
    pub(super) started: bool,
    pub(super) shut_down: bool,
    pub(super) outbox: Vec<ConnectionNotice>,
}

impl LinkRecord {
    pub(super) fn new(history_capacity: usize) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            attempts: 0,
            sequence: 0,
            last_health_check_at: None,
            last_health_instant: None,
            history: EventLog::new(history_capacity),
            started: false,
            shut_down: false,
            outbox: Vec::new(),
        }
    }

    pub(super) fn log(&mut self, kind: EventKind, payload: Value) {
        let payload = match payload {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        let event = ConnectionEvent {
            timestamp: Utc::now(),
            kind,
            payload,
            connected: self.state.is_connected(),
            attempts: self.attempts,
        };
        log::debug!("Connection event: {} {:?}", kind, event.payload);
        self.history.push(event);
    }

    pub(super) fn mark_connected(&mut self, status: &str) {
        let previous = self.state;
        self.state = ConnectionState::Connected;
        self.attempts = 0;
        self.sequence = self.sequence.wrapping_add(1);
        if previous.is_fallback() {
            log::info!("Disabling fallback mode - DeenBot restored");
            self.log(EventKind::FallbackDisabled, json!({ "status": status }));
        }
        if !previous.is_connected() {
            self.log(EventKind::Connected, json!({ "status": status }));
            self.outbox.push(ConnectionNotice::Restored { at: Utc::now() });
        }
    }

    /// Only a connected client changes state; reconnecting and fallback
    /// states already imply disconnected.
    pub(super) fn mark_disconnected(&mut self, status: &str) {
        if !self.state.is_connected() {
            return;
        }
        self.state = ConnectionState::Disconnected;
        self.log(EventKind::Disconnected, json!({ "status": status }));
        self.outbox.push(ConnectionNotice::Lost { at: Utc::now() });
    }

    pub(super) fn enable_fallback(&mut self, reason: &str) {
        let previous = self.state;
        self.state = match previous {
            ConnectionState::Reconnecting { .. } => ConnectionState::Reconnecting { degraded: true },
            _ => ConnectionState::Fallback,
        };
        if previous.is_connected() {
            self.log(EventKind::Disconnected, json!({ "status": reason }));
            self.outbox.push(ConnectionNotice::Lost { at: Utc::now() });
        }
        if !previous.is_fallback() {
            log::warn!("Enabling fallback mode - DeenBot offline ({reason})");
            self.log(EventKind::FallbackEnabled, json!({ "reason": reason }));
            self.outbox.push(ConnectionNotice::Offline { at: Utc::now() });
        }
    }

    /// Claims the single reconnection slot and returns the attempt number
    /// with the owning sequence. `sequence` is `None` for a fresh sequence
    /// and the captured sequence for a scheduled retry.
    pub(super) fn begin_reconnect(
        &mut self,
        max_attempts: u32,
        sequence: Option<u64>,
    ) -> Option<(u32, u64)> {
        if self.shut_down
            || self.state.is_connected()
            || self.state.is_reconnecting()
            || self.attempts >= max_attempts
            || sequence.is_some_and(|s| s != self.sequence)
        {
            return None;
        }
        if sequence.is_none() {
            self.sequence = self.sequence.wrapping_add(1);
        }
        self.state = ConnectionState::Reconnecting {
            degraded: self.state.is_fallback(),
        };
        self.attempts += 1;
        self.log(
            EventKind::ReconnectionStarted,
            json!({ "attempt": self.attempts, "max_attempts": max_attempts }),
        );
        Some((self.attempts, self.sequence))
    }

    /// Releases the reconnection slot right before a scheduled retry fires.
    /// Returns false when `sequence` no longer owns the slot.
    pub(super) fn end_reconnect(&mut self, sequence: u64) -> bool {
        if self.shut_down || sequence != self.sequence {
            return false;
        }
        let ConnectionState::Reconnecting { degraded } = self.state else {
            return false;
        };
        self.state = if degraded {
            ConnectionState::Fallback
        } else {
            ConnectionState::Disconnected
        };
        true
    }

    pub(super) fn finish_reconnect_success(&mut self, sequence: u64) -> ReconnectOutcome {
        if self.shut_down || sequence != self.sequence || !self.state.is_reconnecting() {
            return ReconnectOutcome::Discarded;
        }
        self.mark_connected("reconnected");
        self.log(EventKind::ReconnectionSuccess, Value::Null);
        ReconnectOutcome::Restored
    }

    pub(super) fn finish_reconnect_failure(
        &mut self,
        sequence: u64,
        err: &LinkError,
        max_attempts: u32,
        delay: impl Fn(u32) -> Duration,
    ) -> ReconnectOutcome {
        if self.shut_down || sequence != self.sequence || !self.state.is_reconnecting() {
            return ReconnectOutcome::Discarded;
        }
        self.log(
            EventKind::ReconnectionFailed,
            json!({ "attempt": self.attempts, "error": err.to_string() }),
        );
        if self.attempts < max_attempts {
            let wait = delay(self.attempts);
            self.log(
                EventKind::ReconnectionScheduled,
                json!({ "delay_ms": wait.as_millis() as u64 }),
            );
            ReconnectOutcome::RetryIn(wait)
        } else {
            self.end_reconnect(sequence);
            self.enable_fallback("reconnect_attempts_exhausted");
            ReconnectOutcome::Exhausted
        }
    }
}
