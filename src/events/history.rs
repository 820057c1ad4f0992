use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    HealthCheckSuccess,
    HealthCheckFailed,
    HealthCheckError,
    StatusCheckFailed,
    Connected,
    Disconnected,
    ReconnectionStarted,
    ReconnectionSuccess,
    ReconnectionFailed,
    ReconnectionScheduled,
    MessageSentSuccess,
    MessageSendFailed,
    FallbackEnabled,
    FallbackDisabled,
    NetworkOnline,
    NetworkOffline,
    Shutdown,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::HealthCheckSuccess => "health_check_success",
            EventKind::HealthCheckFailed => "health_check_failed",
            EventKind::HealthCheckError => "health_check_error",
            EventKind::StatusCheckFailed => "status_check_failed",
            EventKind::Connected => "connected",
            EventKind::Disconnected => "disconnected",
            EventKind::ReconnectionStarted => "reconnection_started",
            EventKind::ReconnectionSuccess => "reconnection_success",
            EventKind::ReconnectionFailed => "reconnection_failed",
            EventKind::ReconnectionScheduled => "reconnection_scheduled",
            EventKind::MessageSentSuccess => "message_sent_success",
            EventKind::MessageSendFailed => "message_send_failed",
            EventKind::FallbackEnabled => "fallback_enabled",
            EventKind::FallbackDisabled => "fallback_disabled",
            EventKind::NetworkOnline => "network_online",
            EventKind::NetworkOffline => "network_offline",
            EventKind::Shutdown => "shutdown",
        };
        write!(f, "{name}")
    }
}

/// Immutable diagnostic record of a connection event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    pub payload: Map<String, Value>,
    /// Whether the client considered itself connected when the event was logged
    pub connected: bool,
    /// Reconnection attempt counter when the event was logged
    pub attempts: u32,
}

/// Bounded ring of the most recent connection events.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<ConnectionEvent>,
    capacity: usize,
}

impl EventLog {
    /// Creates a log keeping at most `capacity` events (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an event, evicting the oldest when full.
    pub fn push(&mut self, event: ConnectionEvent) {
        if self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All retained events in chronological order.
    pub fn snapshot(&self) -> Vec<ConnectionEvent> {
        self.events.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::Map;

    use super::{ConnectionEvent, EventKind, EventLog};

    fn event(attempts: u32) -> ConnectionEvent {
        ConnectionEvent {
            timestamp: Utc::now(),
            kind: EventKind::HealthCheckError,
            payload: Map::new(),
            connected: false,
            attempts,
        }
    }

    #[test]
    fn log_evicts_oldest_past_capacity() {
        let mut log = EventLog::new(100);
        for i in 0..101 {
            log.push(event(i));
        }
        assert_eq!(log.len(), 100);
        let events = log.snapshot();
        assert_eq!(events.first().map(|e| e.attempts), Some(1));
        assert_eq!(events.last().map(|e| e.attempts), Some(100));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut log = EventLog::new(0);
        log.push(event(1));
        log.push(event(2));
        let events = log.snapshot();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].attempts, 2);
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_value(EventKind::ReconnectionFailed).unwrap();
        assert_eq!(json, "reconnection_failed");
        assert_eq!(EventKind::ReconnectionFailed.to_string(), "reconnection_failed");
    }
}
