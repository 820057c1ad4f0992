use chrono::{DateTime, Utc};
use serde::Serialize;

/// Broadcast to observers whenever connectivity changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ConnectionNotice {
    /// The backend answered again after being unreachable
    Restored { at: DateTime<Utc> },
    /// The backend stopped answering
    Lost { at: DateTime<Utc> },
    /// Reconnection gave up; replies now come from the fallback table
    Offline { at: DateTime<Utc> },
}

