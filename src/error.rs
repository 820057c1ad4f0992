use thiserror::Error;

/// Error types surfaced by the connection resilience client.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Network or transport level failure
    #[error("HTTP error: {0}")]
    HttpError(String),
    /// A request exceeded its time bound
    #[error("Request to {endpoint} timed out after {timeout_ms}ms")]
    Timeout { endpoint: String, timeout_ms: u64 },
    /// The server answered with a non-2xx status
    #[error("HTTP {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },
    /// JSON serialization/deserialization errors
    #[error("JSON parse error: {0}")]
    JsonError(String),
    /// The service is offline and fallback mode is disabled
    #[error("DeenBot is offline and fallback mode is disabled")]
    Offline,
    /// The client was used after `shutdown()`
    #[error("client has been shut down")]
    ShutDown,
    /// Timers were started outside of a Tokio runtime
    #[error("Tokio runtime unavailable: {0}")]
    Runtime(String),
    /// Configuration values failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(String),
    /// Configuration file could not be read
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LinkError {
    /// Whether the failure is a transient network condition that retry and
    /// backoff policies should absorb.
    pub fn is_transient(&self) -> bool {
        match self {
            LinkError::HttpError(_) => true,
            LinkError::Timeout { .. } => true,
            LinkError::Status { .. } => true,
            LinkError::JsonError(_) => true,
            LinkError::Offline => false,
            LinkError::ShutDown => false,
            LinkError::Runtime(_) => false,
            LinkError::InvalidConfig(_) => false,
            LinkError::ConfigParse(_) => false,
            LinkError::Io(_) => false,
        }
    }
}

/// Converts reqwest HTTP errors into LinkErrors
impl From<reqwest::Error> for LinkError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return LinkError::Status {
                endpoint: err.url().map(|u| u.path().to_string()).unwrap_or_default(),
                status: status.as_u16(),
            };
        }
        LinkError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for LinkError {
    fn from(err: serde_json::Error) -> Self {
        LinkError::JsonError(format!(
            "{} at line {} column {}",
            err,
            err.line(),
            err.column()
        ))
    }
}

impl From<toml::de::Error> for LinkError {
    fn from(err: toml::de::Error) -> Self {
        LinkError::ConfigParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::LinkError;

    #[test]
    fn network_failures_are_transient() {
        assert!(LinkError::HttpError("refused".into()).is_transient());
        assert!(LinkError::Status {
            endpoint: "/chat".into(),
            status: 500
        }
        .is_transient());
        assert!(!LinkError::Offline.is_transient());
        assert!(!LinkError::ShutDown.is_transient());
    }

    #[test]
    fn json_error_keeps_position() {
        let err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let msg = LinkError::from(err).to_string();
        assert!(msg.contains("line 1"));
    }
}
