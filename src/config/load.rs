use std::fs;
use std::path::Path;

use crate::error::LinkError;

use super::types::LinkConfig;

impl LinkConfig {
    /// Parses a TOML document; keys that are absent keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, LinkError> {
        let config: LinkConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the configuration from a TOML file.
    ///
    /// A missing file yields the default configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LinkError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(LinkError::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::{error::LinkError, LinkConfig};

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = LinkConfig::from_toml_str(
            r#"
server_url = "http://10.0.0.2:9000"
max_reconnect_attempts = 2
user_id = "web-42"
"#,
        )
        .expect("parse");
        assert_eq!(cfg.server_url, "http://10.0.0.2:9000");
        assert_eq!(cfg.max_reconnect_attempts, 2);
        assert_eq!(cfg.user_id.as_deref(), Some("web-42"));
        assert_eq!(cfg.health_check_interval_ms, 10_000);
    }

    #[test]
    fn zero_send_retries_is_rejected() {
        let err = LinkConfig::from_toml_str("max_send_retries = 0").unwrap_err();
        assert!(matches!(err, LinkError::InvalidConfig(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = LinkConfig::from_toml_str("server_url = ").unwrap_err();
        assert!(matches!(err, LinkError::ConfigParse(_)));
    }

    #[test]
    fn load_reads_file_and_tolerates_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("absent.toml");
        assert_eq!(LinkConfig::load(&missing).expect("defaults"), LinkConfig::default());

        let path = dir.path().join("link.toml");
        let mut file = std::fs::File::create(&path).expect("create");
        writeln!(file, "monitor_interval_ms = 1500").expect("write");
        let cfg = LinkConfig::load(&path).expect("load");
        assert_eq!(cfg.monitor_interval_ms, 1_500);
    }
}
