//! Server configuration.

use crate::error::ConfigError;
use crate::session::{DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Settings for the HTTP server, loadable from TOML.
///
/// Every key is optional in the file; missing keys take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind to.
    #[serde(default = "default_port")]
    port: u16,

    /// Name of the cookie carrying the session id.
    #[serde(default = "default_cookie_name")]
    cookie_name: String,

    /// Tracing filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    log_filter: String,

    /// Most sessions kept in memory; the least recently used is evicted.
    #[serde(default = "default_max_sessions")]
    max_sessions: usize,

    /// Seconds a session may sit unused before it is dropped.
    #[serde(default = "default_session_idle_secs")]
    session_idle_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_cookie_name() -> String {
    "ttt_session".to_string()
}

fn default_log_filter() -> String {
    "info,tictactoe_web=debug,tictactoe_core=debug".to_string()
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

fn default_session_idle_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT.as_secs()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cookie_name: default_cookie_name(),
            log_filter: default_log_filter(),
            max_sessions: default_max_sessions(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::new(format!("Failed to render config: {}", e)))
    }

    /// Applies a `PORT` environment value on top of the loaded settings.
    pub fn with_port_env(mut self, port: Option<String>) -> Result<Self, ConfigError> {
        if let Some(raw) = port {
            self.port = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid PORT {:?}: {}", raw, e)))?;
            debug!(port = self.port, "Port taken from environment");
        }
        Ok(self)
    }

    /// Applies command-line overrides, which win over file and environment.
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// How long an unused session is kept.
    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_sessions == 0 {
            return Err(ConfigError::new("max_sessions must be at least 1"));
        }
        let name_ok = !self.cookie_name.is_empty()
            && self
                .cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !name_ok {
            return Err(ConfigError::new(format!(
                "Invalid cookie name {:?}: use ASCII letters, digits, '_' or '-'",
                self.cookie_name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(ServerConfig::from_toml("").unwrap(), ServerConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = ServerConfig::from_toml("port = 8080\ncookie_name = \"game\"").unwrap();
        assert_eq!(*config.port(), 8080);
        assert_eq!(config.cookie_name(), "game");
        assert_eq!(config.host(), "127.0.0.1");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ServerConfig::default().with_overrides(Some("0.0.0.0".into()), Some(9000));
        let text = config.to_toml().unwrap();
        assert_eq!(ServerConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_bad_cookie_name_rejected() {
        let err = ServerConfig::from_toml("cookie_name = \"a b;c\"").unwrap_err();
        assert!(err.message.contains("Invalid cookie name"));
    }

    #[test]
    fn test_session_limits() {
        let config = ServerConfig::from_toml("max_sessions = 50\nsession_idle_secs = 600").unwrap();
        assert_eq!(*config.max_sessions(), 50);
        assert_eq!(config.session_idle_timeout(), Duration::from_secs(600));

        let err = ServerConfig::from_toml("max_sessions = 0").unwrap_err();
        assert!(err.message.contains("max_sessions"));
    }

    #[test]
    fn test_port_env_then_cli_override() {
        let config = ServerConfig::default()
            .with_port_env(Some("4000".into()))
            .unwrap();
        assert_eq!(*config.port(), 4000);

        let config = config.with_overrides(None, Some(5000));
        assert_eq!(*config.port(), 5000);

        assert!(ServerConfig::default().with_port_env(Some("nope".into())).is_err());
    }
}
