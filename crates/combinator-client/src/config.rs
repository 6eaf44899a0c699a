//! # Configuration Persistence
//!
//! Save and load client settings to/from disk.

use combinator_auth::SigningScheme;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default backend address for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:9900";

/// What to do when a sensitive request cannot be signed because the session
/// lacks a secret (or, for HMAC, a user id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SigningPolicy {
    /// Send the request unsigned and let the backend reject it.
    #[default]
    FailOpen,
    /// Refuse to send the request.
    FailClosed,
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the platform API, without a trailing slash.
    pub base_url: String,

    /// Request-signing scheme the backend expects.
    pub scheme: SigningScheme,

    /// Behaviour when signing material is missing.
    pub policy: SigningPolicy,

    /// Transport timeout in seconds.
    pub timeout_secs: u64,

    /// Directory holding persisted credentials.
    ///
    /// `None` means the platform data directory.
    pub state_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            scheme: SigningScheme::default(),
            policy: SigningPolicy::default(),
            timeout_secs: 30,
            state_dir: None,
        }
    }
}

impl ClientConfig {
    /// Returns the config file path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("combinator").join("config.json"))
    }

    /// Loads configuration from the default location, or returns defaults.
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            tracing::warn!("Could not determine config directory");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Loads configuration from `path`.
    ///
    /// A missing, unreadable or malformed file yields the defaults.
    #[must_use]
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(?path, "Config file not found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    tracing::info!(?path, "Loaded configuration");
                    config
                }
                Err(e) => {
                    tracing::warn!(?path, error = %e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(?path, error = %e, "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Saves configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns a description of the failure.
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {e}"))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {e}"))?;

        fs::write(path, contents).map_err(|e| format!("Failed to write config: {e}"))?;

        tracing::info!(?path, "Saved configuration");
        Ok(())
    }

    /// Directory for persisted credentials, falling back to
    /// `<data_dir>/combinator`.
    #[must_use]
    pub fn resolved_state_dir(&self) -> Option<PathBuf> {
        self.state_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|p| p.join("combinator")))
    }

    /// The base URL with any trailing slash removed.
    #[must_use]
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:9900");
        assert_eq!(config.scheme, SigningScheme::Hmac);
        assert_eq!(config.policy, SigningPolicy::FailOpen);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = ClientConfig {
            base_url: "https://console.example.com".into(),
            scheme: SigningScheme::Rsa,
            policy: SigningPolicy::FailClosed,
            timeout_secs: 5,
            state_dir: Some(dir.path().join("state")),
        };
        config.save_to(&path).unwrap();

        assert_eq!(ClientConfig::load_from(&path), config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"policy":"fail-closed"}"#).unwrap();

        let config = ClientConfig::load_from(&path);
        assert_eq!(config.policy, SigningPolicy::FailClosed);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(ClientConfig::load_from(&path), ClientConfig::default());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            ClientConfig::load_from(&dir.path().join("absent.json")),
            ClientConfig::default()
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ClientConfig {
            base_url: "http://localhost:9900/".into(),
            ..ClientConfig::default()
        };
        assert_eq!(config.normalized_base_url(), "http://localhost:9900");
    }
}
