//! Configuration loading
//!
//! This module provides:
//! - `Config` - settings loaded from settings.toml (file locations, request
//!   options, discovery pattern)
//! - `RequestConfig`, `DiscoveryConfig`, `FilesConfig` - the individual sections
//!
//! The endpoint list itself lives in a separate flat file (see [`crate::store`]);
//! settings.toml only says where that file is.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default payload sent to every endpoint
pub const DEFAULT_PAYLOAD: &str = "Hello, world!";

/// Marker that announces a new endpoint inside a response body
pub const DEFAULT_MARKER: &str = "New LLM: ";

/// Path segment appended to the sender's URL for a discovered endpoint
pub const DEFAULT_ROUTE_SUFFIX: &str = "/v1/text";

/// Main configuration structure loaded from settings.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub files: FilesConfig,
    pub request: RequestConfig,
    pub discovery: DiscoveryConfig,
}

impl Config {
    /// Load configuration from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Config::default()),
        }
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;
        Ok(config)
    }

    /// Get the config directory path (~/.config/llm-connector)
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("llm-connector"))
    }

    /// Get the default settings file path
    pub fn default_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }
}

/// Locations of the flat files the connector reads and appends to.
/// Relative paths resolve against the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Comma-separated endpoint list
    pub endpoints: PathBuf,
    /// Exchange log (four lines per record)
    pub log: PathBuf,
    /// Error log (one line per record)
    pub error_log: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            endpoints: PathBuf::from("config.txt"),
            log: PathBuf::from("log.txt"),
            error_log: PathBuf::from("error_log.txt"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Text sent as the raw request body
    pub payload: String,
    /// Value of the Content-Type header
    pub content_type: String,
    /// Per-request timeout. Unset leaves the transport default in place.
    pub timeout_secs: Option<u64>,
    /// Reject endpoints that do not start with "https"
    pub require_https: bool,
}

impl RequestConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            payload: DEFAULT_PAYLOAD.to_string(),
            content_type: "application/json".to_string(),
            timeout_secs: None,
            require_https: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Literal text that precedes an announced endpoint identifier
    pub marker: String,
    /// Appended to the sender's URL to form the discovered entry's URL
    pub route_suffix: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            route_suffix: DEFAULT_ROUTE_SUFFIX.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.files.endpoints, PathBuf::from("config.txt"));
        assert_eq!(config.files.log, PathBuf::from("log.txt"));
        assert_eq!(config.files.error_log, PathBuf::from("error_log.txt"));
        assert_eq!(config.request.payload, "Hello, world!");
        assert_eq!(config.request.content_type, "application/json");
        assert!(config.request.timeout().is_none());
        assert!(config.request.require_https);
        assert_eq!(config.discovery.marker, "New LLM: ");
        assert_eq!(config.discovery.route_suffix, "/v1/text");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[files]
endpoints = "/var/lib/llm/endpoints.txt"

[request]
payload = "ping"
timeout_secs = 30
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.files.endpoints,
            PathBuf::from("/var/lib/llm/endpoints.txt")
        );
        // Unspecified keys keep their defaults
        assert_eq!(config.files.log, PathBuf::from("log.txt"));
        assert_eq!(config.request.payload, "ping");
        assert_eq!(config.request.timeout(), Some(Duration::from_secs(30)));
        assert!(config.request.require_https);
        assert_eq!(config.discovery.route_suffix, "/v1/text");
    }

    #[test]
    fn test_parse_discovery() {
        let toml = r#"
[discovery]
marker = "Peer: "
route_suffix = "/chat"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.discovery.marker, "Peer: ");
        assert_eq!(config.discovery.route_suffix, "/chat");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[request]\nrequire_https = false\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(!config.request.require_https);
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempdir().unwrap();
        let result = Config::load_from(&dir.path().join("nope.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[request\npayload = ").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings file"));
    }
}
