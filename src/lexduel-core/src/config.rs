//! Configuration module for loading TOML config files.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::SessionError;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

/// Where the backend collaborators live.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointsConfig {
    /// Base URL of the request/response API.
    pub api_base: String,
    /// URL of the realtime debate channel.
    pub realtime_url: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:5000".to_string(),
            realtime_url: "ws://localhost:5000".to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: EndpointsConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SessionError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| SessionError::ConfigError(format!("Failed to read config: {}", e)))?;
        Self::parse(&content)
    }

    /// Load configuration from string content.
    pub fn parse(content: &str) -> Result<Self, SessionError> {
        toml::from_str(content)
            .map_err(|e| SessionError::ConfigError(format!("Failed to parse config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = ClientConfig::parse(
            r#"
            [endpoints]
            api_base = "https://api.duel.example"
            realtime_url = "wss://rt.duel.example"
            "#,
        )
        .unwrap();
        assert_eq!(config.endpoints.api_base, "https://api.duel.example");
        assert_eq!(config.endpoints.realtime_url, "wss://rt.duel.example");
    }

    #[test]
    fn test_empty_config_falls_back_to_defaults() {
        let config = ClientConfig::parse("").unwrap();
        assert_eq!(config.endpoints.api_base, "http://localhost:5000");
        assert_eq!(config.endpoints.realtime_url, "ws://localhost:5000");
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let result = ClientConfig::parse("endpoints = not toml");
        assert!(matches!(result, Err(SessionError::ConfigError(_))));
    }
}
