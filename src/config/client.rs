//! Collaborator endpoint configuration.
//!
//! One section per external service the engine calls over HTTP.

use std::time::Duration;

use serde::Deserialize;

/// Default request timeout for collaborator calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Configuration
// ============================================================================

/// Case registry endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Base URL, e.g. `http://case-api:8161`.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8161".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl RegistryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Address index endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AddressIndexConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for AddressIndexConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AddressIndexConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Questionnaire launch settings.
///
/// The launch URL is `{protocol}://{host}{path}{token}`; the token comes
/// from the encoder service at `encoder_url`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    pub protocol: String,
    pub host: String,
    pub path: String,
    pub encoder_url: String,
    pub timeout_secs: u64,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            protocol: "https".to_string(),
            host: "localhost".to_string(),
            path: "/session?token=".to_string(),
            encoder_url: "http://localhost:8171/encode".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl LaunchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Assemble the questionnaire URL for an encoded token.
    pub fn launch_url(&self, token: &str) -> String {
        format!("{}://{}{}{}", self.protocol, self.host, self.path, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_url_format() {
        let config = LaunchConfig {
            protocol: "https".to_string(),
            host: "eq.census.example".to_string(),
            path: "/session?token=".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.launch_url("abc.def"),
            "https://eq.census.example/session?token=abc.def"
        );
    }

    #[test]
    fn test_timeouts_default() {
        assert_eq!(RegistryConfig::default().timeout(), Duration::from_secs(10));
        assert_eq!(AddressIndexConfig::default().timeout(), Duration::from_secs(10));
    }
}
