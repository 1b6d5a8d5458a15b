//! Application configuration settings.

use serde::{Deserialize, Serialize};
use url::Url;

/// Main configuration for linkdeck.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkdeckConfig {
    /// API client settings.
    pub api: ApiConfig,
    /// Authentication settings.
    pub auth: AuthConfig,
}

/// API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend API base URL.
    #[serde(with = "url_serde")]
    pub base_url: Url,
    /// Request timeout in seconds. Also bounds the refresh call.
    pub timeout_secs: u64,
    /// Maximum number of retries for transient failures (5xx, timeouts).
    pub max_retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:8080").expect("valid default URL"),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

/// Where tokens are kept between invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreKind {
    /// OS keyring.
    #[default]
    Keyring,
    /// Process memory only.
    Memory,
}

impl TryFrom<&str> for TokenStoreKind {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "keyring" => Ok(Self::Keyring),
            "memory" => Ok(Self::Memory),
            _ => Err(format!("Unknown token store: {s}")),
        }
    }
}

/// Authentication endpoints and policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token storage backend.
    pub token_store: TokenStoreKind,
    /// Login endpoint path.
    pub login_path: String,
    /// Registration endpoint path.
    pub register_path: String,
    /// Refresh endpoint path, called with the refresh token as bearer.
    pub refresh_path: String,
    /// Paths sent without credentials.
    pub public_paths: Vec<String>,
    /// Paths whose successful responses carry a new token pair.
    pub token_paths: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let issuing = vec!["/auth/login".to_string(), "/auth/register".to_string()];
        Self {
            token_store: TokenStoreKind::Keyring,
            login_path: "/auth/login".to_string(),
            register_path: "/auth/register".to_string(),
            refresh_path: "/auth/refresh".to_string(),
            public_paths: issuing.clone(),
            token_paths: issuing,
        }
    }
}

/// Custom serde module for URL serialization.
mod url_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use url::Url;

    pub fn serialize<S>(url: &Url, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(url.as_str())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Url, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Url::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Environment variables that can override configuration.
pub mod env {
    pub const API_URL: &str = "LINKDECK_API_URL";
    pub const TOKEN_STORE: &str = "LINKDECK_TOKEN_STORE";
    pub const LOG_LEVEL: &str = "LINKDECK_LOG";
}

impl LinkdeckConfig {
    /// Apply environment variable overrides to the configuration.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(env::API_URL) {
            if let Ok(parsed) = Url::parse(&url) {
                self.api.base_url = parsed;
            }
        }

        if let Ok(kind) = std::env::var(env::TOKEN_STORE) {
            if let Ok(k) = kind.as_str().try_into() {
                self.auth.token_store = k;
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_api_routes() {
        let config = LinkdeckConfig::default();
        assert_eq!(config.auth.refresh_path, "/auth/refresh");
        assert_eq!(config.auth.public_paths, config.auth.token_paths);
        assert!(config.auth.token_paths.contains(&"/auth/register".to_string()));
        assert_eq!(config.auth.token_store, TokenStoreKind::Keyring);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: LinkdeckConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://links.example.com/api"

            [auth]
            token_store = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url.as_str(), "https://links.example.com/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.auth.token_store, TokenStoreKind::Memory);
        assert_eq!(config.auth.login_path, "/auth/login");
    }

    #[test]
    fn token_store_kind_parses_case_insensitively() {
        assert_eq!(
            TokenStoreKind::try_from("MEMORY"),
            Ok(TokenStoreKind::Memory)
        );
        assert!(TokenStoreKind::try_from("disk").is_err());
    }
}
