//! Runtime configuration
//!
//! The API key is passed around as part of an explicit [`ApiConfig`] value
//! instead of living in process-wide state.

use crate::tvdb::DEFAULT_BASE_URL;
use std::fmt;
use thiserror::Error;

/// Environment variable holding TheTVDB API key
pub const API_KEY_ENV: &str = "TVDB_API_KEY";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "TVDB_API_URL";

/// Errors that can occur while building the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TVDB_API_KEY is not set")]
    MissingApiKey,
}

/// Settings needed to talk to TheTVDB
#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub api_key: String,
    pub base_url: String,
}

impl ApiConfig {
    /// Creates a configuration for the public API endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Reads the configuration from `TVDB_API_KEY` and `TVDB_API_URL`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiKey`] if the key is unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            config.base_url = url;
        }
        Ok(config)
    }

    /// Replaces the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_missing_api_key() {
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[])),
            Err(ConfigError::MissingApiKey)
        ));
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[(API_KEY_ENV, "  ")])),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_defaults_to_public_endpoint() {
        let config = ApiConfig::from_lookup(lookup(&[(API_KEY_ENV, "key")])).unwrap();
        assert_eq!(config.api_key, "key");
        assert_eq!(config.base_url, "https://api.thetvdb.com");
    }

    #[test]
    fn test_base_url_override() {
        let config = ApiConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "key"),
            (API_URL_ENV, "http://localhost:8080"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", ApiConfig::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("api.thetvdb.com"));
    }
}
