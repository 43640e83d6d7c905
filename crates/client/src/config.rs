//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FOOD_SERVICE_URL` - Base URL of the food service
//!
//! ## Optional
//! - `FOOD_SERVICE_API_TOKEN` - Bearer token attached to every request
//! - `FOOD_SERVICE_TIMEOUT_SECS` - Per-request timeout in seconds (default: 10)
//! - `FOOD_SERVICE_PAGE_CACHE_TTL_SECS` - Catalog page cache TTL in seconds
//!   (default: 60; 0 disables the cache)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PAGE_CACHE_TTL_SECS: u64 = 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Base URL cannot host endpoints: {0}")]
    InvalidBaseUrl(String),
}

/// Food service client configuration.
///
/// Constructed directly for tests and embedders, or from the environment via
/// [`FoodServiceConfig::from_env`]. Implements `Debug` manually to redact the
/// API token.
#[derive(Clone)]
pub struct FoodServiceConfig {
    /// Base URL of the food service (endpoints are joined onto it).
    pub base_url: Url,
    /// Optional bearer token attached to every request.
    pub api_token: Option<SecretString>,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// TTL for cached catalog pages; `None` disables the cache.
    pub page_cache_ttl: Option<Duration>,
}

impl std::fmt::Debug for FoodServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoodServiceConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("request_timeout", &self.request_timeout)
            .field("page_cache_ttl", &self.page_cache_ttl)
            .finish()
    }
}

impl FoodServiceConfig {
    /// Create a configuration pointing at `base_url` with defaults:
    /// no token, 10 second timeout, page cache disabled.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_cache_ttl: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `FOOD_SERVICE_URL` is missing or any
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = parse_base_url("FOOD_SERVICE_URL", &get_required_env("FOOD_SERVICE_URL")?)?;
        let api_token = get_optional_env("FOOD_SERVICE_API_TOKEN").map(SecretString::from);

        let timeout_secs = parse_secs(
            "FOOD_SERVICE_TIMEOUT_SECS",
            &get_env_or_default("FOOD_SERVICE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
        )?;
        let cache_ttl_secs = parse_secs(
            "FOOD_SERVICE_PAGE_CACHE_TTL_SECS",
            &get_env_or_default("FOOD_SERVICE_PAGE_CACHE_TTL_SECS", DEFAULT_PAGE_CACHE_TTL_SECS),
        )?;

        Ok(Self {
            base_url,
            api_token,
            request_timeout: Duration::from_secs(timeout_secs),
            page_cache_ttl: (cache_ttl_secs > 0).then(|| Duration::from_secs(cache_ttl_secs)),
        })
    }
}

/// Join an endpoint segment onto the configured base URL.
///
/// Handles base URLs with or without a trailing slash and with a path
/// prefix (`https://host/api` + `list` -> `https://host/api/list`).
pub(crate) fn join_endpoint(base: &Url, segment: &str) -> Result<Url, ConfigError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ConfigError::InvalidBaseUrl(base.to_string()))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: u64) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a whole-seconds value.
fn parse_secs(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse and validate the base URL.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let config = FoodServiceConfig::new(Url::parse("http://food.example.com").unwrap());
        assert!(config.api_token.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.page_cache_ttl.is_none());
    }

    #[test]
    fn test_parse_secs_valid() {
        assert_eq!(parse_secs("TEST_VAR", "30").unwrap(), 30);
    }

    #[test]
    fn test_parse_secs_invalid() {
        let err = parse_secs("TEST_VAR", "soon").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
        assert!(err.to_string().contains("TEST_VAR"));
    }

    #[test]
    fn test_parse_base_url_rejects_non_base() {
        let err = parse_base_url("TEST_VAR", "mailto:food@example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_join_endpoint_plain_host() {
        let base = Url::parse("http://food.example.com").unwrap();
        let url = join_endpoint(&base, "list").unwrap();
        assert_eq!(url.as_str(), "http://food.example.com/list");
    }

    #[test]
    fn test_join_endpoint_trailing_slash_and_prefix() {
        let base = Url::parse("http://food.example.com/api/").unwrap();
        let url = join_endpoint(&base, "prepare_buy").unwrap();
        assert_eq!(url.as_str(), "http://food.example.com/api/prepare_buy");
    }

    #[test]
    fn test_debug_redacts_token() {
        let mut config = FoodServiceConfig::new(Url::parse("http://food.example.com").unwrap());
        config.api_token = Some(SecretString::from("very-secret-token".to_string()));

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("very-secret-token"));
    }
}
