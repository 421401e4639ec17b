//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `VITRINE_STORAGE_FILE` - JSON file standing in for browser local storage
//!   (default: `.vitrine/storage.json`)
//! - `VITRINE_TTL_MINUTES` - Expiration window for stored values and cart
//!   items (default: 15)
//! - `VITRINE_BADGE_DEBOUNCE_MS` - Header badge notification debounce
//!   (default: 100)
//! - `VITRINE_BADGE_REFRESH_SECS` - Header badge periodic refresh (default: 60)
//! - `VIACEP_BASE_URL` - Postal-code lookup service (default:
//!   `https://viacep.com.br/ws`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_STORAGE_FILE: &str = ".vitrine/storage.json";
const DEFAULT_TTL_MINUTES: u32 = 15;
const DEFAULT_BADGE_DEBOUNCE_MS: u64 = 100;
const DEFAULT_BADGE_REFRESH_SECS: u64 = 60;
const DEFAULT_VIACEP_BASE_URL: &str = "https://viacep.com.br/ws";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// File backing the local key-value store in the command-line driver
    pub storage_file: PathBuf,
    /// Expiration window in minutes, for stored values and cart items alike
    pub ttl_minutes: u32,
    /// Header badge notification debounce
    pub badge_debounce: Duration,
    /// Header badge periodic refresh
    pub badge_refresh: Duration,
    /// Postal-code lookup configuration
    pub lookup: LookupConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Postal-code lookup service configuration.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Base URL without trailing slash; requests go to `{base_url}/{digits}/json/`
    pub base_url: String,
    /// How long resolved addresses stay in the in-process cache
    pub cache_ttl: Duration,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            storage_file: PathBuf::from(DEFAULT_STORAGE_FILE),
            ttl_minutes: DEFAULT_TTL_MINUTES,
            badge_debounce: Duration::from_millis(DEFAULT_BADGE_DEBOUNCE_MS),
            badge_refresh: Duration::from_secs(DEFAULT_BADGE_REFRESH_SECS),
            lookup: LookupConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_VIACEP_BASE_URL.to_string(),
            cache_ttl: Duration::from_secs(u64::from(DEFAULT_TTL_MINUTES) * 60),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let storage_file =
            PathBuf::from(get_env_or_default("VITRINE_STORAGE_FILE", DEFAULT_STORAGE_FILE));
        let ttl_minutes = parse_env_or_default("VITRINE_TTL_MINUTES", DEFAULT_TTL_MINUTES)?;
        if ttl_minutes == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "VITRINE_TTL_MINUTES".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let badge_debounce = Duration::from_millis(parse_env_or_default(
            "VITRINE_BADGE_DEBOUNCE_MS",
            DEFAULT_BADGE_DEBOUNCE_MS,
        )?);
        let badge_refresh = Duration::from_secs(parse_env_or_default(
            "VITRINE_BADGE_REFRESH_SECS",
            DEFAULT_BADGE_REFRESH_SECS,
        )?);

        let lookup = LookupConfig::from_env(ttl_minutes)?;

        Ok(Self {
            storage_file,
            ttl_minutes,
            badge_debounce,
            badge_refresh,
            lookup,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Expiration window as a `chrono` duration.
    #[must_use]
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.ttl_minutes))
    }
}

impl LookupConfig {
    fn from_env(ttl_minutes: u32) -> Result<Self, ConfigError> {
        let raw = get_env_or_default("VIACEP_BASE_URL", DEFAULT_VIACEP_BASE_URL);
        let base_url = parse_base_url(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("VIACEP_BASE_URL".to_string(), e))?
            .as_str()
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            base_url,
            cache_ttl: Duration::from_secs(u64::from(ttl_minutes) * 60),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Parse a lookup base URL, which must be absolute http(s).
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim_end_matches('/')).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme {}", url.scheme()));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::default();
        assert_eq!(config.ttl_minutes, 15);
        assert_eq!(config.ttl(), chrono::Duration::minutes(15));
        assert_eq!(config.badge_debounce, Duration::from_millis(100));
        assert_eq!(config.badge_refresh, Duration::from_secs(60));
        assert_eq!(config.lookup.base_url, "https://viacep.com.br/ws");
        assert_eq!(config.storage_file, PathBuf::from(".vitrine/storage.json"));
    }

    #[test]
    fn test_parse_base_url_trims_trailing_slash() {
        let url = parse_base_url("http://localhost:8080/ws/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/ws");
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        assert!(parse_base_url("ftp://viacep.com.br/ws").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_parse_env_or_default_uses_default_when_unset() {
        let value: u64 = parse_env_or_default("VITRINE_TEST_SURELY_UNSET_VAR", 7).unwrap();
        assert_eq!(value, 7);
    }
}
