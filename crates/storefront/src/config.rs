//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for sessions
//!   (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session cookie signing secret (min 64 chars, high entropy)
//! - `BACKEND_API_URL` - Base URL of the commerce backend API
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_RATE_LIMIT` - Rate limit `/auth` endpoints (default: true)
//! - `BACKEND_SERVICE_TOKEN` - Service token sent with every backend request
//! - `BACKEND_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `TOTALS_CACHE_TTL_SECS` - How long backend totals are cached (default: 60)
//! - `GUEST_STORE_QUOTA_BYTES` - Max stored size of one guest list (default: 65536)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tower_sessions::cookie::Key;
use url::Url;

/// Signing and encryption halves of a cookie `Key` take 32 bytes each.
const MIN_SESSION_SECRET_LENGTH: usize = 64;
const MIN_SERVICE_TOKEN_LENGTH: usize = 16;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default byte quota for one persisted guest list.
pub const DEFAULT_GUEST_STORE_QUOTA: usize = 64 * 1024;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Commerce backend API configuration
    pub backend: BackendConfig,
    /// Byte quota for one persisted guest list
    pub guest_store_quota: usize,
    /// Whether `/auth` endpoints are rate limited
    pub rate_limit: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error event sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Commerce backend API configuration.
///
/// Implements `Debug` manually to redact the service token.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL; always ends in `/` so relative paths join below it
    pub base_url: Url,
    /// Optional service token sent as `X-Service-Token`
    pub service_token: Option<SecretString>,
    /// Request timeout
    pub timeout: Duration,
    /// How long computed totals are cached
    pub totals_cache_ttl: Duration,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "service_token",
                &self.service_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .field("totals_cache_ttl", &self.totals_cache_ttl)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend = BackendConfig::from_env()?;

        Ok(Self {
            database_url: database_url("STOREFRONT_DATABASE_URL")?,
            host: parsed_or("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: parsed_or("STOREFRONT_PORT", 3000)?,
            base_url: required("STOREFRONT_BASE_URL")?,
            session_secret: required_secret("STOREFRONT_SESSION_SECRET", MIN_SESSION_SECRET_LENGTH)?,
            backend,
            guest_store_quota: parsed_or("GUEST_STORE_QUOTA_BYTES", DEFAULT_GUEST_STORE_QUOTA)?,
            rate_limit: parsed_or("STOREFRONT_RATE_LIMIT", true)?,
            sentry_dsn: optional("SENTRY_DSN"),
            sentry_environment: optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parsed_or("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: parsed_or("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Cookie signing key derived from the session secret.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InsecureSecret` if the secret is shorter than
    /// 64 bytes.
    pub fn session_key(&self) -> Result<Key, ConfigError> {
        Key::try_from(self.session_secret.expose_secret().as_bytes()).map_err(|e| {
            ConfigError::InsecureSecret("STOREFRONT_SESSION_SECRET".to_string(), e.to_string())
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_base_url(&required("BACKEND_API_URL")?)
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_API_URL".to_string(), e))?;
        let service_token = optional("BACKEND_SERVICE_TOKEN")
            .map(|token| {
                check_secret("BACKEND_SERVICE_TOKEN", &token, MIN_SERVICE_TOKEN_LENGTH)?;
                Ok::<_, ConfigError>(SecretString::from(token))
            })
            .transpose()?;

        Ok(Self {
            base_url,
            service_token,
            timeout: secs_or("BACKEND_TIMEOUT_SECS", 10)?,
            totals_cache_ttl: secs_or("TOTALS_CACHE_TTL_SECS", 60)?,
        })
    }
}

/// Parse a backend base URL, making sure it ends in `/`.
///
/// `Url::join` replaces the last path segment unless the base ends in a
/// slash, so `https://api/v1` + `cart/sync` would otherwise lose `v1`.
///
/// # Errors
///
/// Returns a description of the problem if the URL is invalid or not http(s).
pub fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

// =============================================================================
// Environment Access
// =============================================================================

fn required(key: &str) -> Result<String, ConfigError> {
    optional(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Unset and blank values both count as absent.
fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

fn secs_or(key: &str, default: u64) -> Result<Duration, ConfigError> {
    parsed_or(key, default).map(Duration::from_secs)
}

/// `primary`, else the shared `DATABASE_URL`.
fn database_url(primary: &str) -> Result<SecretString, ConfigError> {
    optional(primary)
        .or_else(|| optional("DATABASE_URL"))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(primary.to_string()))
}

// =============================================================================
// Secret Checks
// =============================================================================

/// Shannon entropy of `s` in bits per byte.
fn entropy_bits(s: &str) -> f64 {
    let mut counts = [0_usize; 256];
    for byte in s.bytes() {
        if let Some(count) = counts.get_mut(usize::from(byte)) {
            *count += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let len = s.len() as f64;
    counts
        .iter()
        .filter(|&&n| n > 0)
        .map(|&n| {
            #[allow(clippy::cast_precision_loss)]
            let p = n as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject short, placeholder-looking or low-entropy secrets.
fn check_secret(key: &str, value: &str, min_len: usize) -> Result<(), ConfigError> {
    let insecure = |reason: String| Err(ConfigError::InsecureSecret(key.to_string(), reason));

    if value.len() < min_len {
        return insecure(format!(
            "must be at least {min_len} characters (got {})",
            value.len()
        ));
    }

    let lower = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return insecure(format!("looks like a placeholder (contains '{pattern}')"));
    }

    let entropy = entropy_bits(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return insecure(format!(
            "entropy {entropy:.2} bits/char is below {MIN_ENTROPY_BITS_PER_CHAR:.1}; generate it randomly"
        ));
    }

    Ok(())
}

fn required_secret(key: &str, min_len: usize) -> Result<SecretString, ConfigError> {
    let value = required(key)?;
    check_secret(key, &value, min_len)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn backend() -> BackendConfig {
        BackendConfig {
            base_url: parse_base_url("http://localhost:4000/api").unwrap(),
            service_token: Some(SecretString::from("super_secret_service_token")),
            timeout: Duration::from_secs(10),
            totals_cache_ttl: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_entropy_bits() {
        assert!(entropy_bits("").abs() < f64::EPSILON);
        assert!((entropy_bits("abab") - 1.0).abs() < 0.01);
        assert!(entropy_bits("aB3$xY9!mK2@nL5#") > MIN_ENTROPY_BITS_PER_CHAR);
    }

    #[test]
    fn test_check_secret_rejects_short() {
        let err = check_secret("KEY", "aB3$xY9!", 32).unwrap_err();
        assert!(err.to_string().contains("at least 32"));
    }

    #[test]
    fn test_check_secret_rejects_placeholder() {
        let err = check_secret("KEY", "changeme-aB3$xY9!mK2@nL5#pQ7&rT0*", 16).unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[test]
    fn test_check_secret_rejects_repetition() {
        let result = check_secret("KEY", &"ab".repeat(20), 16);
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_check_secret_accepts_random() {
        assert!(check_secret("KEY", "kR7#pX2$vN9@mQ4&wL6*jT8!hF3^zB5%", 32).is_ok());
    }

    #[test]
    fn test_parse_base_url_appends_slash() {
        let url = parse_base_url("https://api.example.test/v1").unwrap();
        assert_eq!(url.as_str(), "https://api.example.test/v1/");
        assert_eq!(
            url.join("cart/sync").unwrap().as_str(),
            "https://api.example.test/v1/cart/sync"
        );
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        assert!(parse_base_url("ftp://api.example.test").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(64)),
            backend: backend(),
            guest_store_quota: DEFAULT_GUEST_STORE_QUOTA,
            rate_limit: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_session_key_requires_full_length() {
        let mut config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("kR7#pX2$vN9@mQ4&wL6*jT8!hF3^zB5%".repeat(2)),
            backend: backend(),
            guest_store_quota: DEFAULT_GUEST_STORE_QUOTA,
            rate_limit: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        assert!(config.session_key().is_ok());

        config.session_secret = SecretString::from("kR7#pX2$vN9@mQ4&wL6*jT8!hF3^zB5%");
        assert!(matches!(
            config.session_key(),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_backend_config_debug_redacts_token() {
        let debug_output = format!("{:?}", backend());
        assert!(debug_output.contains("localhost:4000"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_service_token"));
    }
}
