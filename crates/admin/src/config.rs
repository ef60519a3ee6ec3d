//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## API
//! - `TRACKER_API_BASE_URL` - API base path or absolute URL (default: `/project-tracker/api`)
//! - `TRACKER_API_ORIGIN` - Origin a relative base path is resolved against
//!   (default: `http://127.0.0.1:8069`)
//! - `TRACKER_API_TIMEOUT_MS` - Transport timeout in milliseconds (default: 10000)
//! - `TRACKER_BACKEND` - Service backing, `mock` or `http` (default: mock)
//! - `TRACKER_TOKEN_FILE` - Persistent bearer token location
//!   (default: `.project-tracker/token`)
//!
//! ## Query cache
//! - `TRACKER_QUERY_STALE_SECS` - Freshness window for query results (default: 300)
//! - `TRACKER_QUERY_RETRY` - Automatic retries for failed queries (default: 1)
//!
//! ## Admin web
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3002)
//!
//! ## Observability
//! - `TRACKER_LOG_JSON` - Emit JSON logs when set to `1`/`true`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::query::QueryOptions;
use crate::services::Backend;

const DEFAULT_API_BASE_URL: &str = "/project-tracker/api";
const DEFAULT_API_ORIGIN: &str = "http://127.0.0.1:8069";
const DEFAULT_TIMEOUT_MS: &str = "10000";
const DEFAULT_TOKEN_FILE: &str = ".project-tracker/token";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Remote API configuration
    pub api: ApiConfig,
    /// Which service backing to use
    pub backend: Backend,
    /// Where the bearer token is persisted
    pub token_file: PathBuf,
    /// Query cache defaults
    pub query: QueryOptions,
    /// IP address to bind the admin web server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
}

/// Remote API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Absolute base URL, always ending in `/`
    pub base_url: Url,
    /// Fixed transport timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// API configuration for an absolute base URL with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: resolve_base_url(DEFAULT_API_ORIGIN, base_url)?,
            timeout: Duration::from_millis(10_000),
        })
    }

    /// Override the transport timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable holds an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        let base_url = resolve_base_url(
            &vars.or_default("TRACKER_API_ORIGIN", DEFAULT_API_ORIGIN),
            &vars.or_default("TRACKER_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;
        let timeout_ms: u64 = vars.parsed("TRACKER_API_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;
        let backend: Backend = vars.parsed("TRACKER_BACKEND", "mock")?;
        let token_file = PathBuf::from(vars.or_default("TRACKER_TOKEN_FILE", DEFAULT_TOKEN_FILE));

        let stale_secs: u64 = vars.parsed("TRACKER_QUERY_STALE_SECS", "300")?;
        let retry: u32 = vars.parsed("TRACKER_QUERY_RETRY", "1")?;

        let host: IpAddr = vars.parsed("ADMIN_HOST", "127.0.0.1")?;
        let port: u16 = vars.parsed("ADMIN_PORT", "3002")?;

        let log_json = vars
            .optional("TRACKER_LOG_JSON")
            .is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes"));

        Ok(Self {
            api: ApiConfig {
                base_url,
                timeout: Duration::from_millis(timeout_ms),
            },
            backend,
            token_file,
            query: QueryOptions {
                stale_time: Duration::from_secs(stale_secs),
                retry,
                ..QueryOptions::default()
            },
            host,
            port,
            log_json,
            sentry_dsn: vars.optional("SENTRY_DSN"),
            sentry_environment: vars.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Resolve the API base URL.
///
/// An absolute `base` is used as-is; a relative path is joined onto
/// `origin`. The result always ends in `/` so endpoint paths can be joined.
fn resolve_base_url(origin: &str, base: &str) -> Result<Url, ConfigError> {
    let mut url = match Url::parse(base) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(origin)
            .and_then(|origin| origin.join(base))
            .map_err(|e| ConfigError::InvalidEnvVar("TRACKER_API_ORIGIN".to_string(), e.to_string()))?,
        Err(e) => {
            return Err(ConfigError::InvalidEnvVar(
                "TRACKER_API_BASE_URL".to_string(),
                e.to_string(),
            ));
        }
    };

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "TRACKER_API_BASE_URL".to_string(),
            format!("{url} cannot be used as a base URL"),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Thin accessor over a variable lookup function.
struct Vars<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.is_empty())
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}
