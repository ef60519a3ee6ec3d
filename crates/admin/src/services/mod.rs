//! Resource services.
//!
//! # Backings
//!
//! - `mock` - In-memory store seeded with fixture records
//! - `http` - Remote Project Tracker API via [`ApiClient`]
//!
//! Both implement [`ResourceService`] for every [`Resource`], so the query
//! layer and the views never know which one they are talking to.

pub mod http;
pub mod mock;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use project_tracker_core::{Dealer, DomainError, Line, Resource};
use thiserror::Error;

use crate::api::{ApiClient, credentials};
use crate::config::AdminConfig;

pub use http::HttpService;
pub use mock::MockService;

/// Errors returned by a [`ResourceService`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The API (or its transport) reported a failure.
    #[error(transparent)]
    Api(#[from] DomainError),

    /// Lookup miss in a local store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The id cannot address a single record.
    #[error("Invalid id: {0:?}")]
    InvalidId(String),
}

impl ServiceError {
    /// The normalized API error, if this is one.
    #[must_use]
    pub const fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Api(e) => Some(e),
            Self::NotFound(_) | Self::InvalidId(_) => None,
        }
    }
}

/// CRUD operations over one resource type.
#[async_trait]
pub trait ResourceService<R: Resource>: Send + Sync {
    /// All records, in a stable order.
    async fn list_all(&self) -> Result<Vec<R>, ServiceError>;

    /// One record by id.
    async fn get_by_id(&self, id: &R::Id) -> Result<R, ServiceError>;

    /// Create a record; the backing assigns id, status and timestamps.
    async fn create(&self, input: R::Create) -> Result<R, ServiceError>;

    /// Merge the present fields of `input` into the record it targets.
    async fn update(&self, input: R::Update) -> Result<R, ServiceError>;

    /// Remove a record. Deleting a missing id succeeds.
    async fn delete(&self, id: &R::Id) -> Result<(), ServiceError>;
}

/// Which implementation backs the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Mock,
    Http,
}

impl Backend {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Http => "http",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "http" => Ok(Self::Http),
            other => Err(format!("unknown backend '{other}', expected mock or http")),
        }
    }
}

/// The services for every managed resource.
#[derive(Clone)]
pub struct Services {
    pub lines: Arc<dyn ResourceService<Line>>,
    pub dealers: Arc<dyn ResourceService<Dealer>>,
}

impl Services {
    /// Services for the configured [`Backend`].
    ///
    /// The HTTP backing reads its bearer token from `config.token_file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &AdminConfig) -> Result<Self, reqwest::Error> {
        match config.backend {
            Backend::Mock => Ok(Self::mock()),
            Backend::Http => {
                let client = ApiClient::new(&config.api, credentials::file(&config.token_file))?;
                tracing::info!(base_url = %client.base_url(), "Using HTTP backend");
                Ok(Self::http(&client))
            }
        }
    }

    /// In-memory services seeded with the fixture records.
    #[must_use]
    pub fn mock() -> Self {
        Self {
            lines: Arc::new(MockService::new(mock::line_fixtures())),
            dealers: Arc::new(MockService::new(mock::dealer_fixtures())),
        }
    }

    /// Services backed by the remote API.
    #[must_use]
    pub fn http(client: &ApiClient) -> Self {
        Self {
            lines: Arc::new(HttpService::<Line>::new(client.clone())),
            dealers: Arc::new(HttpService::<Dealer>::new(client.clone())),
        }
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parse() {
        assert_eq!("mock".parse::<Backend>().unwrap(), Backend::Mock);
        assert_eq!(" HTTP ".parse::<Backend>().unwrap(), Backend::Http);
        assert!("grpc".parse::<Backend>().is_err());
        assert_eq!(Backend::default(), Backend::Mock);
    }

    #[test]
    fn test_service_error_display() {
        let err = ServiceError::NotFound("line 999".to_string());
        assert_eq!(err.to_string(), "Not found: line 999");
        assert!(err.as_domain().is_none());

        let err = ServiceError::from(DomainError::business(1001, Some("名稱重複".into()), 200));
        assert_eq!(err.to_string(), "名稱重複");
        assert_eq!(err.as_domain().map(|e| e.error_code), Some(1001));
    }
}
