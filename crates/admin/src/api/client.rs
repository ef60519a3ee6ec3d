//! Project Tracker REST API client.
//!
//! Every response goes through [`normalize`], so callers only ever see the
//! unwrapped `Data` payload or a [`DomainError`].

use std::sync::Arc;
use std::time::Duration;

use project_tracker_core::{DomainError, normalize};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::credentials::CredentialStore;
use crate::config::ApiConfig;

/// HTTP client for the Project Tracker API.
///
/// Cheap to clone; all clones share one connection pool and one
/// credential store.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    credentials: Arc<dyn CredentialStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for `config`, reading bearer tokens from `credentials`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        config: &ApiConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                timeout: config.timeout,
                credentials,
            }),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The credential store consulted before each request.
    #[must_use]
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.credentials
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    /// `GET {base}/{path}`.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`DomainError`] on any failure.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, DomainError> {
        self.send::<(), T>(Method::GET, path, None).await
    }

    /// `POST {base}/{path}` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`DomainError`] on any failure.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, DomainError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body)).await
    }

    /// `PUT {base}/{path}` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`DomainError`] on any failure.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, DomainError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, Some(body)).await
    }

    /// `DELETE {base}/{path}`.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`DomainError`] on any failure.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, DomainError> {
        self.send::<(), T>(Method::DELETE, path, None).await
    }

    // =========================================================================
    // Transport
    // =========================================================================

    #[instrument(skip(self, body), fields(method = %method, path = %path))]
    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, DomainError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let mut request = self.inner.client.request(method, url);

        if let Some(token) = self.inner.credentials.token().await {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(transport_error)?;

        let result = normalize(
            status.as_u16(),
            &bytes,
            status.canonical_reason().unwrap_or("Unknown Status"),
        );

        if let Err(error) = &result {
            self.on_rejected(status, error).await;
        }

        result
    }

    /// Side effects of an error response.
    async fn on_rejected(&self, status: StatusCode, error: &DomainError) {
        match status {
            StatusCode::UNAUTHORIZED => {
                tracing::error!(
                    error_code = error.error_code,
                    error = %error,
                    "Unauthorized, clearing stored token"
                );
                if let Err(e) = self.inner.credentials.clear().await {
                    tracing::warn!(error = %e, "Failed to clear stored token");
                }
            }
            StatusCode::FORBIDDEN => {
                tracing::warn!(error_code = error.error_code, error = %error, "Permission denied");
            }
            _ => {
                tracing::debug!(status = status.as_u16(), error = %error, "API request failed");
            }
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, DomainError> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| DomainError::network(Some(format!("invalid request path {path}: {e}"))))
    }
}

/// Map a failure where no usable response was received.
fn transport_error(error: reqwest::Error) -> DomainError {
    if error.is_timeout() {
        DomainError::timeout()
    } else {
        DomainError::network(Some(error.to_string()))
    }
}
