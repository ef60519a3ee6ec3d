//! Unified error handling for admin.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::CredentialError;
use crate::config::ConfigError;
use crate::services::ServiceError;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// A resource service failed outside the API error taxonomy.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// Credential storage failed.
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Service(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Service(ServiceError::InvalidId(_)) => StatusCode::BAD_REQUEST,
            Self::Service(ServiceError::Api(_)) => StatusCode::BAD_GATEWAY,
            Self::Config(_) | Self::Client(_) | Self::Credential(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Service(_) => self.to_string(),
            _ => "Internal server error".to_string(),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use project_tracker_core::DomainError;

    use super::*;

    #[test]
    fn test_status_codes() {
        let not_found = AppError::from(ServiceError::NotFound("lines 9".into())).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let upstream =
            AppError::from(ServiceError::Api(DomainError::timeout())).into_response();
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);

        let rejected =
            AppError::from(ServiceError::InvalidId("..".into())).into_response();
        assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

        let internal = AppError::Config(ConfigError::InvalidEnvVar(
            "ADMIN_PORT".into(),
            "invalid digit found in string".into(),
        ))
        .into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config(ConfigError::InvalidEnvVar(
            "ADMIN_PORT".into(),
            "number too large to fit in target type".into(),
        ));
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid environment variable ADMIN_PORT: number too large to fit in target type"
        );
    }
}
