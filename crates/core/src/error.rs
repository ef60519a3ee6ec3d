//! The normalized API error.
//!
//! Every failure that originates from the transport or from the server's
//! envelope is turned into a [`DomainError`] before it reaches application
//! code. The [`ErrorKind`] tag records which path produced it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback message for a business error whose envelope carries no message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "unknown error";

/// Fallback message for a non-2xx envelope without a message.
pub const REQUEST_FAILED_MESSAGE: &str = "request failed";

/// Message used when the transport timed out.
pub const TIMEOUT_MESSAGE: &str = "request timed out";

/// Fallback message for a network failure without its own description.
pub const CONNECTION_FAILED_MESSAGE: &str = "connection failed";

/// Which path of the normalizer produced a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Non-zero `ErrorCode` on a successful (2xx) round trip.
    Business,
    /// Non-2xx HTTP status, with or without a parseable envelope.
    Transport,
    /// No response before the transport timeout elapsed.
    Timeout,
    /// No response at all (DNS, refused connection, reset, ...).
    Network,
}

/// Normalized API error.
///
/// `error_code` is the envelope's `ErrorCode` when one was received, the HTTP
/// status for a non-envelope error response, and `0` when no response
/// arrived at all.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{error_message}")]
#[serde(rename_all = "camelCase")]
pub struct DomainError {
    pub kind: ErrorKind,
    pub error_code: i64,
    pub error_message: String,
    pub transport_status: Option<u16>,
}

impl DomainError {
    /// Business error: 2xx response whose envelope carries a non-zero code.
    #[must_use]
    pub fn business(error_code: i64, error_message: Option<String>, status: u16) -> Self {
        Self {
            kind: ErrorKind::Business,
            error_code,
            error_message: error_message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string()),
            transport_status: Some(status),
        }
    }

    /// Error response (non-2xx) that still carried an envelope.
    #[must_use]
    pub fn rejected(error_code: i64, error_message: Option<String>, status: u16) -> Self {
        Self {
            kind: ErrorKind::Transport,
            error_code,
            error_message: error_message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| REQUEST_FAILED_MESSAGE.to_string()),
            transport_status: Some(status),
        }
    }

    /// Error response without a parseable envelope.
    #[must_use]
    pub fn http(status: u16, message: &str) -> Self {
        Self {
            kind: ErrorKind::Transport,
            error_code: i64::from(status),
            error_message: format!("HTTP {status}: {message}"),
            transport_status: Some(status),
        }
    }

    /// The transport gave up waiting for a response.
    #[must_use]
    pub fn timeout() -> Self {
        Self {
            kind: ErrorKind::Timeout,
            error_code: 0,
            error_message: TIMEOUT_MESSAGE.to_string(),
            transport_status: None,
        }
    }

    /// No response was received for a reason other than a timeout.
    #[must_use]
    pub fn network(message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| CONNECTION_FAILED_MESSAGE.to_string());
        Self {
            kind: ErrorKind::Network,
            error_code: 0,
            error_message: message,
            transport_status: None,
        }
    }

    /// Whether the server rejected our credentials.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.transport_status == Some(401)
    }
}
