//! Wire envelope and response normalizer.
//!
//! Every server response is wrapped in the same envelope:
//!
//! ```json
//! { "Data": { "items": [], "total": 0 }, "ErrorCode": 0, "ErrorMessage": null }
//! ```
//!
//! `ErrorCode == 0` signals success. `Data` is always an object; collections
//! are wrapped in [`ListPayload`].
//!
//! [`normalize`] turns a received status code and body into either the
//! unwrapped payload or a [`DomainError`]. Failures where no response was
//! received at all (timeouts, network errors) are mapped by the transport
//! layer via [`DomainError::timeout`] and [`DomainError::network`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

const ERROR_CODE_FIELD: &str = "ErrorCode";
const ERROR_MESSAGE_FIELD: &str = "ErrorMessage";

/// Uniform server response wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "Data")]
    pub data: T,
    #[serde(rename = "ErrorCode")]
    pub error_code: i64,
    #[serde(rename = "ErrorMessage", default)]
    pub error_message: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `data`.
    pub const fn success(data: T) -> Self {
        Self {
            data,
            error_code: 0,
            error_message: None,
        }
    }

    /// Failed envelope; `data` should be an empty aggregate, never null.
    pub fn failure(data: T, error_code: i64, error_message: impl Into<String>) -> Self {
        Self {
            data,
            error_code,
            error_message: Some(error_message.into()),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error_code == 0
    }

    /// Unwrap the payload of an envelope received with a 2xx `status`.
    ///
    /// # Errors
    ///
    /// Returns a business [`DomainError`] if `error_code` is non-zero.
    pub fn into_data(self, status: u16) -> Result<T, DomainError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(DomainError::business(
                self.error_code,
                self.error_message,
                status,
            ))
        }
    }
}

/// Envelope as received, before its `Data` is interpreted.
///
/// `Data` is optional here so a failed envelope without a payload is still
/// reported as the business error it carries.
#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "Data", default)]
    data: serde_json::Value,
    #[serde(rename = "ErrorCode")]
    error_code: i64,
    #[serde(rename = "ErrorMessage", default)]
    error_message: Option<String>,
}

/// Collection payload: `{ "items": [...], "total": N }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPayload<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> ListPayload<T> {
    /// Wrap `items`, using their count as the total.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        Self { items, total }
    }
}

impl<T> Default for ListPayload<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// Delete acknowledgement: `{ "deleted": true }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteAck {
    pub deleted: bool,
}

/// Normalize a received response into its payload or a [`DomainError`].
///
/// * `status` - HTTP status code of the response
/// * `body` - raw response body
/// * `reason` - transport description used when an error response has no
///   envelope (typically the canonical status reason)
///
/// # Errors
///
/// - 2xx with a non-zero `ErrorCode`: business error with the envelope's code
///   and message.
/// - 2xx whose body is not an envelope, or whose `Data` does not match `T`:
///   transport error carrying the HTTP status.
/// - non-2xx with an envelope (`ErrorCode` and `ErrorMessage` keys present):
///   transport error with the envelope's code and message.
/// - non-2xx without an envelope: transport error `HTTP <status>: <reason>`.
pub fn normalize<T: DeserializeOwned>(
    status: u16,
    body: &[u8],
    reason: &str,
) -> Result<T, DomainError> {
    if !(200..300).contains(&status) {
        return Err(rejection(status, body, reason));
    }

    let envelope: RawEnvelope = serde_json::from_slice(body)
        .map_err(|e| DomainError::http(status, &format!("invalid response envelope: {e}")))?;

    let data = Envelope {
        data: envelope.data,
        error_code: envelope.error_code,
        error_message: envelope.error_message,
    }
    .into_data(status)?;

    serde_json::from_value(data)
        .map_err(|e| DomainError::http(status, &format!("unexpected response data: {e}")))
}

/// Build the error for a non-2xx response.
fn rejection(status: u16, body: &[u8], reason: &str) -> DomainError {
    let Ok(serde_json::Value::Object(fields)) = serde_json::from_slice(body) else {
        return DomainError::http(status, reason);
    };

    if !fields.contains_key(ERROR_CODE_FIELD) || !fields.contains_key(ERROR_MESSAGE_FIELD) {
        return DomainError::http(status, reason);
    }

    let Some(error_code) = fields.get(ERROR_CODE_FIELD).and_then(serde_json::Value::as_i64)
    else {
        return DomainError::http(status, reason);
    };

    let error_message = fields
        .get(ERROR_MESSAGE_FIELD)
        .and_then(serde_json::Value::as_str)
        .map(String::from);

    DomainError::rejected(error_code, error_message, status)
}
