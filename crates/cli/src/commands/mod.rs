//! Command implementations.

pub mod dealers;
pub mod lines;
pub mod token;

use project_tracker_admin::api::CredentialError;
use project_tracker_admin::services::ServiceError;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The resource service failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Credential storage failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Output could not be encoded.
    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
