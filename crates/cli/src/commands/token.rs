//! Bearer token commands.
//!
//! The token lives in `TRACKER_TOKEN_FILE` and is attached to every request
//! the HTTP backend sends. The server clears it by answering 401.

use std::sync::Arc;

use project_tracker_admin::AdminConfig;
use project_tracker_admin::api::{CredentialStore, credentials};
use secrecy::{ExposeSecret, SecretString};

use super::CommandError;

/// Store backing the token commands.
pub fn store(config: &AdminConfig) -> Arc<dyn CredentialStore> {
    credentials::file(&config.token_file)
}

pub async fn set(store: &dyn CredentialStore, token: String) -> Result<(), CommandError> {
    store.set_token(SecretString::from(token)).await?;
    println!("Token stored");
    Ok(())
}

pub async fn clear(store: &dyn CredentialStore) -> Result<(), CommandError> {
    store.clear().await?;
    println!("Token cleared");
    Ok(())
}

pub async fn show(store: &dyn CredentialStore) {
    match store.token().await {
        Some(token) => println!("Token stored: {}", redact(token.expose_secret())),
        None => println!("No token stored"),
    }
}

/// First four characters followed by an ellipsis.
fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{prefix}…")
}
