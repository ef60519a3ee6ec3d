//! Bearer credential providers.
//!
//! The API client never reaches for ambient storage; it is handed a
//! [`CredentialStore`] and asks it for the current token before every
//! request. A 401 response clears the store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from persisting credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Reading or writing the token file failed.
    #[error("Credential storage error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Refused to store an empty token.
    #[error("Token must not be empty")]
    EmptyToken,
}

/// Source of the bearer token attached to outbound requests.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Current token, if one is stored.
    async fn token(&self) -> Option<SecretString>;

    /// Replace the stored token.
    async fn set_token(&self, token: SecretString) -> Result<(), CredentialError>;

    /// Forget the stored token. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<(), CredentialError>;
}

/// In-process credential store.
pub fn memory() -> Arc<dyn CredentialStore> {
    Arc::new(MemoryCredentialStore::default())
}

/// Credential store persisted as a single-line file.
pub fn file(path: impl Into<PathBuf>) -> Arc<dyn CredentialStore> {
    Arc::new(FileCredentialStore::new(path))
}

/// Token held in memory for the lifetime of the process.
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<SecretString>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(SecretString::from(token.into()))),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn token(&self) -> Option<SecretString> {
        self.token
            .read()
            .await
            .as_ref()
            .map(|t| SecretString::from(t.expose_secret().to_owned()))
    }

    async fn set_token(&self, token: SecretString) -> Result<(), CredentialError> {
        if token.expose_secret().trim().is_empty() {
            return Err(CredentialError::EmptyToken);
        }
        *self.token.write().await = Some(token);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialError> {
        *self.token.write().await = None;
        Ok(())
    }
}

/// Token persisted on disk so it survives restarts.
///
/// A missing or blank file means "no token".
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CredentialError {
        CredentialError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl std::fmt::Debug for FileCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCredentialStore")
            .field("path", &self.path)
            .finish()
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn token(&self) -> Option<SecretString> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| SecretString::from(token.to_owned()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read token file");
                None
            }
        }
    }

    async fn set_token(&self, token: SecretString) -> Result<(), CredentialError> {
        let value = token.expose_secret().trim();
        if value.is_empty() {
            return Err(CredentialError::EmptyToken);
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        tokio::fs::write(&self.path, format!("{value}\n"))
            .await
            .map_err(|e| self.io_error(e))
    }

    async fn clear(&self) -> Result<(), CredentialError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}
