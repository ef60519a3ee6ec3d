//! Project Tracker API access.
//!
//! - [`client`]: reqwest-based client that normalizes every response envelope
//! - [`credentials`]: bearer token providers (memory, file)

pub mod client;
pub mod credentials;

pub use client::ApiClient;
pub use credentials::{
    CredentialError, CredentialStore, FileCredentialStore, MemoryCredentialStore,
};
