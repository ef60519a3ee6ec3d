//! Project Tracker Core - Shared types library.
//!
//! This crate provides the types used across all Project Tracker components:
//! - `admin` - Admin web client (list views, data-fetch layer, API client)
//! - `cli` - Command-line access to the same services
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure functions - no I/O,
//! no HTTP clients. The envelope normalizer works on an already received
//! status code and body so it can be used (and tested) without a transport.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and entity status
//! - [`envelope`] - Wire envelope and the response normalizer
//! - [`error`] - [`DomainError`], the single normalized API error
//! - [`resource`] - The [`Resource`] trait implemented by every entity
//! - [`entities`] - Line accounts and Dealer records with their DTOs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod entities;
pub mod envelope;
pub mod error;
pub mod resource;
pub mod types;

pub use entities::*;
pub use envelope::{DeleteAck, Envelope, ListPayload, normalize};
pub use error::{DomainError, ErrorKind};
pub use resource::Resource;
pub use types::*;

#[doc(hidden)]
pub mod __private {
    pub use uuid::Uuid;
}
