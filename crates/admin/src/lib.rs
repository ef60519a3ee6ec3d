//! Project Tracker admin library.
//!
//! Admin client for Line official accounts and dealers:
//!
//! - [`api`]: REST client that normalizes the server's response envelope
//! - [`services`]: CRUD services with in-memory and HTTP backings
//! - [`query`]: cached, deduplicated data-fetch layer with invalidation
//! - [`routes`]: server-rendered list views and the router

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod query;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;

pub use config::AdminConfig;
pub use error::AppError;
pub use state::AppState;
