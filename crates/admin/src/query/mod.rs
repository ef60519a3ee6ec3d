//! Data-fetch layer.
//!
//! A [`QueryClient`] caches query results by [`QueryKey`] for a fixed
//! freshness window, coalesces concurrent identical fetches into one service
//! call, and retries failed fetches. [`ResourceQueries`] binds a client to
//! one resource service and exposes the list/get queries and the
//! create/update/delete mutations that invalidate them.

pub mod cache;
pub mod resource;

use std::fmt;
use std::time::Duration;

pub use cache::QueryClient;
pub use resource::ResourceQueries;

/// Default freshness window of a cached query result.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Cache behaviour shared by every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long a result is served from cache before it is refetched.
    pub stale_time: Duration,
    /// Extra attempts after a failed fetch.
    pub retry: u32,
    /// Pause before each retry.
    pub retry_delay: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            retry: 1,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Identity of a cached query: `(resource)` or `(resource, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub resource: &'static str,
    pub id: Option<String>,
}

impl QueryKey {
    /// Key of the whole collection.
    #[must_use]
    pub const fn collection(resource: &'static str) -> Self {
        Self { resource, id: None }
    }

    /// Key of one entity.
    #[must_use]
    pub fn entity(resource: &'static str, id: impl Into<String>) -> Self {
        Self {
            resource,
            id: Some(id.into()),
        }
    }

    /// Whether `self` is `prefix` or lies under it.
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.resource == prefix.resource
            && match (&prefix.id, &self.id) {
                (None, _) => true,
                (Some(a), Some(b)) => a == b,
                (Some(_), None) => false,
            }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "[{}, {id}]", self.resource),
            None => write!(f, "[{}]", self.resource),
        }
    }
}

/// Observable state of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult<T> {
    pub data: T,
    pub loading: bool,
    /// Message of the API error that failed the query.
    pub error: Option<String>,
}

impl<T> QueryResult<T> {
    #[must_use]
    pub const fn ready(data: T) -> Self {
        Self {
            data,
            loading: false,
            error: None,
        }
    }

    #[must_use]
    pub const fn failed(data: T, message: String) -> Self {
        Self {
            data,
            loading: false,
            error: Some(message),
        }
    }
}

/// Which mutation a status belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

/// Outcome of the most recent run of a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error(String),
}
