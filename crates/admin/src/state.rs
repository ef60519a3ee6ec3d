//! Application state shared across handlers.

use std::sync::Arc;

use project_tracker_core::{Dealer, Line};

use crate::config::AdminConfig;
use crate::error::AppError;
use crate::query::ResourceQueries;
use crate::services::Services;

/// Application state shared across all handlers.
///
/// Cheap to clone; holds one query layer per resource.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    lines: ResourceQueries<Line>,
    dealers: ResourceQueries<Dealer>,
}

impl AppState {
    /// Wire the query layer over `services`.
    #[must_use]
    pub fn new(config: AdminConfig, services: Services) -> Self {
        let lines = ResourceQueries::new(services.lines, config.query);
        let dealers = ResourceQueries::new(services.dealers, config.query);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                lines,
                dealers,
            }),
        }
    }

    /// Build services for the configured backend and wire them up.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: AdminConfig) -> Result<Self, AppError> {
        let services = Services::from_config(&config)?;
        Ok(Self::new(config, services))
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn lines(&self) -> &ResourceQueries<Line> {
        &self.inner.lines
    }

    #[must_use]
    pub fn dealers(&self) -> &ResourceQueries<Dealer> {
        &self.inner.dealers
    }
}
