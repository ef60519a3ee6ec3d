//! Line accounts list route handler.

use askama::Template;
use axum::{extract::State, response::Html};
use project_tracker_core::Line;
use tracing::instrument;

use super::{format_timestamp, render, status_badge};
use crate::{error::AppError, state::AppState};

/// Line account view for templates.
#[derive(Debug, Clone)]
pub struct LineView {
    pub id: String,
    pub name: String,
    pub line_id: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub created_at: String,
}

impl From<&Line> for LineView {
    fn from(line: &Line) -> Self {
        let (status, status_label) = status_badge(line.status);
        Self {
            id: line.id.to_string(),
            name: line.name.clone(),
            line_id: line.line_id.clone(),
            status,
            status_label,
            created_at: format_timestamp(line.created_at),
        }
    }
}

/// Line accounts page template.
#[derive(Template)]
#[template(path = "lines/index.html")]
pub struct LinesIndexTemplate {
    pub current_path: &'static str,
    pub loading: bool,
    pub error: Option<String>,
    pub lines: Vec<LineView>,
}

/// Line accounts page handler.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let result = state.lines().list().await?;

    if let Some(error) = &result.error {
        tracing::warn!(error = %error, "Failed to load Line accounts");
    }

    let template = LinesIndexTemplate {
        current_path: "/line",
        loading: result.loading,
        error: result.error,
        lines: result.data.iter().map(LineView::from).collect(),
    };

    Ok(render(&template))
}
