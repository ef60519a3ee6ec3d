//! Dealers list route handler.

use askama::Template;
use axum::{extract::State, response::Html};
use project_tracker_core::Dealer;
use tracing::instrument;

use super::{format_timestamp, render, status_badge};
use crate::{error::AppError, state::AppState};

/// Dealer view for templates.
#[derive(Debug, Clone)]
pub struct DealerView {
    pub id: String,
    pub name: String,
    pub code: String,
    pub contact: String,
    pub email: String,
    pub phone: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub created_at: String,
}

impl From<&Dealer> for DealerView {
    fn from(dealer: &Dealer) -> Self {
        let (status, status_label) = status_badge(dealer.status);
        Self {
            id: dealer.id.to_string(),
            name: dealer.name.clone(),
            code: dealer.code.clone(),
            contact: dealer.contact.clone(),
            email: dealer.email.clone(),
            phone: dealer.phone.clone(),
            status,
            status_label,
            created_at: format_timestamp(dealer.created_at),
        }
    }
}

/// Dealers page template.
#[derive(Template)]
#[template(path = "dealers/index.html")]
pub struct DealersIndexTemplate {
    pub current_path: &'static str,
    pub loading: bool,
    pub error: Option<String>,
    pub dealers: Vec<DealerView>,
}

/// Dealers page handler.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let result = state.dealers().list().await?;

    if let Some(error) = &result.error {
        tracing::warn!(error = %error, "Failed to load dealers");
    }

    let template = DealersIndexTemplate {
        current_path: "/dealer",
        loading: result.loading,
        error: result.error,
        dealers: result.data.iter().map(DealerView::from).collect(),
    };

    Ok(render(&template))
}
