//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Line accounts
//! GET  /line                   - Line account listing
//!
//! # Dealers
//! GET  /dealer                 - Dealer listing
//!
//! *                            - 404 page
//! ```

pub mod dealers;
pub mod lines;

use askama::Template;
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
};
use chrono::{DateTime, Utc};
use project_tracker_core::EntityStatus;

use crate::state::AppState;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/line", get(lines::index))
        .route("/dealer", get(dealers::index))
        .fallback(not_found)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// 404 page template.
#[derive(Template)]
#[template(path = "errors/not_found.html")]
pub struct NotFoundTemplate {
    pub current_path: &'static str,
}

/// Fallback handler for unmatched paths.
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        render(&NotFoundTemplate { current_path: "" }),
    )
}

/// Render a template, logging and masking render failures.
pub(crate) fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Display format for creation times.
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y/%m/%d %H:%M:%S").to_string()
}

/// CSS class and label of a status badge.
pub(crate) const fn status_badge(status: EntityStatus) -> (&'static str, &'static str) {
    (status.as_str(), status.label())
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use chrono::TimeZone;
    use tower::ServiceExt;

    use super::*;
    use crate::config::AdminConfig;
    use crate::services::Services;

    fn app() -> Router {
        let config = AdminConfig::from_lookup(|_| None).unwrap();
        routes().with_state(AppState::new(config, Services::mock()))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_unknown_path_renders_not_found_page() {
        let (status, body) = get(app(), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("404"));
        assert!(body.contains("找不到頁面"));
        assert!(body.contains("抱歉，您訪問的頁面不存在或已被移除。"));
        assert!(body.contains(r#"href="/line""#));
        assert!(body.contains(r#"href="/dealer""#));
        assert!(body.contains("如果您認為這是一個錯誤，請聯繫系統管理員。"));
    }

    #[tokio::test]
    async fn test_root_is_not_routed() {
        let (status, _) = get(app(), "/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_format_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(format_timestamp(at), "2024/03/09 14:05:07");
    }

    #[test]
    fn test_status_badge() {
        assert_eq!(status_badge(EntityStatus::Active), ("active", "啟用"));
        assert_eq!(status_badge(EntityStatus::Inactive), ("inactive", "停用"));
    }
}
