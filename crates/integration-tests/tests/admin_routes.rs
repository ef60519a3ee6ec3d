//! Integration tests for the admin pages rendered against the stub backend.

use std::collections::HashMap;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use project_tracker_admin::config::AdminConfig;
use project_tracker_admin::routes::routes;
use project_tracker_admin::AppState;
use project_tracker_integration_tests::{API_PREFIX, CannedResponse, StubBackend};
use tower::ServiceExt;

/// Admin app configured through variables to use the HTTP backing.
fn app(stub: &StubBackend, token_dir: &tempfile::TempDir) -> Router {
    let token_file = token_dir.path().join("token");
    std::fs::write(&token_file, "admin-token").unwrap();

    let origin = stub
        .base_url()
        .trim_end_matches(API_PREFIX)
        .to_string();
    let vars = HashMap::from([
        ("TRACKER_BACKEND", "http".to_string()),
        ("TRACKER_API_ORIGIN", origin),
        ("TRACKER_API_BASE_URL", API_PREFIX.to_string()),
        ("TRACKER_TOKEN_FILE", token_file.display().to_string()),
    ]);

    let mut config = AdminConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
    config.query.retry_delay = Duration::ZERO;

    routes().with_state(AppState::from_config(config).unwrap())
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
async fn test_line_page_lists_remote_accounts() {
    let stub = StubBackend::seeded().await;
    let dir = tempfile::tempdir().unwrap();

    let (status, body) = get(app(&stub, &dir), "/line").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>Line 管理</h1>"));
    assert!(body.contains("Line 官方帳號"));
    assert!(body.contains("@example"));
    assert!(body.contains("啟用"));
    assert_eq!(
        stub.requests()[0].authorization.as_deref(),
        Some("Bearer admin-token")
    );
}

#[tokio::test]
async fn test_dealer_page_lists_remote_dealers() {
    let stub = StubBackend::seeded().await;
    let dir = tempfile::tempdir().unwrap();

    let (status, body) = get(app(&stub, &dir), "/dealer").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>經銷商管理</h1>"));
    assert!(body.contains("經銷商 A"));
    assert!(body.contains("DEALER_B"));
    assert!(body.contains("mailto:dealer-a@example.com"));
}

#[tokio::test]
async fn test_empty_collection_renders_empty_state() {
    let stub = StubBackend::start().await;
    let dir = tempfile::tempdir().unwrap();

    let (status, body) = get(app(&stub, &dir), "/dealer").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("目前沒有經銷商"));
}

#[tokio::test]
async fn test_api_error_renders_error_panel() {
    let stub = StubBackend::seeded().await;
    let dir = tempfile::tempdir().unwrap();
    stub.enqueue(CannedResponse::failure(200, 1001, "系統維護中"));
    stub.enqueue(CannedResponse::failure(200, 1001, "系統維護中"));

    let (status, body) = get(app(&stub, &dir), "/line").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("錯誤：系統維護中"));
    assert!(!body.contains("<h1>Line 管理</h1>"));
    assert_eq!(stub.count("GET", "/lines"), 2);
}

#[tokio::test]
async fn test_unauthorized_clears_token_file() {
    let stub = StubBackend::seeded().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&stub, &dir);
    stub.enqueue(CannedResponse::failure(401, 401, "請重新登入"));
    stub.enqueue(CannedResponse::failure(401, 401, "請重新登入"));

    let (status, body) = get(app, "/line").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("錯誤：請重新登入"));
    assert!(!dir.path().join("token").exists());
}

#[tokio::test]
async fn test_navigation_highlights_current_page() {
    let stub = StubBackend::seeded().await;
    let dir = tempfile::tempdir().unwrap();

    let (_, body) = get(app(&stub, &dir), "/dealer").await;

    assert!(body.contains(r#"href="/dealer" class="active""#));
    assert!(!body.contains(r#"href="/line" class="active""#));
}
