//! Integration tests for Project Tracker.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p project-tracker-integration-tests
//! ```
//!
//! Tests run the admin client against a [`StubBackend`]: an in-process axum
//! server on an ephemeral port that speaks the Project Tracker envelope
//! protocol. The stub keeps Line accounts and dealers in memory, records
//! every request it sees and can be told to answer the next requests with
//! canned responses.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use project_tracker_admin::config::ApiConfig;
use project_tracker_core::{
    DeleteAck, Dealer, Envelope, Identifier, Line, ListPayload, Resource,
};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// Path prefix the stub serves the API under.
pub const API_PREFIX: &str = "/project-tracker/api";

/// A request observed by the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

/// Canned response served instead of the normal handler.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl CannedResponse {
    /// A JSON body with the given status.
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    /// A raw (non-JSON) body with the given status.
    #[must_use]
    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
        }
    }

    /// Envelope with a non-zero error code.
    #[must_use]
    pub fn failure(status: u16, error_code: i64, message: &str) -> Self {
        Self::json(
            status,
            &json!({ "Data": {}, "ErrorCode": error_code, "ErrorMessage": message }),
        )
    }

    /// Delay the response.
    #[must_use]
    pub const fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Default)]
struct StubInner {
    lines: Vec<Line>,
    dealers: Vec<Dealer>,
    canned: VecDeque<CannedResponse>,
    requests: Vec<RecordedRequest>,
    delay: Option<Duration>,
}

#[derive(Clone, Default)]
struct StubState {
    inner: Arc<Mutex<StubInner>>,
}

impl StubState {
    fn lock(&self) -> MutexGuard<'_, StubInner> {
        // Ignore poisoning left by a panicked test.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Collections the stub can serve.
trait StubCollection: Resource {
    fn records(inner: &mut StubInner) -> &mut Vec<Self>;
}

impl StubCollection for Line {
    fn records(inner: &mut StubInner) -> &mut Vec<Self> {
        &mut inner.lines
    }
}

impl StubCollection for Dealer {
    fn records(inner: &mut StubInner) -> &mut Vec<Self> {
        &mut inner.dealers
    }
}

/// In-process Project Tracker API.
pub struct StubBackend {
    addr: SocketAddr,
    state: StubState,
    server: JoinHandle<()>,
}

impl StubBackend {
    /// Start an empty stub on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = StubState::default();

        let api = Router::new()
            .route("/lines", get(list::<Line>).post(create::<Line>))
            .route(
                "/lines/{id}",
                get(show::<Line>).put(update::<Line>).delete(remove::<Line>),
            )
            .route("/dealers", get(list::<Dealer>).post(create::<Dealer>))
            .route(
                "/dealers/{id}",
                get(show::<Dealer>)
                    .put(update::<Dealer>)
                    .delete(remove::<Dealer>),
            );

        let app = Router::new()
            .nest(API_PREFIX, api)
            .layer(middleware::from_fn_with_state(state.clone(), intercept))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub backend address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Start a stub preloaded with the admin's fixture records.
    pub async fn seeded() -> Self {
        let stub = Self::start().await;
        {
            let mut inner = stub.state.lock();
            inner.lines = project_tracker_admin::services::mock::line_fixtures();
            inner.dealers = project_tracker_admin::services::mock::dealer_fixtures();
        }
        stub
    }

    /// Absolute API base URL, e.g. `http://127.0.0.1:4321/project-tracker/api`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}{API_PREFIX}", self.addr)
    }

    /// Client configuration pointing at this stub.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(&self.base_url()).expect("stub base url")
    }

    /// Serve `response` to the next request that reaches the stub.
    pub fn enqueue(&self, response: CannedResponse) {
        self.state.lock().canned.push_back(response);
    }

    /// Delay every normal response by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().delay = Some(delay);
    }

    /// Requests observed so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    /// Number of requests with `method` to `path` (path relative to the API prefix).
    #[must_use]
    pub fn count(&self, method: &str, path: &str) -> usize {
        let full = format!("{API_PREFIX}{path}");
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == full)
            .count()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<Line> {
        self.state.lock().lines.clone()
    }

    #[must_use]
    pub fn dealers(&self) -> Vec<Dealer> {
        self.state.lock().dealers.clone()
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Middleware
// =============================================================================

/// Record the request, then serve a canned response if one is queued.
async fn intercept(State(state): State<StubState>, request: Request, next: Next) -> Response {
    let (canned, delay) = {
        let mut inner = state.lock();
        inner.requests.push(RecordedRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            authorization: request
                .headers()
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(String::from),
        });
        (inner.canned.pop_front(), inner.delay)
    };

    if let Some(canned) = canned {
        if let Some(delay) = canned.delay {
            tokio::time::sleep(delay).await;
        }
        let status = StatusCode::from_u16(canned.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Body::from(canned.body))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response());
    }

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    next.run(request).await
}

// =============================================================================
// Handlers
// =============================================================================

fn not_found(collection: &str, id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(Envelope::failure(
            json!({}),
            404,
            format!("{collection} {id} not found"),
        )),
    )
        .into_response()
}

async fn list<R: StubCollection>(State(state): State<StubState>) -> Json<Envelope<ListPayload<R>>> {
    let items = R::records(&mut state.lock()).clone();
    Json(Envelope::success(ListPayload::new(items)))
}

async fn show<R: StubCollection>(State(state): State<StubState>, Path(id): Path<String>) -> Response {
    let found = R::records(&mut state.lock())
        .iter()
        .find(|r| r.id().as_str() == id)
        .cloned();
    match found {
        Some(record) => Json(Envelope::success(record)).into_response(),
        None => not_found(R::COLLECTION, &id),
    }
}

async fn create<R: StubCollection>(
    State(state): State<StubState>,
    Json(input): Json<R::Create>,
) -> Json<Envelope<R>> {
    let record = R::create(R::Id::generate(), input, Utc::now());
    R::records(&mut state.lock()).push(record.clone());
    Json(Envelope::success(record))
}

async fn update<R: StubCollection>(
    State(state): State<StubState>,
    Path(id): Path<String>,
    Json(mut body): Json<Value>,
) -> Response {
    // The client sends the update without its id; restore it from the path.
    if let Value::Object(fields) = &mut body {
        fields.insert("id".to_string(), Value::String(id.clone()));
    }
    let Ok(input) = serde_json::from_value::<R::Update>(body) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(Envelope::failure(json!({}), 400, "invalid update body")),
        )
            .into_response();
    };

    let mut inner = state.lock();
    let Some(record) = R::records(&mut inner)
        .iter_mut()
        .find(|r| r.id().as_str() == id)
    else {
        return not_found(R::COLLECTION, &id);
    };
    record.apply_update(input, Utc::now());
    Json(Envelope::success(record.clone())).into_response()
}

async fn remove<R: StubCollection>(
    State(state): State<StubState>,
    Path(id): Path<String>,
) -> Json<Envelope<DeleteAck>> {
    let mut inner = state.lock();
    let records = R::records(&mut inner);
    let before = records.len();
    records.retain(|r| r.id().as_str() != id);
    Json(Envelope::success(DeleteAck {
        deleted: records.len() != before,
    }))
}
