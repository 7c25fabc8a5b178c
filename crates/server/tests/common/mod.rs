//! Shared fixtures for server integration tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use jobtrail_core::clock::FixedClock;
use jobtrail_core::identity;
use jobtrail_processor::{UpsertProcessor, JOB_COLLECTION};
use jobtrail_server::config::ServerConfig;
use jobtrail_server::router::build_app_router;
use jobtrail_server::state::AppState;
use jobtrail_store::{Document, MemoryBackend};

/// The pinned instant every test processor's clock reports.
pub const NOW: &str = "2024-05-01T10:00:00Z";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        seed_file: None,
    }
}

/// Build the full application router over `backend`, with the processor
/// clock pinned to [`NOW`].
///
/// Uses the same [`build_app_router`] as `main.rs`, so integration tests
/// exercise the production middleware stack (request ID, timeout, tracing,
/// panic recovery).
pub fn build_test_app(backend: Arc<MemoryBackend>) -> Router {
    let clock = Arc::new(FixedClock(NOW.parse().unwrap()));
    let processor = Arc::new(UpsertProcessor::with_clock(
        backend.clone(),
        backend,
        clock,
    ));
    let state = AppState { processor };

    build_app_router(state, &test_config())
}

/// Issue a GET request against the app and await the response.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Issue a POST with the given raw body.
pub async fn post(app: Router, uri: &str, body: impl Into<Body>) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => panic!("test document must be a JSON object"),
    }
}

/// Seed a job document under the id derived from `job_name`; returns the id.
pub async fn seed_job(backend: &MemoryBackend, job_name: &str, job: Value) -> String {
    let job_id = identity::job_id_for_name(job_name).unwrap();
    backend.insert_document(JOB_COLLECTION, &job_id, doc(job)).await;
    job_id
}
