use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::post, Json, Router};

use crate::state::AppState;

/// POST /api/v1/job-executions/upsert -- reconcile one workflow notification.
///
/// The raw body is handed to the processor unchanged; the processor's status
/// code and response envelope are returned verbatim.
async fn upsert(State(state): State<AppState>, body: Bytes) -> Response {
    let outcome = state.processor.process(&body).await;

    let status =
        StatusCode::from_u16(outcome.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, Json(outcome.body)).into_response()
}

/// Mount execution routes (intended for nesting under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/job-executions/upsert", post(upsert))
}
