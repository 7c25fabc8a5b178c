pub mod executions;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /job-executions/upsert    reconcile one workflow notification (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(executions::router())
}
