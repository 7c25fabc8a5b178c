use std::sync::Arc;

use jobtrail_processor::UpsertProcessor;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The notification processor behind the upsert endpoint.
    pub processor: Arc<UpsertProcessor>,
}
