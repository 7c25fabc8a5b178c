//! Error types for the storage and search boundary.

/// Failure talking to the object store.
///
/// `NotFound` doubles as a control-flow signal: the execution locate-or-create
/// path branches on it, while a job lookup treats it as fatal.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("object not found")]
    NotFound,
    #[error("object store failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

/// Failure talking to the event-search backend.
#[derive(Debug, thiserror::Error)]
#[error("event search failure: {0}")]
pub struct SearchError(pub String);

/// A stored document that could not be decoded or encoded.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not a JSON document: {0}")]
    Json(#[from] serde_json::Error),
}
