//! Pipeline errors, one variant per stage.
//!
//! Each variant's message is the human-readable wrapper returned to the
//! caller; the wrapped source carries the mechanical detail. Validation
//! failures map to 400, everything downstream to 500.

use jobtrail_core::recurrence::RecurrenceError;
use jobtrail_core::timestamp::TimestampError;
use jobtrail_store::{DocumentError, SearchError, StoreError};

use crate::notification::NotificationError;

/// Fetch-and-decode of a stored document.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to decode record: {0}")]
    Document(#[from] DocumentError),
}

impl FetchError {
    /// Absence, as opposed to a transport or decode failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Store(e) if e.is_not_found())
    }
}

/// Locating (or deciding to create) the execution record.
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("failed to parse execution timestamp: {0}")]
    Timestamp(#[from] TimestampError),
    #[error("execution timestamp out of range: {0}")]
    TimestampRange(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to decode job execution record: {0}")]
    Document(#[from] DocumentError),
    #[error("failed to deserialize job execution record: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Writing a record back to the store.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything that can end an upsert early, stage by stage.
#[derive(Debug, thiserror::Error)]
pub enum UpsertError {
    #[error("failed to extract job information from request: {0}")]
    Notification(#[source] NotificationError),
    #[error("bad job name provided: {0}")]
    JobName(#[source] NotificationError),
    #[error("job ID could not be determined: {0}")]
    JobId(#[from] std::io::Error),
    #[error("could not fetch job record: {0}")]
    FetchJob(#[source] FetchError),
    #[error("could not distill job record from document: {0}")]
    DistillJob(#[source] serde_json::Error),
    #[error("failed to fetch job execution record: {0}")]
    ExecutionRecord(#[from] LocateError),
    #[error("failed to compute job execution duration: {0}")]
    Duration(#[from] TimestampError),
    #[error("failed to execute logscale search: {0}")]
    EventSearch(#[from] SearchError),
    #[error("failed to update job record: {0}")]
    UpdateJob(#[from] RecurrenceError),
    #[error("failed to merge job record: {0}")]
    MergeJob(#[source] serde_json::Error),
    #[error("failed to save execution record: {0}")]
    SaveExecution(#[source] PersistError),
    #[error("failed to save job record: {0}")]
    SaveJob(#[source] PersistError),
}

impl UpsertError {
    /// HTTP-like status class: validation failures are the caller's fault,
    /// everything after validation is ours.
    pub fn status_code(&self) -> u16 {
        match self {
            UpsertError::Notification(_) | UpsertError::JobName(_) => 400,
            _ => 500,
        }
    }
}
