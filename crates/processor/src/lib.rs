//! The upsert pipeline: one notification in, reconciled records out.
//!
//! Processing is strictly sequential per request: validate the
//! notification, resolve the job, locate or create the execution record,
//! enrich it with duration and per-host outcomes, advance the job's
//! recurrence bookkeeping, persist both records, respond. No retries and no
//! background work happen here; duplicate notifications are tolerated by
//! construction (the locate step) rather than deduplicated.

pub mod error;
pub mod notification;
pub mod response;
pub mod upsert;

pub use error::{FetchError, LocateError, PersistError, UpsertError};
pub use notification::{NotificationError, WorkflowNotification};
pub use response::{ApiError, UpsertResponse};
pub use upsert::{UpsertProcessor, JOB_COLLECTION, JOB_EXECUTION_COLLECTION};
