//! The upsert orchestrator.

use std::collections::HashMap;
use std::sync::Arc;

use jobtrail_core::clock::{Clock, SystemClock};
use jobtrail_core::duration::run_duration;
use jobtrail_core::execution::JobExecution;
use jobtrail_core::hosts::extract_host_outcomes;
use jobtrail_core::job::Job;
use jobtrail_core::recurrence::update_job_run_stats;
use jobtrail_core::{identity, timestamp, RunStatus};
use jobtrail_store::{
    codec, Document, EventSearch, EventSearchRequest, FetchObjectRequest, ObjectStore,
    PutObjectRequest, SearchObjectsRequest, StoreError,
};

use crate::error::{FetchError, LocateError, PersistError, UpsertError};
use crate::notification::WorkflowNotification;
use crate::response::UpsertResponse;

/// Collection holding job definition documents.
pub const JOB_COLLECTION: &str = "jobs";
/// Collection holding execution-record documents.
pub const JOB_EXECUTION_COLLECTION: &str = "job_executions";
/// Saved query resolving an execution id to its telemetry events.
const EXECUTION_EVENTS_QUERY: &str = "Query By WorkflowRootExecutionID";

/// Drives one notification through validate, resolve, locate-or-create,
/// enrich, recurrence update, and persist.
pub struct UpsertProcessor {
    store: Arc<dyn ObjectStore>,
    search: Arc<dyn EventSearch>,
    clock: Arc<dyn Clock>,
}

/// The execution record the pipeline will update, however it was obtained.
struct LocatedExecution {
    key: String,
    record: JobExecution,
    /// False when the record was seeded fresh by this request.
    preexisting: bool,
}

impl UpsertProcessor {
    pub fn new(store: Arc<dyn ObjectStore>, search: Arc<dyn EventSearch>) -> Self {
        Self::with_clock(store, search, Arc::new(SystemClock))
    }

    /// Construct with an explicit clock. Tests pin time with `FixedClock`.
    pub fn with_clock(
        store: Arc<dyn ObjectStore>,
        search: Arc<dyn EventSearch>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            search,
            clock,
        }
    }

    /// Process one raw notification body into a response.
    ///
    /// Never fails outward: every pipeline error is logged and folded into
    /// the response envelope with its status class. The span's job fields
    /// are recorded once the notification resolves to a job, so failure
    /// logs carry them from that point on.
    #[tracing::instrument(
        skip(self, body),
        fields(
            job_name = tracing::field::Empty,
            job_id = tracing::field::Empty,
        )
    )]
    pub async fn process(&self, body: &[u8]) -> UpsertResponse {
        match self.run(body).await {
            Ok(response) => response,
            Err(e) => {
                let code = e.status_code();
                tracing::error!(code, error = %e, "Upsert request failed");
                UpsertResponse::error(code, e.to_string())
            }
        }
    }

    async fn run(&self, body: &[u8]) -> Result<UpsertResponse, UpsertError> {
        let notification =
            WorkflowNotification::parse(body).map_err(UpsertError::Notification)?;

        if notification.status == RunStatus::Empty {
            tracing::info!(
                execution_id = %notification.execution_id,
                "Blank-status notification, nothing to record"
            );
            return Ok(UpsertResponse::no_op());
        }

        let job_name = notification
            .job_name()
            .map_err(UpsertError::JobName)?
            .to_string();
        let job_id = identity::job_id_for_name(&job_name)?;
        tracing::Span::current().record("job_name", tracing::field::display(&job_name));
        tracing::Span::current().record("job_id", tracing::field::display(&job_id));
        tracing::info!(
            execution_id = %notification.execution_id,
            status = %notification.status,
            "Processing upsert notification"
        );

        let mut job_doc = self
            .fetch_document(JOB_COLLECTION, &job_id)
            .await
            .map_err(UpsertError::FetchJob)?;
        let mut job = Job::from_document(&job_doc).map_err(UpsertError::DistillJob)?;

        let LocatedExecution {
            key,
            mut record,
            preexisting,
        } = self.locate_execution(&notification, &job_id, &job_name).await?;

        // End date freezes on the first terminal observation; until then it
        // only participates in the duration computation.
        let now = self.clock.now();
        let mut end_date = record.end_date.clone();
        if end_date.is_empty() {
            end_date = timestamp::format_timestamp(now);
            if notification.status.is_terminal() {
                record.end_date = end_date.clone();
            }
        }
        let duration = run_duration(&record.run_date, &end_date, notification.status, now)?;
        if !duration.is_empty() {
            record.duration = duration;
        }
        record.run_status = notification.status;

        let telemetry = self
            .search
            .search_events(EventSearchRequest {
                search_name: EXECUTION_EVENTS_QUERY.to_string(),
                search_params: HashMap::from([(
                    "execution_id".to_string(),
                    notification.execution_id.clone(),
                )]),
            })
            .await?;
        let hosts = extract_host_outcomes(&telemetry.events);
        record.num_hosts = hosts.len();
        record.targeted_hosts = hosts;
        if preexisting {
            record.logscale_output = telemetry.job_url;
        }

        update_job_run_stats(&mut job, record.run_status, now)?;
        job.apply_to_document(&mut job_doc)
            .map_err(UpsertError::MergeJob)?;

        self.put_execution(&key, &record)
            .await
            .map_err(UpsertError::SaveExecution)?;
        self.put_document(JOB_COLLECTION, &job_id, &job_doc)
            .await
            .map_err(UpsertError::SaveJob)?;

        tracing::info!(
            execution_key = %key,
            status = %record.run_status,
            hosts = record.num_hosts,
            "Upsert persisted"
        );
        Ok(UpsertResponse::ok(&record))
    }

    /// Find the execution record for this notification, or seed a fresh one.
    ///
    /// The search-before-create step is advisory, not a lock: two concurrent
    /// first notifications for the same execution id can both see no match
    /// and create records under distinct timestamp-derived keys. Closing
    /// that race needs a conditional write the store does not promise.
    async fn locate_execution(
        &self,
        notification: &WorkflowNotification,
        job_id: &str,
        job_name: &str,
    ) -> Result<LocatedExecution, LocateError> {
        let run_start = timestamp::parse_timestamp(&notification.execution_timestamp)?;

        let found = self
            .store
            .search_objects(SearchObjectsRequest {
                collection: JOB_EXECUTION_COLLECTION.to_string(),
                filter: format!("execution_id:'{}'", notification.execution_id),
            })
            .await?;

        // There can only be one record per execution id.
        let Some(key) = found.object_keys.first() else {
            let nanos = run_start
                .timestamp_nanos_opt()
                .ok_or_else(|| {
                    LocateError::TimestampRange(notification.execution_timestamp.clone())
                })?;
            let key = format!("{}_{}", nanos, notification.execution_id);
            tracing::info!(
                object_key = %key,
                execution_id = %notification.execution_id,
                "Job execution not found, creating"
            );
            return Ok(LocatedExecution {
                key,
                record: seed_record(notification, job_id, job_name),
                preexisting: false,
            });
        };

        match self.fetch_document(JOB_EXECUTION_COLLECTION, key).await {
            Ok(doc) => Ok(LocatedExecution {
                key: key.clone(),
                record: JobExecution::from_document(doc)?,
                preexisting: true,
            }),
            Err(e) if e.is_not_found() => {
                tracing::info!(
                    object_key = %key,
                    "Located execution key holds no document, seeding"
                );
                Ok(LocatedExecution {
                    key: key.clone(),
                    record: seed_record(notification, job_id, job_name),
                    preexisting: false,
                })
            }
            Err(FetchError::Store(e)) => Err(LocateError::Store(e)),
            Err(FetchError::Document(e)) => Err(LocateError::Document(e)),
        }
    }

    /// Fetch and decode one stored document. Empty payloads count as absent.
    async fn fetch_document(&self, collection: &str, key: &str) -> Result<Document, FetchError> {
        let resp = self
            .store
            .fetch_object(FetchObjectRequest {
                collection: collection.to_string(),
                object_key: key.to_string(),
            })
            .await?;
        if resp.data.is_empty() {
            return Err(FetchError::Store(StoreError::NotFound));
        }
        Ok(codec::decode_document(&resp.data)?)
    }

    async fn put_execution(&self, key: &str, record: &JobExecution) -> Result<(), PersistError> {
        let data = serde_json::to_vec(record)?;
        self.store
            .put_object(PutObjectRequest {
                collection: JOB_EXECUTION_COLLECTION.to_string(),
                object_key: key.to_string(),
                data,
            })
            .await?;
        Ok(())
    }

    async fn put_document(
        &self,
        collection: &str,
        key: &str,
        doc: &Document,
    ) -> Result<(), PersistError> {
        let data = serde_json::to_vec(doc)?;
        self.store
            .put_object(PutObjectRequest {
                collection: collection.to_string(),
                object_key: key.to_string(),
                data,
            })
            .await?;
        Ok(())
    }
}

/// Minimal record seeded for a first-seen execution id.
fn seed_record(
    notification: &WorkflowNotification,
    job_id: &str,
    job_name: &str,
) -> JobExecution {
    JobExecution {
        job_id: job_id.to_string(),
        name: job_name.to_string(),
        execution_id: notification.execution_id.clone(),
        run_date: notification.execution_timestamp.clone(),
        ..Default::default()
    }
}
