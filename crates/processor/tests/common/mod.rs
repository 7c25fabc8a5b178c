//! Shared fixtures for processor integration tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use jobtrail_core::clock::FixedClock;
use jobtrail_core::identity;
use jobtrail_processor::{UpsertProcessor, JOB_COLLECTION};
use jobtrail_store::{Document, MemoryBackend};
use serde_json::{json, Value};

/// The pinned instant every fixture clock reports.
pub const NOW: &str = "2024-05-01T10:00:00Z";

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
}

pub struct Fixture {
    pub backend: Arc<MemoryBackend>,
    pub processor: UpsertProcessor,
}

/// Processor over a fresh in-memory backend with the clock pinned to [`NOW`].
pub fn fixture() -> Fixture {
    fixture_at(now())
}

/// Same backend wiring with an arbitrary pinned instant.
pub fn fixture_at(instant: DateTime<Utc>) -> Fixture {
    let backend = Arc::new(MemoryBackend::new());
    let processor = UpsertProcessor::with_clock(
        backend.clone(),
        backend.clone(),
        Arc::new(FixedClock(instant)),
    );
    Fixture { backend, processor }
}

/// Reuse an existing backend under a different pinned instant.
pub fn processor_at(backend: &Arc<MemoryBackend>, instant: DateTime<Utc>) -> UpsertProcessor {
    UpsertProcessor::with_clock(
        backend.clone(),
        backend.clone(),
        Arc::new(FixedClock(instant)),
    )
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

pub fn notification(execution_id: &str, definition_name: &str, status: &str, ts: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "execution_id": execution_id,
        "definition_name": definition_name,
        "status": status,
        "execution_timestamp": ts,
    }))
    .unwrap()
}

/// Telemetry event in install shape.
pub fn install_event(hostname: &str, ok: bool) -> Document {
    let field = if ok {
        "workflow.rtr.putandrun.stdout"
    } else {
        "workflow.rtr.putandrun.stderr"
    };
    doc(json!({
        "workflow.device.getdetails.hostname": hostname,
        field: "some output",
    }))
}
