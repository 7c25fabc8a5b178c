//! End-to-end pipeline behaviour over the in-memory backend.

mod common;

use chrono::{DateTime, Duration};
use jobtrail_core::job::Job;
use jobtrail_processor::{JOB_COLLECTION, JOB_EXECUTION_COLLECTION};
use serde_json::json;

use common::{doc, fixture, notification, now, processor_at, seed_job, install_event, NOW};

const JOB_NAME: &str = "Remove malware artifacts";
const DEFINITION: &str = "notify - Remove malware artifacts";
const RUN_DATE: &str = "2024-05-01T09:58:30Z";

fn execution_key(execution_id: &str) -> String {
    let nanos = DateTime::parse_from_rfc3339(RUN_DATE)
        .unwrap()
        .timestamp_nanos_opt()
        .unwrap();
    format!("{nanos}_{execution_id}")
}

fn bounded_daily_job() -> serde_json::Value {
    json!({
        "name": JOB_NAME,
        "description": "fields outside the recurrence slice pass through",
        "run_now": false,
        "schedule": {
            "start": "2024-05-01T10:00:00Z",
            "end": "2024-05-04T10:00:00Z",
            "time_cycle": "0 0 * * *"
        }
    })
}

#[tokio::test]
async fn first_in_progress_notification_creates_and_enriches() {
    let f = fixture();
    let job_id = seed_job(&f.backend, JOB_NAME, bounded_daily_job()).await;
    f.backend
        .push_events(
            "exec-1",
            vec![install_event("web-02", true), install_event("web-01", false)],
        )
        .await;
    f.backend.set_job_url("https://search.example/q/42").await;

    let resp = f
        .processor
        .process(&notification("exec-1", DEFINITION, "In Progress", RUN_DATE))
        .await;

    assert_eq!(resp.code, 200);
    assert!(resp.errors.is_empty());
    let resource = &resp.body["resources"][0];
    assert_eq!(resource["execution_id"], json!("exec-1"));
    assert_eq!(resource["run_status"], json!("in_progress"));
    assert_eq!(resource["duration"], json!("00:01:30"));
    assert_eq!(resource["end_date"], json!(""));
    assert_eq!(resource["num_hosts"], json!(2));
    // Sorted ascending by hostname, independent of event order.
    assert_eq!(resource["targeted_hosts"][0]["hostname"], json!("web-01"));
    assert_eq!(resource["targeted_hosts"][0]["status"], json!("failed"));
    assert_eq!(resource["targeted_hosts"][1]["hostname"], json!("web-02"));
    assert_eq!(resource["targeted_hosts"][1]["status"], json!("completed"));
    // Fresh records never get the search link.
    assert_eq!(resource["logscale_output"], json!(""));

    let stored = f
        .backend
        .document(JOB_EXECUTION_COLLECTION, &execution_key("exec-1"))
        .await
        .expect("execution record persisted under the synthesized key");
    assert_eq!(stored["job_id"], json!(job_id.clone()));
    assert_eq!(stored["name"], json!(JOB_NAME));
    assert_eq!(stored["run_date"], json!(RUN_DATE));

    let job_doc = f.backend.document(JOB_COLLECTION, &job_id).await.unwrap();
    assert_eq!(
        job_doc["description"],
        json!("fields outside the recurrence slice pass through")
    );
    let job = Job::from_document(&job_doc).unwrap();
    assert_eq!(job.run_count, 1);
    assert_eq!(job.total_recurrences, 3);
    assert_eq!(job.last_run, Some(now()));
    assert_eq!(
        job.next_run.map(|t| t.to_rfc3339()),
        Some("2024-05-02T00:00:00+00:00".to_string())
    );
}

#[tokio::test]
async fn completion_freezes_end_date_and_links_search_output() {
    let f = fixture();
    seed_job(&f.backend, JOB_NAME, bounded_daily_job()).await;
    f.backend.set_job_url("https://search.example/q/42").await;

    let first = f
        .processor
        .process(&notification("exec-1", DEFINITION, "in_progress", RUN_DATE))
        .await;
    assert_eq!(first.code, 200);

    let resp = f
        .processor
        .process(&notification("exec-1", DEFINITION, "completed", RUN_DATE))
        .await;

    assert_eq!(resp.code, 200);
    let resource = &resp.body["resources"][0];
    assert_eq!(resource["run_status"], json!("completed"));
    assert_eq!(resource["end_date"], json!(NOW));
    assert_eq!(resource["duration"], json!("00:01:30"));
    // Updates to a pre-existing record carry the search link.
    assert_eq!(resource["logscale_output"], json!("https://search.example/q/42"));

    // The completed notification does not advance recurrence counters.
    let job_id = jobtrail_core::identity::job_id_for_name(JOB_NAME).unwrap();
    let job = Job::from_document(&f.backend.document(JOB_COLLECTION, &job_id).await.unwrap())
        .unwrap();
    assert_eq!(job.run_count, 1);
}

#[tokio::test]
async fn reprocessing_a_terminal_notification_is_idempotent_on_end_date() {
    let f = fixture();
    seed_job(&f.backend, JOB_NAME, bounded_daily_job()).await;

    f.processor
        .process(&notification("exec-1", DEFINITION, "in_progress", RUN_DATE))
        .await;
    f.processor
        .process(&notification("exec-1", DEFINITION, "completed", RUN_DATE))
        .await;

    // Redelivery an hour later must not move the frozen end date.
    let late = processor_at(&f.backend, now() + Duration::hours(1));
    let resp = late
        .process(&notification("exec-1", DEFINITION, "completed", RUN_DATE))
        .await;

    assert_eq!(resp.code, 200);
    let resource = &resp.body["resources"][0];
    assert_eq!(resource["end_date"], json!(NOW));
    assert_eq!(resource["duration"], json!("00:01:30"));
}

#[tokio::test]
async fn blank_status_is_a_no_op_without_collaborator_calls() {
    let f = fixture();
    seed_job(&f.backend, JOB_NAME, bounded_daily_job()).await;

    let resp = f
        .processor
        .process(&notification("exec-1", DEFINITION, "", RUN_DATE))
        .await;

    assert_eq!(resp.code, 200);
    assert!(resp.errors.is_empty());
    assert_eq!(resp.body["resources"], json!([{ "name": "", "status": "ok" }]));
    assert!(f.backend.recorded_calls().await.is_empty());
}

#[tokio::test]
async fn unrecognized_status_is_treated_as_blank() {
    let f = fixture();
    let resp = f
        .processor
        .process(&notification("exec-1", DEFINITION, "paused", RUN_DATE))
        .await;

    assert_eq!(resp.code, 200);
    assert_eq!(resp.body["resources"], json!([{ "name": "", "status": "ok" }]));
    assert!(f.backend.recorded_calls().await.is_empty());
}

#[tokio::test]
async fn missing_job_record_is_an_internal_error() {
    let f = fixture();
    let resp = f
        .processor
        .process(&notification("exec-1", DEFINITION, "in_progress", RUN_DATE))
        .await;

    assert_eq!(resp.code, 500);
    assert_eq!(resp.errors.len(), 1);
    assert!(resp.errors[0].message.starts_with("could not fetch job record"));
    assert_eq!(resp.body["errors"][0]["code"], json!(500));
}

#[tokio::test]
async fn unparseable_execution_timestamp_is_an_internal_error() {
    let f = fixture();
    seed_job(&f.backend, JOB_NAME, bounded_daily_job()).await;

    let resp = f
        .processor
        .process(&notification("exec-1", DEFINITION, "in_progress", "yesterday"))
        .await;

    assert_eq!(resp.code, 500);
    assert!(resp.errors[0]
        .message
        .starts_with("failed to fetch job execution record"));
    assert!(resp.errors[0].message.contains("timestamp"));
}

#[tokio::test]
async fn job_without_schedule_becomes_a_one_shot() {
    let f = fixture();
    let job_id = seed_job(&f.backend, JOB_NAME, json!({ "name": JOB_NAME })).await;

    let resp = f
        .processor
        .process(&notification("exec-1", DEFINITION, "in_progress", RUN_DATE))
        .await;
    assert_eq!(resp.code, 200);

    let job = Job::from_document(&f.backend.document(JOB_COLLECTION, &job_id).await.unwrap())
        .unwrap();
    assert_eq!(job.run_count, 1);
    assert_eq!(job.total_recurrences, 1);
    assert_eq!(job.last_run, Some(now()));
    assert_eq!(job.next_run, Some(now()));
}

#[tokio::test]
async fn zero_telemetry_events_yield_an_empty_host_list() {
    let f = fixture();
    seed_job(&f.backend, JOB_NAME, bounded_daily_job()).await;

    let resp = f
        .processor
        .process(&notification("exec-1", DEFINITION, "failed", RUN_DATE))
        .await;

    assert_eq!(resp.code, 200);
    let resource = &resp.body["resources"][0];
    assert_eq!(resource["targeted_hosts"], json!([]));
    assert_eq!(resource["num_hosts"], json!(0));
}

#[tokio::test]
async fn preseeded_execution_record_is_updated_in_place() {
    let f = fixture();
    seed_job(&f.backend, JOB_NAME, bounded_daily_job()).await;
    // A record created by an earlier deployment, under its own key.
    f.backend
        .insert_document(
            JOB_EXECUTION_COLLECTION,
            "legacy-key",
            doc(json!({
                "execution_id": "exec-1",
                "job_id": "whatever",
                "name": JOB_NAME,
                "run_date": RUN_DATE,
            })),
        )
        .await;
    f.backend.set_job_url("https://search.example/q/7").await;

    let resp = f
        .processor
        .process(&notification("exec-1", DEFINITION, "completed", RUN_DATE))
        .await;

    assert_eq!(resp.code, 200);
    // Located records are updated under their existing key, and count as
    // pre-existing for the search link.
    let updated = f
        .backend
        .document(JOB_EXECUTION_COLLECTION, "legacy-key")
        .await
        .unwrap();
    assert_eq!(updated["run_status"], json!("completed"));
    assert_eq!(updated["logscale_output"], json!("https://search.example/q/7"));
    assert!(f
        .backend
        .document(JOB_EXECUTION_COLLECTION, &execution_key("exec-1"))
        .await
        .is_none());
}
