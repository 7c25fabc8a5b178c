//! Execution-record document types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::status::RunStatus;

/// Outcome of the remote action on one targeted host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetedHost {
    /// Reserved; the telemetry shapes carry hostnames but no device ids.
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub status: RunStatus,
}

/// The persisted history of one concrete run of a job.
///
/// Created once per execution id, then rewritten on every later
/// notification as the workflow progresses. The record's storage key is
/// carried by the store layer, not duplicated in the document. Every field
/// defaults so the minimal seeded record (ids, name, and run date only)
/// deserializes cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobExecution {
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub execution_id: String,
    #[serde(default)]
    pub run_date: String,
    /// Blank until the first terminal status is observed, then frozen.
    #[serde(default)]
    pub end_date: String,
    /// `HH:MM:SS`, recomputed on every update.
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub run_status: RunStatus,
    #[serde(default)]
    pub targeted_hosts: Vec<TargetedHost>,
    #[serde(default)]
    pub num_hosts: usize,
    /// Search-backend link to this execution's raw telemetry.
    #[serde(default)]
    pub logscale_output: String,
}

impl JobExecution {
    /// Deserialize from the generic stored-document form.
    pub fn from_document(doc: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(doc))
    }

    /// Serialize back into the generic stored-document form.
    pub fn to_document(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            // A struct with named fields always serializes to an object.
            other => Err(serde::ser::Error::custom(format!(
                "execution record serialized to non-object value: {other}"
            ))),
        }
    }
}
