//! Job recurrence state and its storage-document boundary.
//!
//! Job documents are owned by the job-management surface and carry many
//! fields this service never looks at. Only the recurrence slice is
//! distilled into a typed [`Job`]; the rest of the document passes through
//! untouched when the updated slice is merged back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// When and how often a job repeats.
///
/// `start` and `end` stay as raw strings, parsed only where needed: a blank
/// `end` is distinct from an absent one, and both must survive the
/// round-trip through storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Five-field cron-style recurrence expression, when the job repeats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_cycle: Option<String>,
}

/// The recurrence-owned slice of a stored job document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Whether the job was asked to fire immediately in addition to its
    /// scheduled occurrences.
    #[serde(default)]
    pub run_now: bool,
    #[serde(default)]
    pub run_count: i64,
    /// Expected total number of runs; `0` means unbounded.
    #[serde(default)]
    pub total_recurrences: i64,
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub schedule: Option<Schedule>,
}

impl Job {
    /// Distill the recurrence fields out of a generic job document.
    ///
    /// Fields this type does not model are simply ignored here; they stay in
    /// the document and are preserved by [`apply_to_document`](Self::apply_to_document).
    pub fn from_document(doc: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(doc.clone()))
    }

    /// Merge the recurrence fields back into the job's stored document,
    /// leaving unrelated fields untouched.
    pub fn apply_to_document(&self, doc: &mut Map<String, Value>) -> Result<(), serde_json::Error> {
        doc.insert("last_run".into(), serde_json::to_value(self.last_run)?);
        doc.insert("next_run".into(), serde_json::to_value(self.next_run)?);
        doc.insert("run_count".into(), Value::from(self.run_count));
        doc.insert(
            "total_recurrences".into(),
            Value::from(self.total_recurrences),
        );
        doc.insert("schedule".into(), serde_json::to_value(&self.schedule)?);
        Ok(())
    }
}
