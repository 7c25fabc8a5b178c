//! Elapsed wall-clock duration for an execution.

use chrono::{DateTime, Utc};

use crate::status::RunStatus;
use crate::timestamp::{self, TimestampError};

/// Compute the `HH:MM:SS` duration between two timestamp strings.
///
/// Rules:
/// - A blank `start` means the execution never recorded a run date, so
///   there is nothing to measure: `Ok("")`.
/// - Duration is only meaningful once a run is in progress or has finished;
///   a blank status also yields `Ok("")`.
/// - An in-progress run with no `end` yet is measured against `now`.
/// - Hours absorb whole days and do not wrap at 24 (`"25:02:03"` after a
///   day and change).
/// - An interval that comes out negative clamps to `"00:00:00"`.
pub fn run_duration(
    start: &str,
    end: &str,
    status: RunStatus,
    now: DateTime<Utc>,
) -> Result<String, TimestampError> {
    if start.is_empty() {
        return Ok(String::new());
    }
    if !matches!(
        status,
        RunStatus::Failed | RunStatus::InProgress | RunStatus::Completed
    ) {
        return Ok(String::new());
    }

    let start_t = timestamp::parse_timestamp(start)?;
    let end_t = if status == RunStatus::InProgress && end.is_empty() {
        now
    } else {
        timestamp::parse_timestamp(end)?
    };

    let total_secs = (end_t - start_t).num_seconds().max(0);
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    Ok(format!("{hours:02}:{minutes:02}:{seconds:02}"))
}
