//! Recurrence bookkeeping for a job's run statistics.
//!
//! Runs once per in-progress notification. The first observed run seeds the
//! job's counters and simulates the schedule forward to count its bounded
//! occurrences; each later run shifts `next_run` into `last_run` and
//! advances the schedule, until the expected total is reached.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use cron::Schedule as CronSchedule;

use crate::job::Job;
use crate::status::RunStatus;
use crate::timestamp::{self, TimestampError};

#[derive(Debug, thiserror::Error)]
pub enum RecurrenceError {
    /// A schedule timestamp (`start` or `end`) failed to parse.
    #[error(transparent)]
    Timestamp(#[from] TimestampError),

    /// The recurrence expression failed to parse.
    #[error("invalid recurrence expression {expr:?}: {source}")]
    Expression {
        expr: String,
        #[source]
        source: cron::error::Error,
    },
}

/// Parse a standard five-field (minute, hour, day-of-month, month,
/// day-of-week) recurrence expression.
///
/// The underlying parser expects a leading seconds field, so five-field
/// expressions get `0 ` prepended; anything else passes through unchanged.
pub fn parse_recurrence(expr: &str) -> Result<CronSchedule, RecurrenceError> {
    let expr = expr.trim();
    let normalized = if expr.split_whitespace().count() == 5 {
        format!("0 {expr}")
    } else {
        expr.to_string()
    };
    CronSchedule::from_str(&normalized).map_err(|source| RecurrenceError::Expression {
        expr: expr.to_string(),
        source,
    })
}

/// First occurrence strictly after `after`, if the schedule has one.
pub fn next_occurrence(schedule: &CronSchedule, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    schedule.after(&after).next()
}

/// Update a job's run statistics for a newly observed run status.
///
/// Only an in-progress status moves anything: completed/failed/blank
/// notifications describe runs that were already counted when they started.
pub fn update_job_run_stats(
    job: &mut Job,
    status: RunStatus,
    now: DateTime<Utc>,
) -> Result<(), RecurrenceError> {
    if status != RunStatus::InProgress {
        return Ok(());
    }
    if job.run_count > 0 {
        advance_run(job, now)
    } else {
        initialize_run(job, now)
    }
}

/// A run beyond the first: shift `next_run` into `last_run` and advance the
/// schedule, unless this was the final expected occurrence.
fn advance_run(job: &mut Job, now: DateTime<Utc>) -> Result<(), RecurrenceError> {
    if job.schedule.is_none() {
        return Ok(());
    }

    job.last_run = job.next_run;
    job.run_count += 1;
    if job.run_count == job.total_recurrences {
        // Final expected run; next_run keeps pointing at this occurrence.
        return Ok(());
    }

    let Some(expr) = recurrence_expr(job) else {
        // A repeat run without an expression shouldn't happen; nothing to advance.
        return Ok(());
    };
    let schedule = parse_recurrence(&expr)?;
    job.next_run = next_occurrence(&schedule, now);
    Ok(())
}

/// The first observed run: seed counters, then simulate the schedule
/// forward to count the bounded occurrences.
fn initialize_run(job: &mut Job, now: DateTime<Utc>) -> Result<(), RecurrenceError> {
    job.run_count = 1;
    job.total_recurrences = 1;
    job.last_run = Some(now);
    job.next_run = Some(now);

    let Some(schedule) = job.schedule.clone() else {
        return Ok(());
    };

    if job.run_now {
        // An immediate run fires before the schedule proper begins.
        let start = timestamp::parse_timestamp(&schedule.start)?;
        job.next_run = Some(start);
    }

    let Some(expr) = recurrence_expr(job) else {
        if job.run_now {
            job.total_recurrences += 1;
        }
        return Ok(());
    };

    let cron_schedule = parse_recurrence(&expr)?;
    job.next_run = next_occurrence(&cron_schedule, now);

    let Some(end_raw) = schedule.end.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        // Unbounded recurrence; a concrete total would be meaningless.
        job.total_recurrences = 0;
        return Ok(());
    };

    let end = timestamp::parse_timestamp(end_raw)?;
    let mut expected = cron_schedule
        .after(&now)
        .take_while(|occurrence| *occurrence <= end)
        .count() as i64;
    if job.run_now {
        expected += 1;
    }
    job.total_recurrences = expected;
    Ok(())
}

/// The job's recurrence expression, or `None` when absent or blank.
fn recurrence_expr(job: &Job) -> Option<String> {
    job.schedule
        .as_ref()
        .and_then(|s| s.time_cycle.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
