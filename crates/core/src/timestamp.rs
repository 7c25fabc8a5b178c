//! Timestamp parsing and the single formatting rule for persisted times.

use chrono::{DateTime, Utc};

/// Every timestamp written to storage or returned to clients uses this
/// second-precision UTC form.
pub const ISO_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A timestamp string that could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("invalid timestamp {value:?}: {source}")]
pub struct TimestampError {
    pub value: String,
    #[source]
    pub source: chrono::ParseError,
}

/// Parse an RFC 3339 timestamp into UTC.
///
/// Input may carry a numeric offset or fractional seconds; both are
/// normalized away on the next call to [`format_timestamp`].
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, TimestampError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| TimestampError {
            value: value.to_string(),
            source,
        })
}

/// Render a timestamp in the canonical [`ISO_TIME_FORMAT`] form.
pub fn format_timestamp(t: DateTime<Utc>) -> String {
    t.format(ISO_TIME_FORMAT).to_string()
}
