//! Per-host outcome extraction from raw telemetry events.
//!
//! The event search returns loosely structured field maps in two shapes: an
//! install action (stdout/stderr of a put-and-run) and a remove action
//! (file-existence checks around a delete). Field names arrive with varying
//! pipeline prefixes, so matching is by case-insensitive suffix against a
//! fixed vocabulary. Both shapes reduce to hostname plus pass/fail.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::execution::TargetedHost;
use crate::status::RunStatus;

/// One raw event from the search backend: an unordered field-name/value map.
pub type TelemetryEvent = serde_json::Map<String, Value>;

// Recognized field-name suffixes, matched against lowercased keys.
const SUFFIX_HOSTNAME: &str = "device.getdetails.hostname";
const SUFFIX_INSTALL_STDERR: &str = "rtr.putandrun.stderr";
const SUFFIX_INSTALL_STDOUT: &str = "rtr.putandrun.stdout";
const SUFFIX_REMOVE_CHECK: &str = "rtr.app_check_file_exist_rtr_2.file_exists";
const SUFFIX_REMOVE_RESULT: &str = "rtr.app_remove_file_rtr_2.file_exists";
const SUFFIX_REMOVE_RESPONSE: &str = "rtr.app_remove_file_rtr_2.response";

struct HostOutcome {
    hostname: String,
    success: bool,
}

/// Reduce a batch of telemetry events to deduplicated per-host outcomes.
///
/// Each event is tried as install-shape first, then remove-shape; events
/// matching neither are skipped. When several events name the same host,
/// the last one in input order wins. The result is sorted ascending by
/// hostname, and an empty input yields an empty list.
pub fn extract_host_outcomes(events: &[TelemetryEvent]) -> Vec<TargetedHost> {
    let mut by_host: BTreeMap<String, HostOutcome> = BTreeMap::new();
    for event in events {
        if let Some(outcome) = extract_install(event).or_else(|| extract_remove(event)) {
            by_host.insert(outcome.hostname.clone(), outcome);
        }
    }

    by_host
        .into_values()
        .map(|outcome| TargetedHost {
            device_id: String::new(),
            hostname: outcome.hostname,
            status: if outcome.success {
                RunStatus::Completed
            } else {
                RunStatus::Failed
            },
        })
        .collect()
}

/// A string field value, trimmed, or `None` when absent or blank.
fn non_blank_str(value: &Value) -> Option<&str> {
    let s = value.as_str()?.trim();
    (!s.is_empty()).then_some(s)
}

/// Install shape: put-and-run stdout means the payload landed, stderr means
/// it did not. Stderr wins when both are present.
fn extract_install(event: &TelemetryEvent) -> Option<HostOutcome> {
    let mut hostname = None;
    let mut stderr = false;
    let mut stdout = false;

    for (key, value) in event {
        let key = key.to_ascii_lowercase();
        if key.ends_with(SUFFIX_HOSTNAME) {
            if let Some(s) = non_blank_str(value) {
                hostname = Some(s.to_string());
            }
        } else if key.ends_with(SUFFIX_INSTALL_STDERR) {
            stderr = stderr || non_blank_str(value).is_some();
        } else if key.ends_with(SUFFIX_INSTALL_STDOUT) {
            stdout = stdout || non_blank_str(value).is_some();
        }
    }

    let hostname = hostname?;
    if stderr {
        return Some(HostOutcome {
            hostname,
            success: false,
        });
    }
    stdout.then(|| HostOutcome {
        hostname,
        success: true,
    })
}

/// Remove shape: the action reports a truth value through up to three
/// fields. The JSON `response` payload takes precedence over the bare
/// post-removal `file_exists` field, which takes precedence over the
/// pre-removal check; the resolved value is the outcome, and it must be a
/// literal `"true"`/`"false"` to count as a match.
fn extract_remove(event: &TelemetryEvent) -> Option<HostOutcome> {
    let mut hostname = None;
    let mut check_result: Option<String> = None;
    let mut remove_result: Option<String> = None;
    let mut response_result: Option<bool> = None;

    for (key, value) in event {
        let key = key.to_ascii_lowercase();
        if key.ends_with(SUFFIX_HOSTNAME) {
            if let Some(s) = non_blank_str(value) {
                hostname = Some(s.to_string());
            }
        } else if key.ends_with(SUFFIX_REMOVE_CHECK) {
            if let Some(s) = non_blank_str(value) {
                check_result = Some(s.to_string());
            }
        } else if key.ends_with(SUFFIX_REMOVE_RESULT) {
            if let Some(s) = non_blank_str(value) {
                remove_result = Some(s.to_string());
            }
        } else if key.ends_with(SUFFIX_REMOVE_RESPONSE) {
            if let Some(raw) = non_blank_str(value) {
                match file_exists_from_response(raw) {
                    Ok(Some(resolved)) => response_result = Some(resolved),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::error!(
                            key = %key,
                            error = %e,
                            "Unusable remove-action response payload; skipping event"
                        );
                        return None;
                    }
                }
            }
        }
    }

    let hostname = hostname?;

    if let Some(success) = response_result {
        return Some(HostOutcome { hostname, success });
    }
    match remove_result.or(check_result)?.as_str() {
        "true" => Some(HostOutcome {
            hostname,
            success: true,
        }),
        "false" => Some(HostOutcome {
            hostname,
            success: false,
        }),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
enum ResponseFieldError {
    #[error("response payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown truth value: {0}")]
    UnknownTruthValue(String),
}

/// Read the `file_exists` key out of a remove-action response payload.
///
/// The payload is itself JSON; `file_exists` may be the literal strings
/// `"true"`/`"false"` or a real boolean. A missing key is fine; any other
/// value disqualifies the whole event.
fn file_exists_from_response(raw: &str) -> Result<Option<bool>, ResponseFieldError> {
    let payload: serde_json::Map<String, Value> = serde_json::from_str(raw)?;
    let Some(value) = payload.get("file_exists") else {
        return Ok(None);
    };
    match value {
        Value::String(s) if s == "true" => Ok(Some(true)),
        Value::String(s) if s == "false" => Ok(Some(false)),
        Value::Bool(b) => Ok(Some(*b)),
        other => Err(ResponseFieldError::UnknownTruthValue(other.to_string())),
    }
}
