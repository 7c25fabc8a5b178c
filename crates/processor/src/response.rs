//! Response envelopes returned to the notification channel.
//!
//! Every reply carries the same JSON envelope, `{"errors": [...],
//! "resources": [...]}`, alongside an HTTP-like status code. The transport
//! layer forwards both verbatim.

use jobtrail_core::execution::JobExecution;
use serde::Serialize;
use serde_json::{json, Value};

/// One structured error in a response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
}

/// Outcome of one upsert request, transport-agnostic.
#[derive(Debug, Clone)]
pub struct UpsertResponse {
    pub code: u16,
    pub body: Value,
    pub errors: Vec<ApiError>,
}

impl UpsertResponse {
    /// Success: the reconciled execution record is the single resource.
    pub fn ok(record: &JobExecution) -> Self {
        let body = match serde_json::to_value(record) {
            Ok(value) => json!({ "errors": [], "resources": [value] }),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize execution record for response");
                Value::Null
            }
        };
        Self {
            code: 200,
            body,
            errors: Vec::new(),
        }
    }

    /// Deliberate no-op (blank status): success with a placeholder resource.
    pub fn no_op() -> Self {
        Self {
            code: 200,
            body: json!({ "errors": [], "resources": [{ "name": "", "status": "ok" }] }),
            errors: Vec::new(),
        }
    }

    /// Failure: one structured error, mirrored in the body envelope.
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        let error = ApiError {
            code,
            message: message.into(),
        };
        Self {
            code,
            body: json!({ "errors": [&error], "resources": [] }),
            errors: vec![error],
        }
    }
}
