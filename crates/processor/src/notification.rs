//! Inbound workflow notifications and their validation.

use jobtrail_core::RunStatus;
use serde::Deserialize;

/// Why a notification was rejected. All variants are bad-request class.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("empty request body")]
    EmptyBody,
    #[error("{0}")]
    Malformed(#[from] serde_json::Error),
    #[error("missing execution ID")]
    MissingExecutionId,
    #[error("missing definition name")]
    MissingDefinitionName,
    #[error("definition name does not contain job name")]
    MissingJobName,
    #[error("blank job name after delimiter")]
    BlankJobName,
}

#[derive(Debug, Default, Deserialize)]
struct RawNotification {
    #[serde(default)]
    execution_id: String,
    #[serde(default)]
    definition_name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    execution_timestamp: String,
}

/// A validated notification that a workflow run changed state.
///
/// The definition name encodes the job name as the segment after the first
/// `-` delimiter; its presence is checked at parse time, the extraction
/// itself happens in [`job_name`](Self::job_name).
#[derive(Debug, Clone)]
pub struct WorkflowNotification {
    pub execution_id: String,
    pub definition_name: String,
    /// Normalized at parse time; unrecognized raw values become
    /// [`RunStatus::Empty`].
    pub status: RunStatus,
    pub execution_timestamp: String,
}

impl WorkflowNotification {
    pub fn parse(body: &[u8]) -> Result<Self, NotificationError> {
        if body.is_empty() {
            return Err(NotificationError::EmptyBody);
        }
        let raw: RawNotification = serde_json::from_slice(body)?;
        if raw.execution_id.is_empty() {
            return Err(NotificationError::MissingExecutionId);
        }
        if raw.definition_name.is_empty() {
            return Err(NotificationError::MissingDefinitionName);
        }
        if !raw.definition_name.contains('-') {
            return Err(NotificationError::MissingJobName);
        }
        Ok(Self {
            execution_id: raw.execution_id,
            definition_name: raw.definition_name,
            status: RunStatus::normalize(&raw.status),
            execution_timestamp: raw.execution_timestamp,
        })
    }

    /// The job name: the trimmed segment after the first delimiter.
    pub fn job_name(&self) -> Result<&str, NotificationError> {
        let (_, rest) = self
            .definition_name
            .split_once('-')
            .ok_or(NotificationError::MissingJobName)?;
        let name = rest.trim();
        if name.is_empty() {
            return Err(NotificationError::BlankJobName);
        }
        Ok(name)
    }
}
