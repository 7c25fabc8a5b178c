//! Run status vocabulary shared by notifications, execution records, and
//! per-host outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of a workflow run, or of a single host's outcome within one.
///
/// `Empty` is a real wire value, not an error: notifications can arrive with
/// a blank or unrecognized status, and the pipeline treats those as "nothing
/// to conclude yet" rather than rejecting them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    #[default]
    #[serde(rename = "")]
    Empty,
    #[serde(rename = "in_progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
}

impl RunStatus {
    /// Normalize a raw status string from a notification.
    ///
    /// Matching is case-insensitive and accepts the common spelling variants
    /// of "in progress". Anything unrecognized maps to [`RunStatus::Empty`].
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            "in_progress" | "in-progress" | "in progress" | "inprogress" => Self::InProgress,
            _ => Self::Empty,
        }
    }

    /// Whether this status ends a run. Once a terminal status is recorded,
    /// the execution's `end_date` is frozen and never recomputed.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// The canonical wire spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
