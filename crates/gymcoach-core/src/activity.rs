//! Activity log acknowledgements.
//!
//! Entries are echoed back and written to the trace log; nothing is stored.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CoachError;

/// An activity reported by the user, e.g. a completed set.
#[derive(Debug, Clone, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: String,
}

/// Reply to a logged activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogAck {
    pub status: &'static str,
    pub analysis: String,
}

/// Acknowledge a log entry. Both `type` and `content` are required.
pub fn acknowledge(entry: &LogEntry) -> Result<LogAck, CoachError> {
    let kind = entry.kind.trim();
    if kind.is_empty() {
        return Err(CoachError::validation("log entry type is required"));
    }
    if entry.content.trim().is_empty() {
        return Err(CoachError::validation("log entry content is required"));
    }

    info!(kind, content_len = entry.content.len(), "activity logged");
    Ok(LogAck {
        status: "success",
        analysis: format!("Logged your {kind}: '{}'.", entry.content),
    })
}
