//! Error type shared by the core services.

/// Failure of a core operation.
///
/// Each variant maps to one class of HTTP response: validation (400),
/// unauthorized (401), not found (404), conflict (409), storage and
/// internal (500).
#[derive(Debug, thiserror::Error)]
pub enum CoachError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoachError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True when the failure came from the database layer.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
