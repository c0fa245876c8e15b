use std::time::Duration;

/// Store error variants.
///
/// `Conflict`, `Throttled`, and `Unavailable` are deliberately distinct so
/// callers can tell a lost optimistic-concurrency race (surface to the
/// user) from a transient store condition (retry at their discretion).
/// Absent documents on the lookup path are `Option::None`, not an error;
/// `NotFound` appears only when a write targets a missing document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("concurrency conflict: {0}")]
    Conflict(String),
    #[error("request throttled by store")]
    Throttled { retry_after: Option<Duration> },
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("document not found")]
    NotFound,
    #[error("operation canceled")]
    Canceled,
    #[error("document serialization failed")]
    Serialization(#[from] serde_json::Error),
    #[error("internal store error")]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Conflict(_) => "CONFLICT",
            Self::Throttled { .. } => "THROTTLED",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::NotFound => "NOT_FOUND",
            Self::Canceled => "CANCELED",
            Self::Serialization(_) => "SERIALIZATION",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether retrying the same operation can succeed without caller
    /// intervention. Conflicts are not retryable here: the caller must
    /// re-read and decide.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled { .. } | Self::Unavailable(_))
    }
}
