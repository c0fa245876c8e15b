use std::time::Duration;

use tessera_store::StoreError;

/// Identity adapter error variants.
///
/// Argument validation fails before any store round trip. Persistence
/// failures are caught at the adapter boundary and translated into these
/// structured variants with a human-readable description; raw store
/// errors never propagate to framework-level callers. Side-effect
/// operations (add-login, add-to-role, …) surface their failures the
/// same way — nothing is swallowed.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("operation canceled")]
    Canceled,
    #[error("role not found: {0}")]
    RoleNotFound(String),
    #[error("concurrency conflict: {description}")]
    Conflict { description: String },
    #[error("store throttled the request")]
    Throttled { retry_after: Option<Duration> },
    #[error("store unavailable: {description}")]
    StoreUnavailable { description: String },
    #[error("operation not supported by this store: {operation}")]
    Unsupported { operation: &'static str },
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl IdentityError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Canceled => "CANCELED",
            Self::RoleNotFound(_) => "ROLE_NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::Throttled { .. } => "THROTTLED",
            Self::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
            Self::Unsupported { .. } => "UNSUPPORTED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Transient store conditions the caller may retry. Conflicts are
    /// excluded: the caller must re-read before trying again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled { .. } | Self::StoreUnavailable { .. })
    }
}

impl From<StoreError> for IdentityError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(description) => Self::Conflict { description },
            StoreError::Throttled { retry_after } => Self::Throttled { retry_after },
            StoreError::Unavailable(description) => Self::StoreUnavailable { description },
            // A write aimed at a document that is gone lost the race with
            // a concurrent delete.
            StoreError::NotFound => Self::Conflict {
                description: "target document no longer exists".to_owned(),
            },
            StoreError::Canceled => Self::Canceled,
            StoreError::Serialization(e) => Self::Internal(e.into()),
            StoreError::Internal(e) => Self::Internal(e),
        }
    }
}
