//! Container assignment and partition-key extraction.
//!
//! Each entity type maps to one logical container (a collection of JSON
//! documents) and names the field that acts as its partition key. Point
//! reads scoped to a partition key are cheap; queries without one fan out
//! across partitions and are the documented expensive path.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Logical container families. The concrete container name is resolved by
/// the store configuration so deployments can rename containers without
/// touching the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Users,
    Roles,
    UserRoles,
    UserLogins,
    UserClaims,
    UserTokens,
    PersistedGrants,
    DeviceFlowCodes,
    Index,
}

impl ContainerKind {
    /// Default container name, used when no override is configured.
    pub fn default_name(self) -> &'static str {
        match self {
            Self::Users => "identity_users",
            Self::Roles => "identity_roles",
            Self::UserRoles => "identity_user_roles",
            Self::UserLogins => "identity_user_logins",
            Self::UserClaims => "identity_user_claims",
            Self::UserTokens => "identity_user_tokens",
            Self::PersistedGrants => "identity_persisted_grants",
            Self::DeviceFlowCodes => "identity_device_flow_codes",
            Self::Index => "identity_index",
        }
    }
}

/// Mapping contract between an entity record and its document form.
///
/// Every entity carries an opaque concurrency token (`concurrency_stamp`).
/// The store assigns a fresh token on every successful write and rejects
/// writes whose token does not match the stored one, so stale updates fail
/// instead of overwriting.
pub trait DocumentEntity: Serialize + DeserializeOwned + Clone + Send + Sync {
    const KIND: ContainerKind;

    /// Document id, unique within the container.
    fn doc_id(&self) -> String;

    /// Partition key value for this document.
    fn partition_key(&self) -> String;

    fn concurrency_token(&self) -> Option<&str>;

    fn set_concurrency_token(&mut self, token: Option<String>);
}

/// Uppercase normalization for lookup keys (user names, emails, role
/// names). Raw values are display-only; every lookup goes through the
/// normalized form, so normalization must be applied at write time.
pub fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}
