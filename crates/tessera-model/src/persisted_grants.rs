use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::container::{ContainerKind, DocumentEntity};

/// OAuth/OIDC grant artifact (authorization code, refresh token, consent,
/// …) persisted for the external token-issuance component. The logical
/// identity is (grant_type, client_id, session_id); `key` is the opaque
/// handle issued to the client and is both document id and partition key,
/// so retrieval by handle is a point read.
///
/// This layer stores and maps these records; it does not interpret them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedGrant {
    pub key: String,
    pub grant_type: String,
    pub subject_id: Option<String>,
    pub session_id: Option<String>,
    pub client_id: String,
    pub description: Option<String>,
    pub creation_time: DateTime<Utc>,
    pub expiration: Option<DateTime<Utc>>,
    pub consumed_time: Option<DateTime<Utc>>,
    pub data: String,
    pub concurrency_stamp: Option<String>,
}

impl DocumentEntity for PersistedGrant {
    const KIND: ContainerKind = ContainerKind::PersistedGrants;

    fn doc_id(&self) -> String {
        self.key.clone()
    }

    fn partition_key(&self) -> String {
        self.key.clone()
    }

    fn concurrency_token(&self) -> Option<&str> {
        self.concurrency_stamp.as_deref()
    }

    fn set_concurrency_token(&mut self, token: Option<String>) {
        self.concurrency_stamp = token;
    }
}
