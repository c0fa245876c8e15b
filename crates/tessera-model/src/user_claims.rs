use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::container::{ContainerKind, DocumentEntity};

/// A claim attached to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaim {
    pub id: String,
    pub user_id: String,
    pub claim_type: String,
    pub claim_value: String,
    pub concurrency_stamp: Option<String>,
}

impl UserClaim {
    pub fn new(
        user_id: impl Into<String>,
        claim_type: impl Into<String>,
        claim_value: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            user_id: user_id.into(),
            claim_type: claim_type.into(),
            claim_value: claim_value.into(),
            concurrency_stamp: None,
        }
    }
}

impl DocumentEntity for UserClaim {
    const KIND: ContainerKind = ContainerKind::UserClaims;

    fn doc_id(&self) -> String {
        self.id.clone()
    }

    fn partition_key(&self) -> String {
        self.id.clone()
    }

    fn concurrency_token(&self) -> Option<&str> {
        self.concurrency_stamp.as_deref()
    }

    fn set_concurrency_token(&mut self, token: Option<String>) {
        self.concurrency_stamp = token;
    }
}
