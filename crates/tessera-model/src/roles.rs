use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::container::{ContainerKind, DocumentEntity, normalize};

/// Role record, partitioned by its own id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub normalized_name: String,
    pub concurrency_stamp: Option<String>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: Uuid::now_v7().to_string(),
            normalized_name: normalize(&name),
            name,
            concurrency_stamp: None,
        }
    }
}

impl DocumentEntity for Role {
    const KIND: ContainerKind = ContainerKind::Roles;

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
