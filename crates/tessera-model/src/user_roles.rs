use serde::{Deserialize, Serialize};

use crate::container::{ContainerKind, DocumentEntity};

/// Join record linking a user to a role. Lives in its own container; the
/// document id is the composite of both ids so a membership can be
/// addressed directly once both sides are known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    pub user_id: String,
    pub role_id: String,
    pub concurrency_stamp: Option<String>,
}

impl UserRole {
    pub fn new(user_id: impl Into<String>, role_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role_id: role_id.into(),
            concurrency_stamp: None,
        }
    }

    pub fn composite_id(user_id: &str, role_id: &str) -> String {
        format!("{user_id}:{role_id}")
    }
}

impl DocumentEntity for UserRole {
    const KIND: ContainerKind = ContainerKind::UserRoles;

    fn doc_id(&self) -> String {
        Self::composite_id(&self.user_id, &self.role_id)
    }

    fn partition_key(&self) -> String {
        self.doc_id()
    }

    fn concurrency_token(&self) -> Option<&str> {
        self.concurrency_stamp.as_deref()
    }

    fn set_concurrency_token(&mut self, token: Option<String>) {
        self.concurrency_stamp = token;
    }
}
