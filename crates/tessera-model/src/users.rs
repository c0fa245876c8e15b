use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::container::{ContainerKind, DocumentEntity, normalize};

/// User account record. Partitioned by its own id, so lookups by id are
/// single-partition point reads; lookups by name or email go through the
/// secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub user_name: String,
    pub normalized_user_name: String,
    pub email: String,
    pub normalized_email: String,
    pub email_confirmed: bool,
    pub password_hash: Option<String>,
    pub phone_number: Option<String>,
    pub phone_number_confirmed: bool,
    pub concurrency_stamp: Option<String>,
}

impl User {
    /// New user with normalized lookup fields derived from the raw values.
    pub fn new(user_name: impl Into<String>, email: impl Into<String>) -> Self {
        let user_name = user_name.into();
        let email = email.into();
        Self {
            id: Uuid::now_v7().to_string(),
            normalized_user_name: normalize(&user_name),
            normalized_email: normalize(&email),
            user_name,
            email,
            email_confirmed: false,
            password_hash: None,
            phone_number: None,
            phone_number_confirmed: false,
            concurrency_stamp: None,
        }
    }
}

impl DocumentEntity for User {
    const KIND: ContainerKind = ContainerKind::Users;

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
