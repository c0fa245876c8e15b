use serde::{Deserialize, Serialize};

use crate::container::{ContainerKind, DocumentEntity};

/// Named token stored for a user under a login provider (e.g. a refresh
/// token handed back by an external provider). Keyed by
/// (user_id, login_provider, name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserToken {
    pub user_id: String,
    pub login_provider: String,
    pub name: String,
    pub value: String,
    pub concurrency_stamp: Option<String>,
}

impl UserToken {
    pub fn new(
        user_id: impl Into<String>,
        login_provider: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            login_provider: login_provider.into(),
            name: name.into(),
            value: value.into(),
            concurrency_stamp: None,
        }
    }

    pub fn composite_id(user_id: &str, login_provider: &str, name: &str) -> String {
        format!("{user_id}:{login_provider}:{name}")
    }
}

impl DocumentEntity for UserToken {
    const KIND: ContainerKind = ContainerKind::UserTokens;

    fn doc_id(&self) -> String {
        Self::composite_id(&self.user_id, &self.login_provider, &self.name)
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
