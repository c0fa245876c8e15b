use serde::{Deserialize, Serialize};

use crate::container::{ContainerKind, DocumentEntity};

/// External login bound to a user. Uniqueness is the composite
/// (login_provider, provider_key), which doubles as the document id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLogin {
    pub user_id: String,
    pub login_provider: String,
    pub provider_key: String,
    pub provider_display_name: Option<String>,
    pub concurrency_stamp: Option<String>,
}

impl UserLogin {
    pub fn new(
        user_id: impl Into<String>,
        login_provider: impl Into<String>,
        provider_key: impl Into<String>,
        provider_display_name: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            login_provider: login_provider.into(),
            provider_key: provider_key.into(),
            provider_display_name,
            concurrency_stamp: None,
        }
    }

    pub fn composite_id(login_provider: &str, provider_key: &str) -> String {
        format!("{login_provider}:{provider_key}")
    }
}

impl DocumentEntity for UserLogin {
    const KIND: ContainerKind = ContainerKind::UserLogins;

    fn doc_id(&self) -> String {
        Self::composite_id(&self.login_provider, &self.provider_key)
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
