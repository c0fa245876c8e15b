use serde::{Deserialize, Serialize};

use crate::container::{ContainerKind, DocumentEntity};

/// Which unique lookup an index entry serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    UserName,
    UserEmail,
    RoleName,
}

impl IndexKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::UserName => "user-name",
            Self::UserEmail => "user-email",
            Self::RoleName => "role-name",
        }
    }
}

/// Secondary unique index entry: normalized lookup value → target id.
///
/// The document id is `<kind-prefix>:<normalized value>` and is also the
/// partition key, turning name/email lookups into single-partition point
/// reads instead of cross-partition scans. Entries are staged in the same
/// commit as the primary document; a missing entry degrades the lookup to
/// a scan, it never makes a record unreachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub kind: IndexKind,
    pub value: String,
    pub target_id: String,
    pub concurrency_stamp: Option<String>,
}

impl IndexEntry {
    pub fn new(kind: IndexKind, value: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            target_id: target_id.into(),
            concurrency_stamp: None,
        }
    }

    pub fn composite_id(kind: IndexKind, value: &str) -> String {
        format!("{}:{}", kind.prefix(), value)
    }
}

impl DocumentEntity for IndexEntry {
    const KIND: ContainerKind = ContainerKind::Index;

    fn doc_id(&self) -> String {
        Self::composite_id(self.kind, &self.value)
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
