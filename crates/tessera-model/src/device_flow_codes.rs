use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::container::{ContainerKind, DocumentEntity};

/// OAuth device-flow authorization pending approval. Partitioned by the
/// session id, so all codes of one session co-locate; the device code is
/// the document id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFlowCode {
    pub device_code: String,
    pub user_code: String,
    pub subject_id: Option<String>,
    pub session_id: String,
    pub client_id: String,
    pub description: Option<String>,
    pub creation_time: DateTime<Utc>,
    pub expiration: DateTime<Utc>,
    pub data: String,
    pub concurrency_stamp: Option<String>,
}

impl DocumentEntity for DeviceFlowCode {
    const KIND: ContainerKind = ContainerKind::DeviceFlowCodes;

    fn doc_id(&self) -> String {
        self.device_code.clone()
    }

    fn partition_key(&self) -> String {
        self.session_id.clone()
    }

    fn concurrency_token(&self) -> Option<&str> {
        self.concurrency_stamp.as_deref()
    }

    fn set_concurrency_token(&mut self, token: Option<String>) {
        self.concurrency_stamp = token;
    }
}
