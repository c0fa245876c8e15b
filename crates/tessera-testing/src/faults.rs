//! Fault-injecting client wrapper.
//!
//! Arms one fault at a time; the next store round trip of any kind
//! consumes it and fails with the corresponding `StoreError`, letting
//! tests drive the throttled/unavailable/conflict error paths
//! deterministically.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;

use tessera_store::{DocumentClient, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Throttled,
    Unavailable,
    Conflict,
}

impl Fault {
    fn into_error(self) -> StoreError {
        match self {
            Self::Throttled => StoreError::Throttled {
                retry_after: Some(Duration::from_millis(100)),
            },
            Self::Unavailable => StoreError::Unavailable("injected outage".to_owned()),
            Self::Conflict => StoreError::Conflict("injected conflict".to_owned()),
        }
    }
}

pub struct FaultClient<C> {
    inner: C,
    armed: Mutex<VecDeque<Fault>>,
}

impl<C> FaultClient<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            armed: Mutex::new(VecDeque::new()),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Queue a fault; each store call consumes at most one.
    pub fn arm(&self, fault: Fault) {
        self.armed.lock().expect("fault lock poisoned").push_back(fault);
    }

    fn take(&self) -> Option<Fault> {
        self.armed.lock().expect("fault lock poisoned").pop_front()
    }
}

impl<C: DocumentClient> DocumentClient for FaultClient<C> {
    async fn point_read(
        &self,
        container: &str,
        partition_key: &str,
        id: &str,
    ) -> Result<Option<Value>, StoreError> {
        if let Some(fault) = self.take() {
            return Err(fault.into_error());
        }
        self.inner.point_read(container, partition_key, id).await
    }

    async fn query(
        &self,
        container: &str,
        partition_key: Option<&str>,
    ) -> Result<Vec<Value>, StoreError> {
        if let Some(fault) = self.take() {
            return Err(fault.into_error());
        }
        self.inner.query(container, partition_key).await
    }

    async fn create(
        &self,
        container: &str,
        partition_key: &str,
        id: &str,
        doc: Value,
    ) -> Result<String, StoreError> {
        if let Some(fault) = self.take() {
            return Err(fault.into_error());
        }
        self.inner.create(container, partition_key, id, doc).await
    }

    async fn replace(
        &self,
        container: &str,
        partition_key: &str,
        id: &str,
        doc: Value,
        token: Option<&str>,
    ) -> Result<String, StoreError> {
        if let Some(fault) = self.take() {
            return Err(fault.into_error());
        }
        self.inner
            .replace(container, partition_key, id, doc, token)
            .await
    }

    async fn delete(
        &self,
        container: &str,
        partition_key: &str,
        id: &str,
        token: Option<&str>,
    ) -> Result<(), StoreError> {
        if let Some(fault) = self.take() {
            return Err(fault.into_error());
        }
        self.inner.delete(container, partition_key, id, token).await
    }
}
