//! In-memory reference implementation of the document client.
//!
//! Faithful to the partition/token semantics of the real store: documents
//! live under (partition key, id), every successful write assigns a fresh
//! token, and stale tokens are rejected with `Conflict`. Used by tests
//! and local development; the production SDK client is wired externally.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;
use uuid::Uuid;

use crate::client::DocumentClient;
use crate::error::StoreError;

type Partition = HashMap<String, Value>;
type Container = HashMap<String, Partition>;

#[derive(Default)]
pub struct MemoryDocumentClient {
    containers: RwLock<HashMap<String, Container>>,
}

impl MemoryDocumentClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored in a container.
    pub fn len(&self, container: &str) -> usize {
        self.containers
            .read()
            .expect("store lock poisoned")
            .get(container)
            .map(|c| c.values().map(Partition::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, container: &str) -> bool {
        self.len(container) == 0
    }

    fn fresh_token() -> String {
        Uuid::new_v4().to_string()
    }

    fn stored_token(doc: &Value) -> Option<&str> {
        doc.get("concurrency_stamp").and_then(Value::as_str)
    }

    fn stamp(doc: &mut Value, token: &str) {
        if let Value::Object(map) = doc {
            map.insert("concurrency_stamp".to_owned(), Value::String(token.into()));
        }
    }
}

impl DocumentClient for MemoryDocumentClient {
    async fn point_read(
        &self,
        container: &str,
        partition_key: &str,
        id: &str,
    ) -> Result<Option<Value>, StoreError> {
        let containers = self.containers.read().expect("store lock poisoned");
        Ok(containers
            .get(container)
            .and_then(|c| c.get(partition_key))
            .and_then(|p| p.get(id))
            .cloned())
    }

    async fn query(
        &self,
        container: &str,
        partition_key: Option<&str>,
    ) -> Result<Vec<Value>, StoreError> {
        let containers = self.containers.read().expect("store lock poisoned");
        let Some(container) = containers.get(container) else {
            return Ok(vec![]);
        };
        let docs = match partition_key {
            Some(pk) => container
                .get(pk)
                .map(|p| p.values().cloned().collect())
                .unwrap_or_default(),
            None => container
                .values()
                .flat_map(|p| p.values().cloned())
                .collect(),
        };
        Ok(docs)
    }

    async fn create(
        &self,
        container: &str,
        partition_key: &str,
        id: &str,
        mut doc: Value,
    ) -> Result<String, StoreError> {
        let mut containers = self.containers.write().expect("store lock poisoned");
        let partition = containers
            .entry(container.to_owned())
            .or_default()
            .entry(partition_key.to_owned())
            .or_default();
        if partition.contains_key(id) {
            return Err(StoreError::Conflict(format!(
                "document '{id}' already exists in '{container}'"
            )));
        }
        let token = Self::fresh_token();
        Self::stamp(&mut doc, &token);
        partition.insert(id.to_owned(), doc);
        Ok(token)
    }

    async fn replace(
        &self,
        container: &str,
        partition_key: &str,
        id: &str,
        mut doc: Value,
        token: Option<&str>,
    ) -> Result<String, StoreError> {
        let mut containers = self.containers.write().expect("store lock poisoned");
        let stored = containers
            .get_mut(container)
            .and_then(|c| c.get_mut(partition_key))
            .and_then(|p| p.get_mut(id))
            .ok_or(StoreError::NotFound)?;
        if Self::stored_token(stored) != token {
            return Err(StoreError::Conflict(format!(
                "stale concurrency token for document '{id}' in '{container}'"
            )));
        }
        let fresh = Self::fresh_token();
        Self::stamp(&mut doc, &fresh);
        *stored = doc;
        Ok(fresh)
    }

    async fn delete(
        &self,
        container: &str,
        partition_key: &str,
        id: &str,
        token: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut containers = self.containers.write().expect("store lock poisoned");
        let partition = containers
            .get_mut(container)
            .and_then(|c| c.get_mut(partition_key))
            .ok_or(StoreError::NotFound)?;
        let stored = partition.get(id).ok_or(StoreError::NotFound)?;
        if let Some(expected) = token {
            if Self::stored_token(stored) != Some(expected) {
                return Err(StoreError::Conflict(format!(
                    "stale concurrency token for document '{id}' in '{container}'"
                )));
            }
        }
        partition.remove(id);
        Ok(())
    }
}
