//! Call-counting client wrapper.
//!
//! Wraps any `DocumentClient` and counts round trips per operation kind,
//! so tests can assert that argument validation fails before any store
//! call is made, or that a lookup took the point-read path instead of a
//! scan.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;

use tessera_store::{DocumentClient, StoreError};

#[derive(Default)]
pub struct CountingClient<C> {
    inner: C,
    point_reads: AtomicUsize,
    queries: AtomicUsize,
    writes: AtomicUsize,
}

impl<C> CountingClient<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            point_reads: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn point_reads(&self) -> usize {
        self.point_reads.load(Ordering::SeqCst)
    }

    /// Cross-container queries issued (partition-scoped or fan-out).
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn total_round_trips(&self) -> usize {
        self.point_reads() + self.queries() + self.writes()
    }

    pub fn reset(&self) {
        self.point_reads.store(0, Ordering::SeqCst);
        self.queries.store(0, Ordering::SeqCst);
        self.writes.store(0, Ordering::SeqCst);
    }
}

impl<C: DocumentClient> DocumentClient for CountingClient<C> {
    async fn point_read(
        &self,
        container: &str,
        partition_key: &str,
        id: &str,
    ) -> Result<Option<Value>, StoreError> {
        self.point_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.point_read(container, partition_key, id).await
    }

    async fn query(
        &self,
        container: &str,
        partition_key: Option<&str>,
    ) -> Result<Vec<Value>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.query(container, partition_key).await
    }

    async fn create(
        &self,
        container: &str,
        partition_key: &str,
        id: &str,
        doc: Value,
    ) -> Result<String, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
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
        self.writes.fetch_add(1, Ordering::SeqCst);
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
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(container, partition_key, id, token).await
    }
}
