#![allow(async_fn_in_trait)]

use serde_json::Value;

use crate::error::StoreError;

/// Boundary contract over the document store.
///
/// Implementations write the assigned concurrency token into the
/// document's `concurrency_stamp` field and return it, so a subsequent
/// `replace`/`delete` must present the token last read. A mismatch is a
/// `Conflict`; exactly one of two racing writers wins.
///
/// All methods are single round trips. Cancellation is checked by the
/// layers above, before each call.
pub trait DocumentClient: Send + Sync {
    /// Point read scoped to one partition. Cheap; the preferred path.
    async fn point_read(
        &self,
        container: &str,
        partition_key: &str,
        id: &str,
    ) -> Result<Option<Value>, StoreError>;

    /// Read all documents of a container, optionally scoped to one
    /// partition. Without a partition key this fans out across
    /// partitions and is the expensive path.
    async fn query(
        &self,
        container: &str,
        partition_key: Option<&str>,
    ) -> Result<Vec<Value>, StoreError>;

    /// Insert a new document. Fails with `Conflict` if the id already
    /// exists in the partition. Returns the assigned concurrency token.
    async fn create(
        &self,
        container: &str,
        partition_key: &str,
        id: &str,
        doc: Value,
    ) -> Result<String, StoreError>;

    /// Replace an existing document if `token` matches the stored one.
    /// Fails with `Conflict` on mismatch and `NotFound` if the document
    /// is gone. Returns the fresh token.
    async fn replace(
        &self,
        container: &str,
        partition_key: &str,
        id: &str,
        doc: Value,
        token: Option<&str>,
    ) -> Result<String, StoreError>;

    /// Delete a document if `token` matches. A `None` token skips the
    /// check (used by cleanup paths that tolerate losing the race).
    async fn delete(
        &self,
        container: &str,
        partition_key: &str,
        id: &str,
        token: Option<&str>,
    ) -> Result<(), StoreError>;
}
