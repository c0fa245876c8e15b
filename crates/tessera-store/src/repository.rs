use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use tessera_model::DocumentEntity;

use crate::client::DocumentClient;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::query::Query;

enum StagedKind {
    Add { doc: Value },
    Replace { doc: Value, token: Option<String> },
    Delete { token: Option<String> },
}

struct StagedOp {
    container: String,
    partition_key: String,
    id: String,
    kind: StagedKind,
}

impl StagedOp {
    fn verb(&self) -> &'static str {
        match self.kind {
            StagedKind::Add { .. } => "add",
            StagedKind::Replace { .. } => "replace",
            StagedKind::Delete { .. } => "delete",
        }
    }
}

/// Request-scoped unit of work over the document store.
///
/// `add`/`update`/`delete` stage mutations without I/O; `save_changes`
/// commits them in staging order. Each write is independently atomic at
/// the partition-document level, but the batch as a whole is not: a
/// failure mid-commit aborts the remainder and leaves earlier writes in
/// place. Callers order their staging so partial outcomes stay valid
/// (primary document first, side records after).
///
/// A `Repository` is not meant to be shared across concurrent callers;
/// the underlying client is.
pub struct Repository<C> {
    client: Arc<C>,
    config: Arc<StoreConfig>,
    staged: Vec<StagedOp>,
}

impl<C: DocumentClient> Repository<C> {
    pub fn new(client: Arc<C>, config: Arc<StoreConfig>) -> Self {
        Self {
            client,
            config,
            staged: Vec::new(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn container_of<T: DocumentEntity>(&self) -> String {
        self.config.container_name(T::KIND).to_owned()
    }

    /// Stage an insert. The document must not exist yet.
    pub fn add<T: DocumentEntity>(&mut self, entity: &T) -> Result<(), StoreError> {
        let doc = serde_json::to_value(entity)?;
        self.staged.push(StagedOp {
            container: self.container_of::<T>(),
            partition_key: entity.partition_key(),
            id: entity.doc_id(),
            kind: StagedKind::Add { doc },
        });
        Ok(())
    }

    /// Stage a replace carrying the concurrency token last read. The
    /// commit fails with `Conflict` if the stored token has moved on.
    pub fn update<T: DocumentEntity>(&mut self, entity: &T) -> Result<(), StoreError> {
        let doc = serde_json::to_value(entity)?;
        self.staged.push(StagedOp {
            container: self.container_of::<T>(),
            partition_key: entity.partition_key(),
            id: entity.doc_id(),
            kind: StagedKind::Replace {
                doc,
                token: entity.concurrency_token().map(str::to_owned),
            },
        });
        Ok(())
    }

    /// Stage a token-checked delete.
    pub fn delete<T: DocumentEntity>(&mut self, entity: &T) {
        self.staged.push(StagedOp {
            container: self.container_of::<T>(),
            partition_key: entity.partition_key(),
            id: entity.doc_id(),
            kind: StagedKind::Delete {
                token: entity.concurrency_token().map(str::to_owned),
            },
        });
    }

    /// Stage a delete that skips the token check. Cleanup paths use this
    /// when losing a concurrent race is acceptable.
    pub fn delete_unchecked<T: DocumentEntity>(&mut self, entity: &T) {
        self.staged.push(StagedOp {
            container: self.container_of::<T>(),
            partition_key: entity.partition_key(),
            id: entity.doc_id(),
            kind: StagedKind::Delete { token: None },
        });
    }

    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Commit all staged mutations in order. The cancellation token is
    /// checked before every round trip, never mid-call. Returns the fresh
    /// concurrency token per staged op (`None` for deletes), aligned with
    /// staging order.
    ///
    /// On error the staged set is consumed: the failed op and everything
    /// after it are abandoned, everything before it is already committed.
    pub async fn save_changes(
        &mut self,
        ct: &CancellationToken,
    ) -> Result<Vec<Option<String>>, StoreError> {
        let staged = std::mem::take(&mut self.staged);
        tracing::debug!(ops = staged.len(), "committing staged mutations");

        let mut tokens = Vec::with_capacity(staged.len());
        for op in staged {
            if ct.is_cancelled() {
                return Err(StoreError::Canceled);
            }
            let verb = op.verb();
            let result = match &op.kind {
                StagedKind::Add { doc } => self
                    .client
                    .create(&op.container, &op.partition_key, &op.id, doc.clone())
                    .await
                    .map(Some),
                StagedKind::Replace { doc, token } => self
                    .client
                    .replace(
                        &op.container,
                        &op.partition_key,
                        &op.id,
                        doc.clone(),
                        token.as_deref(),
                    )
                    .await
                    .map(Some),
                StagedKind::Delete { token } => self
                    .client
                    .delete(&op.container, &op.partition_key, &op.id, token.as_deref())
                    .await
                    .map(|()| None),
            };
            match result {
                Ok(token) => tokens.push(token),
                Err(e) => {
                    tracing::debug!(
                        container = %op.container,
                        id = %op.id,
                        op = verb,
                        kind = e.kind(),
                        "staged mutation failed, aborting batch"
                    );
                    return Err(e);
                }
            }
        }
        Ok(tokens)
    }

    /// Partition-scoped point read, the O(1) lookup path.
    pub async fn read<T: DocumentEntity>(
        &self,
        partition_key: &str,
        id: &str,
        ct: &CancellationToken,
    ) -> Result<Option<T>, StoreError> {
        if ct.is_cancelled() {
            return Err(StoreError::Canceled);
        }
        let container = self.container_of::<T>();
        let doc = self.client.point_read(&container, partition_key, id).await?;
        doc.map(serde_json::from_value).transpose().map_err(Into::into)
    }

    /// Queryable projection over one entity type's container.
    pub fn table<T: DocumentEntity>(&self) -> Query<'_, C, T> {
        Query::new(&self.client, self.container_of::<T>())
    }
}
