use tokio_util::sync::CancellationToken;

use tessera_model::DocumentEntity;

use crate::client::DocumentClient;
use crate::error::StoreError;

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Queryable projection over one entity type's container.
///
/// `with_partition_key` scopes the read to a single partition (cheap);
/// without it the query fans out across all partitions, which is the
/// documented expensive path and reserved for rare lookups. Predicates
/// are applied after deserialization; a production client pushes them
/// down to the store.
pub struct Query<'a, C, T> {
    client: &'a C,
    container: String,
    partition_key: Option<String>,
    predicates: Vec<Predicate<T>>,
}

impl<'a, C: DocumentClient, T: DocumentEntity> Query<'a, C, T> {
    pub(crate) fn new(client: &'a C, container: String) -> Self {
        Self {
            client,
            container,
            partition_key: None,
            predicates: Vec::new(),
        }
    }

    pub fn with_partition_key(mut self, partition_key: impl Into<String>) -> Self {
        self.partition_key = Some(partition_key.into());
        self
    }

    pub fn filter(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    /// All matching entities. Checks the cancellation token before the
    /// round trip.
    pub async fn all(self, ct: &CancellationToken) -> Result<Vec<T>, StoreError> {
        if ct.is_cancelled() {
            return Err(StoreError::Canceled);
        }
        let docs = self
            .client
            .query(&self.container, self.partition_key.as_deref())
            .await?;
        let mut entities = Vec::with_capacity(docs.len());
        for doc in docs {
            let entity: T = serde_json::from_value(doc)?;
            if self.predicates.iter().all(|p| p(&entity)) {
                entities.push(entity);
            }
        }
        Ok(entities)
    }

    /// First matching entity, or `None`. Absence is not an error.
    pub async fn one(self, ct: &CancellationToken) -> Result<Option<T>, StoreError> {
        Ok(self.all(ct).await?.into_iter().next())
    }
}
