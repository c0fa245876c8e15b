use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use tessera_identity::{DocumentRoleStore, DocumentUserStore};
use tessera_store::{MemoryDocumentClient, StoreConfig};
use tessera_testing::{CountingClient, FaultClient};

pub struct Fixture<C> {
    pub client: Arc<C>,
    pub config: Arc<StoreConfig>,
    pub users: DocumentUserStore<C>,
    pub roles: DocumentRoleStore<C>,
}

fn fixture_with<C: tessera_store::DocumentClient>(client: C) -> Fixture<C> {
    let client = Arc::new(client);
    let config = Arc::new(StoreConfig::new());
    Fixture {
        users: DocumentUserStore::new(Arc::clone(&client), Arc::clone(&config)),
        roles: DocumentRoleStore::new(Arc::clone(&client), Arc::clone(&config)),
        client,
        config,
    }
}

pub fn memory_fixture() -> Fixture<MemoryDocumentClient> {
    fixture_with(MemoryDocumentClient::new())
}

pub fn counting_fixture() -> Fixture<CountingClient<MemoryDocumentClient>> {
    fixture_with(CountingClient::new(MemoryDocumentClient::new()))
}

pub fn fault_fixture() -> Fixture<FaultClient<MemoryDocumentClient>> {
    fixture_with(FaultClient::new(MemoryDocumentClient::new()))
}

pub fn ct() -> CancellationToken {
    CancellationToken::new()
}
