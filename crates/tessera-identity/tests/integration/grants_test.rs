//! Operational-data mapping checks: persisted grants and device flow
//! codes ride the same repository and concurrency machinery as the
//! identity entities.

use std::sync::Arc;

use tessera_model::{DeviceFlowCode, PersistedGrant};
use tessera_store::{Repository, StoreError};
use tessera_testing::fixture::{test_device_code, test_grant};

use crate::helpers::{ct, memory_fixture};

#[tokio::test]
async fn should_point_read_grant_by_its_key() {
    let fx = memory_fixture();
    let mut repo = Repository::new(Arc::clone(&fx.client), Arc::clone(&fx.config));

    let grant = test_grant("grant-1");
    repo.add(&grant).unwrap();
    repo.save_changes(&ct()).await.unwrap();

    let stored: PersistedGrant = repo
        .read("grant-1", "grant-1", &ct())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.client_id, grant.client_id);
    assert_eq!(stored.data, grant.data);
    assert!(stored.concurrency_stamp.is_some());
}

#[tokio::test]
async fn should_reject_stale_grant_consumption() {
    let fx = memory_fixture();
    let mut repo = Repository::new(Arc::clone(&fx.client), Arc::clone(&fx.config));

    let grant = test_grant("grant-1");
    repo.add(&grant).unwrap();
    repo.save_changes(&ct()).await.unwrap();

    let stored: PersistedGrant = repo
        .read("grant-1", "grant-1", &ct())
        .await
        .unwrap()
        .unwrap();

    // Two callers race to mark the grant consumed.
    let mut winner = stored.clone();
    winner.consumed_time = Some(chrono::Utc::now());
    repo.update(&winner).unwrap();
    repo.save_changes(&ct()).await.unwrap();

    let mut loser = stored.clone();
    loser.consumed_time = Some(chrono::Utc::now());
    repo.update(&loser).unwrap();
    let err = repo.save_changes(&ct()).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn should_partition_device_codes_by_session() {
    let fx = memory_fixture();
    let mut repo = Repository::new(Arc::clone(&fx.client), Arc::clone(&fx.config));

    let code = test_device_code("device-1", "session-a");
    repo.add(&code).unwrap();
    repo.save_changes(&ct()).await.unwrap();

    let stored: Option<DeviceFlowCode> = repo.read("session-a", "device-1", &ct()).await.unwrap();
    assert_eq!(stored.unwrap().user_code, code.user_code);

    // The wrong session partition does not see the document.
    let miss: Option<DeviceFlowCode> = repo.read("session-b", "device-1", &ct()).await.unwrap();
    assert!(miss.is_none());
}
