//! Error translation under injected store faults.

use tessera_identity::IdentityError;
use tessera_identity::stores::UserStore;
use tessera_testing::Fault;
use tessera_testing::fixture::test_user;

use crate::helpers::{ct, fault_fixture};

#[tokio::test]
async fn should_surface_throttling_as_retryable() {
    let fx = fault_fixture();
    fx.client.arm(Fault::Throttled);

    let mut user = test_user();
    let err = fx.users.create(&mut user, &ct()).await.unwrap_err();
    assert!(matches!(err, IdentityError::Throttled { retry_after: Some(_) }));
    assert!(err.is_retryable());

    // Retry succeeds once the pressure is gone, and the entity still
    // picks up its token.
    fx.users.create(&mut user, &ct()).await.unwrap();
    assert!(user.concurrency_stamp.is_some());
}

#[tokio::test]
async fn should_surface_outage_as_store_unavailable() {
    let fx = fault_fixture();
    fx.client.arm(Fault::Unavailable);

    let mut user = test_user();
    let err = fx.users.create(&mut user, &ct()).await.unwrap_err();
    assert!(matches!(err, IdentityError::StoreUnavailable { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn should_keep_conflict_distinct_from_transient_faults() {
    let fx = fault_fixture();
    fx.client.arm(Fault::Conflict);

    let mut user = test_user();
    let err = fx.users.create(&mut user, &ct()).await.unwrap_err();
    assert!(matches!(err, IdentityError::Conflict { .. }));
    assert!(!err.is_retryable(), "a conflict needs a re-read, not a retry");
}

#[tokio::test]
async fn should_leave_user_intact_when_delete_hits_an_outage() {
    let fx = fault_fixture();
    let token = ct();

    let mut user = test_user();
    fx.users.create(&mut user, &token).await.unwrap();

    fx.client.arm(Fault::Unavailable);
    let err = fx.users.delete(&user, &token).await.unwrap_err();
    assert!(matches!(err, IdentityError::StoreUnavailable { .. }));

    // Nothing was committed; the user is still there and deletable.
    assert!(fx.users.find_by_id(&user.id, &token).await.unwrap().is_some());
    fx.users.delete(&user, &token).await.unwrap();
    assert!(fx.users.find_by_id(&user.id, &token).await.unwrap().is_none());
}
