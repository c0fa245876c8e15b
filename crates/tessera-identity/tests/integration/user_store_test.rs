use tessera_identity::IdentityError;
use tessera_identity::stores::{
    Claim, LoginInfo, RoleStore, UserClaimStore, UserEmailStore, UserLoginStore, UserRoleStore,
    UserStore, UserTokenStore,
};
use tessera_testing::fixture::{test_role, test_user, test_user_named};

use crate::helpers::{counting_fixture, ct, memory_fixture};

// ── create / find ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_find_created_user_by_id_with_equal_fields() {
    let fx = memory_fixture();
    let mut user = test_user();
    fx.users.create(&mut user, &ct()).await.unwrap();

    let found = fx.users.find_by_id(&user.id, &ct()).await.unwrap().unwrap();
    assert_eq!(found, user, "stored user must round-trip unchanged");
}

#[tokio::test]
async fn should_find_by_exact_normalized_name_only() {
    let fx = memory_fixture();
    let mut user = test_user_named("Alice");
    fx.users.create(&mut user, &ct()).await.unwrap();

    let found = fx.users.find_by_name("ALICE", &ct()).await.unwrap();
    assert_eq!(found.unwrap().id, user.id);

    // Lookup is by the normalized value verbatim; no transformation here.
    assert!(fx.users.find_by_name("alice", &ct()).await.unwrap().is_none());
}

#[tokio::test]
async fn should_find_by_normalized_email() {
    let fx = memory_fixture();
    let mut user = test_user();
    fx.users.create(&mut user, &ct()).await.unwrap();

    let found = fx
        .users
        .find_by_email("ALICE@EXAMPLE.COM", &ct())
        .await
        .unwrap();
    assert_eq!(found.unwrap().id, user.id);
}

#[tokio::test]
async fn should_serve_name_lookup_with_point_reads_only() {
    let fx = counting_fixture();
    let mut user = test_user_named("Alice");
    fx.users.create(&mut user, &ct()).await.unwrap();

    fx.client.reset();
    fx.users.find_by_name("ALICE", &ct()).await.unwrap().unwrap();

    assert_eq!(fx.client.point_reads(), 2, "index entry then user document");
    assert_eq!(fx.client.queries(), 0, "no cross-partition scan on the indexed path");
}

// ── validation and cancellation ──────────────────────────────────────────────

#[tokio::test]
async fn should_reject_invalid_arguments_without_store_round_trips() {
    let fx = counting_fixture();

    let mut nameless = test_user();
    nameless.user_name = String::new();
    let err = fx.users.create(&mut nameless, &ct()).await.unwrap_err();
    assert!(matches!(err, IdentityError::InvalidArgument(_)));

    let err = fx.users.find_by_id("  ", &ct()).await.unwrap_err();
    assert!(matches!(err, IdentityError::InvalidArgument(_)));

    assert_eq!(fx.client.total_round_trips(), 0);
}

#[tokio::test]
async fn should_refuse_work_on_canceled_token() {
    let fx = counting_fixture();
    let token = ct();
    token.cancel();

    let mut user = test_user();
    let err = fx.users.create(&mut user, &token).await.unwrap_err();
    assert!(matches!(err, IdentityError::Canceled));
    assert_eq!(fx.client.total_round_trips(), 0);
}

// ── optimistic concurrency ───────────────────────────────────────────────────

#[tokio::test]
async fn should_fail_update_carrying_stale_token() {
    let fx = memory_fixture();
    let mut user = test_user();
    fx.users.create(&mut user, &ct()).await.unwrap();

    let mut winner = user.clone();
    let mut loser = user.clone();

    winner.phone_number = Some("123".into());
    fx.users.update(&mut winner, &ct()).await.unwrap();

    loser.phone_number = Some("456".into());
    let err = fx.users.update(&mut loser, &ct()).await.unwrap_err();
    assert!(matches!(err, IdentityError::Conflict { .. }));

    let stored = fx.users.find_by_id(&user.id, &ct()).await.unwrap().unwrap();
    assert_eq!(stored.phone_number.as_deref(), Some("123"));
}

#[tokio::test]
async fn should_fail_update_of_deleted_user_as_conflict() {
    let fx = memory_fixture();
    let mut user = test_user();
    fx.users.create(&mut user, &ct()).await.unwrap();
    fx.users.delete(&user, &ct()).await.unwrap();

    let err = fx.users.update(&mut user, &ct()).await.unwrap_err();
    assert!(matches!(err, IdentityError::Conflict { .. }));
}

#[tokio::test]
async fn should_move_index_entries_when_email_changes() {
    let fx = memory_fixture();
    let mut user = test_user();
    fx.users.create(&mut user, &ct()).await.unwrap();

    user.email = "new@example.com".into();
    user.normalized_email = "NEW@EXAMPLE.COM".into();
    fx.users.update(&mut user, &ct()).await.unwrap();

    assert!(
        fx.users
            .find_by_email("NEW@EXAMPLE.COM", &ct())
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        fx.users
            .find_by_email("ALICE@EXAMPLE.COM", &ct())
            .await
            .unwrap()
            .is_none()
    );
}

// ── cascade delete ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_leave_no_side_records_after_delete() {
    let fx = memory_fixture();
    let token = ct();

    let mut user = test_user();
    fx.users.create(&mut user, &token).await.unwrap();
    let mut role = test_role();
    fx.roles.create(&mut role, &token).await.unwrap();

    fx.users.add_to_role(&user, "ADMIN", &token).await.unwrap();
    fx.users
        .add_login(
            &user,
            &LoginInfo {
                login_provider: "github".into(),
                provider_key: "gh-1".into(),
                provider_display_name: None,
            },
            &token,
        )
        .await
        .unwrap();
    fx.users
        .add_claims(
            &user,
            &[Claim {
                claim_type: "scope".into(),
                claim_value: "read".into(),
            }],
            &token,
        )
        .await
        .unwrap();
    fx.users
        .set_token(&user, "github", "refresh", "r-1", &token)
        .await
        .unwrap();

    fx.users.delete(&user, &token).await.unwrap();

    assert!(fx.client.is_empty("identity_users"));
    assert!(fx.client.is_empty("identity_user_roles"));
    assert!(fx.client.is_empty("identity_user_logins"));
    assert!(fx.client.is_empty("identity_user_claims"));
    assert!(fx.client.is_empty("identity_user_tokens"));
    // Only the role's own index entry may remain.
    assert_eq!(fx.client.len("identity_index"), 1);
    assert!(fx.users.find_by_name("ALICE", &ct()).await.unwrap().is_none());
}

// ── external logins ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_resolve_user_through_external_login() {
    let fx = memory_fixture();
    let mut user = test_user();
    fx.users.create(&mut user, &ct()).await.unwrap();

    let login = LoginInfo {
        login_provider: "github".into(),
        provider_key: "gh-1".into(),
        provider_display_name: Some("GitHub".into()),
    };
    fx.users.add_login(&user, &login, &ct()).await.unwrap();

    let found = fx
        .users
        .find_by_login("github", "gh-1", &ct())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(fx.users.logins(&user, &ct()).await.unwrap(), vec![login]);
}

#[tokio::test]
async fn should_surface_duplicate_login_as_conflict() {
    let fx = memory_fixture();
    let mut user = test_user();
    fx.users.create(&mut user, &ct()).await.unwrap();

    let login = LoginInfo {
        login_provider: "github".into(),
        provider_key: "gh-1".into(),
        provider_display_name: None,
    };
    fx.users.add_login(&user, &login, &ct()).await.unwrap();

    let err = fx.users.add_login(&user, &login, &ct()).await.unwrap_err();
    assert!(matches!(err, IdentityError::Conflict { .. }), "duplicates must not be swallowed");
}

#[tokio::test]
async fn should_treat_removal_of_absent_login_as_noop() {
    let fx = memory_fixture();
    let mut user = test_user();
    fx.users.create(&mut user, &ct()).await.unwrap();

    fx.users
        .remove_login(&user, "github", "ghost", &ct())
        .await
        .unwrap();
}

// ── claims ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_manage_claim_lifecycle() {
    let fx = memory_fixture();
    let token = ct();
    let mut user = test_user();
    fx.users.create(&mut user, &token).await.unwrap();

    let read = Claim {
        claim_type: "scope".into(),
        claim_value: "read".into(),
    };
    let write = Claim {
        claim_type: "scope".into(),
        claim_value: "write".into(),
    };
    fx.users
        .add_claims(&user, &[read.clone(), write.clone()], &token)
        .await
        .unwrap();
    assert_eq!(fx.users.claims(&user, &token).await.unwrap().len(), 2);

    let admin = Claim {
        claim_type: "scope".into(),
        claim_value: "admin".into(),
    };
    fx.users
        .replace_claim(&user, &write, &admin, &token)
        .await
        .unwrap();
    let claims = fx.users.claims(&user, &token).await.unwrap();
    assert!(claims.contains(&admin));
    assert!(!claims.contains(&write));

    fx.users
        .remove_claims(&user, &[read.clone()], &token)
        .await
        .unwrap();
    assert_eq!(fx.users.claims(&user, &token).await.unwrap(), vec![admin.clone()]);

    let holders = fx.users.users_for_claim(&admin, &token).await.unwrap();
    assert_eq!(holders.len(), 1);
    assert_eq!(holders[0].id, user.id);
}

// ── provider tokens ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_set_overwrite_and_remove_provider_token() {
    let fx = memory_fixture();
    let token = ct();
    let mut user = test_user();
    fx.users.create(&mut user, &token).await.unwrap();

    fx.users
        .set_token(&user, "github", "refresh", "r-1", &token)
        .await
        .unwrap();
    assert_eq!(
        fx.users.token(&user, "github", "refresh", &token).await.unwrap(),
        Some("r-1".to_owned())
    );

    // Setting again overwrites in place.
    fx.users
        .set_token(&user, "github", "refresh", "r-2", &token)
        .await
        .unwrap();
    assert_eq!(
        fx.users.token(&user, "github", "refresh", &token).await.unwrap(),
        Some("r-2".to_owned())
    );

    fx.users
        .remove_token(&user, "github", "refresh", &token)
        .await
        .unwrap();
    assert_eq!(
        fx.users.token(&user, "github", "refresh", &token).await.unwrap(),
        None
    );
}
