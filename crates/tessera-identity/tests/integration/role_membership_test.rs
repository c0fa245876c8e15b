use tessera_identity::IdentityError;
use tessera_identity::stores::{RoleStore, UserRoleStore, UserStore};
use tessera_testing::fixture::{test_role_named, test_user, test_user_named};

use crate::helpers::{ct, memory_fixture};

// ── membership lifecycle ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_add_check_and_remove_membership() {
    let fx = memory_fixture();
    let token = ct();

    let mut user = test_user();
    fx.users.create(&mut user, &token).await.unwrap();
    let mut role = test_role_named("admin");
    fx.roles.create(&mut role, &token).await.unwrap();

    assert!(!fx.users.is_in_role(&user, "ADMIN", &token).await.unwrap());

    fx.users.add_to_role(&user, "ADMIN", &token).await.unwrap();
    assert!(fx.users.is_in_role(&user, "ADMIN", &token).await.unwrap());
    assert_eq!(fx.users.roles(&user, &token).await.unwrap(), vec!["admin"]);

    // Adding the same membership again is a no-op, not a conflict.
    fx.users.add_to_role(&user, "ADMIN", &token).await.unwrap();
    assert_eq!(fx.client.len("identity_user_roles"), 1);

    fx.users.remove_from_role(&user, "ADMIN", &token).await.unwrap();
    assert!(!fx.users.is_in_role(&user, "ADMIN", &token).await.unwrap());
}

#[tokio::test]
async fn should_fail_membership_change_for_unknown_role() {
    let fx = memory_fixture();
    let token = ct();
    let mut user = test_user();
    fx.users.create(&mut user, &token).await.unwrap();

    let err = fx.users.add_to_role(&user, "GHOST", &token).await.unwrap_err();
    assert!(matches!(err, IdentityError::RoleNotFound(_)));

    let err = fx
        .users
        .remove_from_role(&user, "GHOST", &token)
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::RoleNotFound(_)));

    // Pure queries degrade gracefully instead.
    assert!(!fx.users.is_in_role(&user, "GHOST", &token).await.unwrap());
    assert!(fx.users.users_in_role("GHOST", &token).await.unwrap().is_empty());
}

#[tokio::test]
async fn should_list_all_users_in_role() {
    let fx = memory_fixture();
    let token = ct();

    let mut role = test_role_named("ops");
    fx.roles.create(&mut role, &token).await.unwrap();

    let mut members = Vec::new();
    for name in ["alice", "bob"] {
        let mut user = test_user_named(name);
        fx.users.create(&mut user, &token).await.unwrap();
        fx.users.add_to_role(&user, "OPS", &token).await.unwrap();
        members.push(user.id.clone());
    }
    let mut outsider = test_user_named("carol");
    fx.users.create(&mut outsider, &token).await.unwrap();

    let mut in_role: Vec<_> = fx
        .users
        .users_in_role("OPS", &token)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();
    in_role.sort();
    members.sort();
    assert_eq!(in_role, members);
}

// ── role store ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_let_exactly_one_of_two_racing_role_updates_win() {
    let fx = memory_fixture();
    let token = ct();
    let mut role = test_role_named("admin");
    fx.roles.create(&mut role, &token).await.unwrap();

    let mut first = role.clone();
    let mut second = role.clone();

    first.name = "administrators".into();
    fx.roles.update(&mut first, &token).await.unwrap();

    second.name = "ops".into();
    let err = fx.roles.update(&mut second, &token).await.unwrap_err();
    assert!(matches!(err, IdentityError::Conflict { .. }));

    let stored = fx.roles.find_by_id(&role.id, &token).await.unwrap().unwrap();
    assert_eq!(stored.name, "administrators");
}

#[tokio::test]
async fn should_cascade_role_delete_to_memberships() {
    let fx = memory_fixture();
    let token = ct();

    let mut user = test_user();
    fx.users.create(&mut user, &token).await.unwrap();
    let mut role = test_role_named("admin");
    fx.roles.create(&mut role, &token).await.unwrap();
    fx.users.add_to_role(&user, "ADMIN", &token).await.unwrap();

    fx.roles.delete(&role, &token).await.unwrap();

    assert!(fx.client.is_empty("identity_roles"));
    assert!(fx.client.is_empty("identity_user_roles"));
    assert!(fx.roles.find_by_name("ADMIN", &token).await.unwrap().is_none());
    // The user itself is untouched.
    assert!(fx.users.find_by_id(&user.id, &token).await.unwrap().is_some());
}
