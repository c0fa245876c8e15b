use std::sync::Arc;

use tessera_identity::Reconciler;
use tessera_identity::stores::{LoginInfo, RoleStore, UserLoginStore, UserRoleStore, UserStore};
use tessera_model::{IndexEntry, IndexKind, UserClaim, UserLogin, UserRole, UserToken};
use tessera_store::Repository;
use tessera_testing::fixture::{test_role_named, test_user};

use crate::helpers::{ct, memory_fixture};

#[tokio::test]
async fn should_sweep_planted_orphans_and_keep_owned_records() {
    let fx = memory_fixture();
    let token = ct();

    // Live data that must survive the sweep.
    let mut user = test_user();
    fx.users.create(&mut user, &token).await.unwrap();
    let mut role = test_role_named("admin");
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

    // Orphans, as a crash between the primary delete and its cascade
    // would leave them.
    let mut repo = Repository::new(Arc::clone(&fx.client), Arc::clone(&fx.config));
    repo.add(&UserRole::new("ghost", &role.id)).unwrap();
    repo.add(&UserLogin::new("ghost", "github", "gh-ghost", None))
        .unwrap();
    repo.add(&UserClaim::new("ghost", "scope", "read")).unwrap();
    repo.add(&UserToken::new("ghost", "github", "refresh", "r-1"))
        .unwrap();
    repo.add(&IndexEntry::new(IndexKind::UserName, "GHOST", "ghost"))
        .unwrap();
    repo.save_changes(&token).await.unwrap();

    let reconciler = Reconciler::new(Arc::clone(&fx.client), Arc::clone(&fx.config));
    let report = reconciler.run(&token).await.unwrap();

    assert_eq!(report.removed_user_roles, 1);
    assert_eq!(report.removed_user_logins, 1);
    assert_eq!(report.removed_user_claims, 1);
    assert_eq!(report.removed_user_tokens, 1);
    assert_eq!(report.removed_index_entries, 1);
    assert_eq!(report.total(), 5);

    // Owned records are intact.
    assert!(fx.users.is_in_role(&user, "ADMIN", &token).await.unwrap());
    assert_eq!(fx.users.logins(&user, &token).await.unwrap().len(), 1);
    assert!(fx.users.find_by_name("ALICE", &token).await.unwrap().is_some());

    // A second sweep finds nothing left to do.
    let report = reconciler.run(&token).await.unwrap();
    assert_eq!(report.total(), 0);
}

#[tokio::test]
async fn should_remove_index_entry_pointing_at_missing_role() {
    let fx = memory_fixture();
    let token = ct();

    let mut repo = Repository::new(Arc::clone(&fx.client), Arc::clone(&fx.config));
    repo.add(&IndexEntry::new(IndexKind::RoleName, "GONE", "role-gone"))
        .unwrap();
    repo.save_changes(&token).await.unwrap();

    let reconciler = Reconciler::new(Arc::clone(&fx.client), Arc::clone(&fx.config));
    let report = reconciler.run(&token).await.unwrap();
    assert_eq!(report.removed_index_entries, 1);
    assert!(fx.client.is_empty("identity_index"));
}
