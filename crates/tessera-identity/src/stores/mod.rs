pub mod role;
pub mod traits;
pub mod user;

pub use traits::{
    Claim, LoginInfo, RoleStore, UserClaimStore, UserEmailStore, UserLoginStore,
    UserPasswordStore, UserPhoneNumberStore, UserRoleStore, UserStore, UserTokenStore,
    UserTwoFactorStore,
};

use tokio_util::sync::CancellationToken;

use tessera_model::{IndexEntry, IndexKind, Role};
use tessera_store::{DocumentClient, Repository};

use crate::error::IdentityError;

/// Cancellation is checked synchronously before work starts, never
/// mid-round-trip.
pub(crate) fn check_canceled(ct: &CancellationToken) -> Result<(), IdentityError> {
    if ct.is_cancelled() {
        Err(IdentityError::Canceled)
    } else {
        Ok(())
    }
}

/// Required string arguments fail fast, before any store call.
pub(crate) fn require<'a>(value: &'a str, name: &'static str) -> Result<&'a str, IdentityError> {
    if value.trim().is_empty() {
        Err(IdentityError::InvalidArgument(name))
    } else {
        Ok(value)
    }
}

/// Point-read a secondary-index entry and return its target id.
pub(crate) async fn index_target<C: DocumentClient>(
    repo: &Repository<C>,
    kind: IndexKind,
    value: &str,
    ct: &CancellationToken,
) -> Result<Option<String>, IdentityError> {
    let id = IndexEntry::composite_id(kind, value);
    let entry: Option<IndexEntry> = repo.read(&id, &id, ct).await?;
    Ok(entry.map(|e| e.target_id))
}

/// Resolve a role by normalized name: index point read first, then the
/// cross-partition scan fallback for a missing or dangling index entry.
pub(crate) async fn find_role_by_name<C: DocumentClient>(
    repo: &Repository<C>,
    normalized_name: &str,
    ct: &CancellationToken,
) -> Result<Option<Role>, IdentityError> {
    if let Some(role_id) = index_target(repo, IndexKind::RoleName, normalized_name, ct).await? {
        if let Some(role) = repo.read::<Role>(&role_id, &role_id, ct).await? {
            return Ok(Some(role));
        }
    }
    let needle = normalized_name.to_owned();
    let role = repo
        .table::<Role>()
        .filter(move |r| r.normalized_name == needle)
        .one(ct)
        .await?;
    Ok(role)
}
