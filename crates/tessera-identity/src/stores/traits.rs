#![allow(async_fn_in_trait)]

//! Capability traits making up the framework-facing contract.
//!
//! The surface is split per capability so a minimal storage backend need
//! not implement all of them. Uniform contract for every operation:
//! required arguments are validated first (empty strings fail with
//! `InvalidArgument` before any I/O), the cancellation token is checked
//! before each store round trip, lookups return `Option` (absence is not
//! an error), and mutations translate every store failure into a
//! structured `IdentityError` instead of propagating it raw.
//!
//! A capability the backend cannot serve must fail with `Unsupported` at
//! call time, never silently no-op.

use tokio_util::sync::CancellationToken;

use tessera_model::{Role, User};

use crate::error::IdentityError;

/// An external login as the identity framework sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginInfo {
    pub login_provider: String,
    pub provider_key: String,
    pub provider_display_name: Option<String>,
}

/// A claim as the identity framework sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub claim_type: String,
    pub claim_value: String,
}

/// Core user persistence.
pub trait UserStore: Send + Sync {
    /// Persist a new user. On success the entity carries the fresh
    /// concurrency token.
    async fn create(&self, user: &mut User, ct: &CancellationToken) -> Result<(), IdentityError>;

    /// Persist changes to an existing user. Fails with `Conflict` when
    /// the entity's concurrency token is stale; the caller must re-read
    /// and decide — this layer never retries.
    async fn update(&self, user: &mut User, ct: &CancellationToken) -> Result<(), IdentityError>;

    /// Delete a user and cascade-clean its role memberships, logins,
    /// claims, tokens, and index entries.
    async fn delete(&self, user: &User, ct: &CancellationToken) -> Result<(), IdentityError>;

    /// Point read by id — id is the partition key, so this is the O(1)
    /// path.
    async fn find_by_id(
        &self,
        user_id: &str,
        ct: &CancellationToken,
    ) -> Result<Option<User>, IdentityError>;

    /// Lookup by normalized user name via the secondary index; degrades
    /// to a cross-partition scan only when the index entry is missing.
    async fn find_by_name(
        &self,
        normalized_user_name: &str,
        ct: &CancellationToken,
    ) -> Result<Option<User>, IdentityError>;

    fn user_id(&self, user: &User, ct: &CancellationToken) -> Result<String, IdentityError>;

    fn user_name(&self, user: &User, ct: &CancellationToken) -> Result<String, IdentityError>;

    fn set_user_name(
        &self,
        user: &mut User,
        user_name: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;

    fn normalized_user_name(
        &self,
        user: &User,
        ct: &CancellationToken,
    ) -> Result<String, IdentityError>;

    /// Stores the value exactly as given; normalization is the caller's
    /// contract, this layer does not transform it further.
    fn set_normalized_user_name(
        &self,
        user: &mut User,
        normalized_name: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;
}

/// Email lookup and accessors.
pub trait UserEmailStore: UserStore {
    async fn find_by_email(
        &self,
        normalized_email: &str,
        ct: &CancellationToken,
    ) -> Result<Option<User>, IdentityError>;

    fn email(&self, user: &User, ct: &CancellationToken) -> Result<String, IdentityError>;

    fn set_email(
        &self,
        user: &mut User,
        email: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;

    fn email_confirmed(&self, user: &User, ct: &CancellationToken)
    -> Result<bool, IdentityError>;

    fn set_email_confirmed(
        &self,
        user: &mut User,
        confirmed: bool,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;

    fn normalized_email(
        &self,
        user: &User,
        ct: &CancellationToken,
    ) -> Result<String, IdentityError>;

    fn set_normalized_email(
        &self,
        user: &mut User,
        normalized_email: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;
}

/// Password hash persistence. The hash is opaque here; hashing itself is
/// the credential service's concern.
pub trait UserPasswordStore: UserStore {
    fn password_hash(
        &self,
        user: &User,
        ct: &CancellationToken,
    ) -> Result<Option<String>, IdentityError>;

    fn set_password_hash(
        &self,
        user: &mut User,
        password_hash: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;

    fn has_password(&self, user: &User, ct: &CancellationToken) -> Result<bool, IdentityError>;
}

/// Phone number accessors.
pub trait UserPhoneNumberStore: UserStore {
    fn phone_number(
        &self,
        user: &User,
        ct: &CancellationToken,
    ) -> Result<Option<String>, IdentityError>;

    fn set_phone_number(
        &self,
        user: &mut User,
        phone_number: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;

    fn phone_number_confirmed(
        &self,
        user: &User,
        ct: &CancellationToken,
    ) -> Result<bool, IdentityError>;

    fn set_phone_number_confirmed(
        &self,
        user: &mut User,
        confirmed: bool,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;
}

/// External login persistence.
pub trait UserLoginStore: UserStore {
    /// Persist an external login. Failures (including a duplicate
    /// provider/key pair) surface as errors.
    async fn add_login(
        &self,
        user: &User,
        login: &LoginInfo,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;

    /// Remove a login if present; removing an absent login is a no-op
    /// result, not an error.
    async fn remove_login(
        &self,
        user: &User,
        login_provider: &str,
        provider_key: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;

    async fn logins(
        &self,
        user: &User,
        ct: &CancellationToken,
    ) -> Result<Vec<LoginInfo>, IdentityError>;

    async fn find_by_login(
        &self,
        login_provider: &str,
        provider_key: &str,
        ct: &CancellationToken,
    ) -> Result<Option<User>, IdentityError>;
}

/// Claim persistence.
pub trait UserClaimStore: UserStore {
    async fn claims(
        &self,
        user: &User,
        ct: &CancellationToken,
    ) -> Result<Vec<Claim>, IdentityError>;

    async fn add_claims(
        &self,
        user: &User,
        claims: &[Claim],
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;

    async fn replace_claim(
        &self,
        user: &User,
        claim: &Claim,
        new_claim: &Claim,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;

    async fn remove_claims(
        &self,
        user: &User,
        claims: &[Claim],
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;

    async fn users_for_claim(
        &self,
        claim: &Claim,
        ct: &CancellationToken,
    ) -> Result<Vec<User>, IdentityError>;
}

/// Named provider tokens stored per user.
pub trait UserTokenStore: UserStore {
    async fn set_token(
        &self,
        user: &User,
        login_provider: &str,
        name: &str,
        value: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;

    async fn token(
        &self,
        user: &User,
        login_provider: &str,
        name: &str,
        ct: &CancellationToken,
    ) -> Result<Option<String>, IdentityError>;

    async fn remove_token(
        &self,
        user: &User,
        login_provider: &str,
        name: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;
}

/// Role membership, resolved by normalized role name.
pub trait UserRoleStore: UserStore {
    /// Add the user to a role. Fails with `RoleNotFound` if no such role
    /// exists; adding an existing membership is a no-op result.
    async fn add_to_role(
        &self,
        user: &User,
        normalized_role_name: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;

    async fn remove_from_role(
        &self,
        user: &User,
        normalized_role_name: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;

    /// Display names of all roles the user belongs to.
    async fn roles(&self, user: &User, ct: &CancellationToken)
    -> Result<Vec<String>, IdentityError>;

    async fn is_in_role(
        &self,
        user: &User,
        normalized_role_name: &str,
        ct: &CancellationToken,
    ) -> Result<bool, IdentityError>;

    async fn users_in_role(
        &self,
        normalized_role_name: &str,
        ct: &CancellationToken,
    ) -> Result<Vec<User>, IdentityError>;
}

/// Two-factor flag persistence. The entity model carries no two-factor
/// state, so the document-backed store fails these loudly instead of
/// pretending the flag is off.
pub trait UserTwoFactorStore: UserStore {
    fn two_factor_enabled(
        &self,
        user: &User,
        ct: &CancellationToken,
    ) -> Result<bool, IdentityError>;

    fn set_two_factor_enabled(
        &self,
        user: &mut User,
        enabled: bool,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;
}

/// Role persistence.
pub trait RoleStore: Send + Sync {
    async fn create(&self, role: &mut Role, ct: &CancellationToken) -> Result<(), IdentityError>;

    /// Fails with `Conflict` when the role's concurrency token is stale;
    /// exactly one of two racing updates wins.
    async fn update(&self, role: &mut Role, ct: &CancellationToken) -> Result<(), IdentityError>;

    /// Delete a role and cascade-clean its memberships and index entry.
    async fn delete(&self, role: &Role, ct: &CancellationToken) -> Result<(), IdentityError>;

    async fn find_by_id(
        &self,
        role_id: &str,
        ct: &CancellationToken,
    ) -> Result<Option<Role>, IdentityError>;

    async fn find_by_name(
        &self,
        normalized_role_name: &str,
        ct: &CancellationToken,
    ) -> Result<Option<Role>, IdentityError>;

    fn role_id(&self, role: &Role, ct: &CancellationToken) -> Result<String, IdentityError>;

    fn role_name(&self, role: &Role, ct: &CancellationToken) -> Result<String, IdentityError>;

    fn set_role_name(
        &self,
        role: &mut Role,
        role_name: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;

    fn normalized_role_name(
        &self,
        role: &Role,
        ct: &CancellationToken,
    ) -> Result<String, IdentityError>;

    fn set_normalized_role_name(
        &self,
        role: &mut Role,
        normalized_name: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError>;
}
